//! Notification service facade
//!
//! Ties the read path together: access scope resolution, planning,
//! compilation and execution behind one API.

mod errors;
mod service;

pub use errors::{QueryError, ServiceResult};
pub use service::NotificationService;
