//! gridpulse - scoped notification queries for device fleets
//!
//! Every statement that reaches the backend already carries the caller's
//! visibility bounds; denial is indistinguishable from absence.

pub mod access;
pub mod compiler;
pub mod executor;
pub mod model;
pub mod observability;
pub mod planner;
pub mod predicate;
pub mod service;
