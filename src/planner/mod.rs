//! # Query Planner subsystem
//!
//! Validates caller requests and merges them with the resolved access
//! scope into immutable plans.
//!
//! # Design Principles
//!
//! - Deterministic: same request and scope, same plan
//! - Fail fast: every malformed field is rejected here, before any
//!   statement exists
//! - Scope is structural: access restrictions become predicate clauses,
//!   not post-hoc row filtering

mod errors;
mod plan;
mod planner;
mod request;

pub use errors::{PlanResult, ValidationError};
pub use plan::{BucketedPlan, DirectPlan, QueryPlan, SortField, SortSpec};
pub use planner::QueryPlanner;
pub use request::{NotificationPoll, NotificationQuery};
