//! # Planner Errors
//!
//! Pre-flight request validation failures. Every variant is raised before
//! any statement is compiled or executed, so a rejected request never
//! touches the persistence collaborator.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Result type for planning operations
pub type PlanResult<T> = Result<T, ValidationError>;

/// Malformed-request rejections
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Bucket width must be a positive number of seconds
    #[error("grid interval must be positive, got {0}")]
    NonPositiveGridInterval(i32),

    /// End of the requested time range precedes its start
    #[error("time range end {end} precedes start {start}")]
    InvertedTimeRange {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    /// Sort field is not one of the sortable columns
    #[error("cannot sort by {0:?}; sortable fields are timestamp, id, notification")]
    UnknownSortField(String),

    /// Limit must be non-negative
    #[error("take must be non-negative, got {0}")]
    NegativeTake(i32),

    /// Offset must be non-negative
    #[error("skip must be non-negative, got {0}")]
    NegativeSkip(i32),
}
