//! Service error types

use thiserror::Error;

use crate::executor::{ExecutorError, PersistenceError};
use crate::planner::ValidationError;

/// Result alias for service operations
pub type ServiceResult<T> = Result<T, QueryError>;

// ============================================================================
// Errors
// ============================================================================

/// Everything a notification query can fail with
///
/// Validation failures never reach the backend; persistence failures pass
/// through with their message intact.
#[derive(Debug, Error)]
pub enum QueryError {
    /// The request was rejected before any statement was issued
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The backend failed while running the statement
    #[error(transparent)]
    Persistence(PersistenceError),

    /// The caller's cancellation signal fired before rows arrived
    #[error("query cancelled")]
    Cancelled,
}

impl From<ExecutorError> for QueryError {
    fn from(err: ExecutorError) -> Self {
        match err {
            ExecutorError::Persistence(source) => QueryError::Persistence(source),
            ExecutorError::Cancelled => QueryError::Cancelled,
        }
    }
}
