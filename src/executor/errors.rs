//! # Executor Errors
//!
//! Failures surfaced by statement execution. Collaborator failures are
//! propagated unmodified; nothing here retries or substitutes default
//! data.

use thiserror::Error;

/// Result type for executor operations
pub type ExecutorResult<T> = Result<T, ExecutorError>;

/// Failures of the persistence collaborator
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PersistenceError {
    /// Backend could not be reached
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    /// Backend accepted the statement but failed to run it
    #[error("statement failed: {0}")]
    Statement(String),

    /// A returned row did not have the contracted column layout
    #[error("row {row}, column {column}: expected {expected}")]
    MalformedRow {
        row: usize,
        column: usize,
        expected: &'static str,
    },
}

/// Everything a statement execution can fail with
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutorError {
    /// Collaborator failure, passed through as-is
    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    /// The caller abandoned the query while the statement was in flight
    #[error("query cancelled")]
    Cancelled,
}
