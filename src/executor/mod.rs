//! # Query Executor subsystem
//!
//! Consumes compiled statements and produces notification records.
//!
//! # Execution Flow
//!
//! 1. Hand the statement text and ordered parameters to the persistence
//!    collaborator in one round trip
//! 2. Map each returned row positionally to a notification record
//! 3. Return rows in statement order, untouched
//!
//! # Invariants
//!
//! - No re-ordering, no re-filtering: the compiled statement already
//!   decided both
//! - Collaborator failures propagate unmodified
//! - Cancellation abandons the in-flight statement; it never yields
//!   partial rows

mod errors;
mod executor;

pub use errors::{ExecutorError, ExecutorResult, PersistenceError};
pub use executor::{QueryExecutor, SqlRow, StatementExecutor};
