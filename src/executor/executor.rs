//! # Statement Execution
//!
//! Runs one compiled statement against the persistence collaborator and
//! maps the returned rows to notification records. The executor never
//! re-orders or re-filters rows: ordering and visibility were fully
//! decided when the statement was compiled.

use std::future::Future;
use std::pin::Pin;

use chrono::{DateTime, Utc};

use crate::compiler::{CompiledQuery, SqlValue};
use crate::model::{DeviceId, Notification, NotificationId};

use super::errors::{ExecutorError, ExecutorResult, PersistenceError};

/// One positional result row
pub type SqlRow = Vec<SqlValue>;

/// Persistence collaborator that runs a parameterized statement
///
/// Binds `query.params` positionally and returns rows in statement order.
/// Connection pooling, transactions and retries all live behind this
/// seam.
pub trait StatementExecutor: Send + Sync {
    fn execute<'a>(
        &'a self,
        query: &'a CompiledQuery,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<SqlRow>, PersistenceError>> + Send + 'a>>;
}

impl<E: StatementExecutor + ?Sized> StatementExecutor for std::sync::Arc<E> {
    fn execute<'a>(
        &'a self,
        query: &'a CompiledQuery,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<SqlRow>, PersistenceError>> + Send + 'a>> {
        (**self).execute(query)
    }
}

/// Runs compiled statements and maps their rows
pub struct QueryExecutor<E: StatementExecutor> {
    backend: E,
}

impl<E: StatementExecutor> QueryExecutor<E> {
    pub fn new(backend: E) -> Self {
        Self { backend }
    }

    /// Runs a statement to completion
    pub async fn fetch(&self, query: &CompiledQuery) -> ExecutorResult<Vec<Notification>> {
        let rows = self.backend.execute(query).await?;
        map_rows(rows)
    }

    /// Runs a statement, abandoning it when `cancel` completes first
    ///
    /// A cancelled execution yields no rows, only the cancellation error;
    /// there are no partial results.
    pub async fn fetch_until<C>(
        &self,
        query: &CompiledQuery,
        cancel: C,
    ) -> ExecutorResult<Vec<Notification>>
    where
        C: Future<Output = ()> + Send,
    {
        tokio::select! {
            rows = self.backend.execute(query) => map_rows(rows?),
            _ = cancel => Err(ExecutorError::Cancelled),
        }
    }
}

fn map_rows(rows: Vec<SqlRow>) -> ExecutorResult<Vec<Notification>> {
    rows.into_iter()
        .enumerate()
        .map(|(index, row)| map_row(index, row).map_err(ExecutorError::from))
        .collect()
}

/// Maps one positional row: id, device_id, notification, timestamp,
/// parameters
fn map_row(row: usize, columns: SqlRow) -> Result<Notification, PersistenceError> {
    let mut columns = columns.into_iter();
    let id = next_int(&mut columns, row, 0)?;
    let device_id = next_int(&mut columns, row, 1)?;
    let name = next_text(&mut columns, row, 2)?;
    let timestamp = next_time(&mut columns, row, 3)?;
    let parameters = next_json(&mut columns, row, 4)?;
    if columns.next().is_some() {
        return Err(malformed(row, 5, "end of row"));
    }

    Ok(Notification::new(
        NotificationId(id),
        DeviceId(device_id),
        name,
        timestamp,
        parameters,
    ))
}

fn next_int(
    columns: &mut impl Iterator<Item = SqlValue>,
    row: usize,
    column: usize,
) -> Result<i64, PersistenceError> {
    match columns.next() {
        Some(SqlValue::Int(value)) => Ok(value),
        _ => Err(malformed(row, column, "bigint")),
    }
}

fn next_text(
    columns: &mut impl Iterator<Item = SqlValue>,
    row: usize,
    column: usize,
) -> Result<String, PersistenceError> {
    match columns.next() {
        Some(SqlValue::Text(value)) => Ok(value),
        _ => Err(malformed(row, column, "text")),
    }
}

fn next_time(
    columns: &mut impl Iterator<Item = SqlValue>,
    row: usize,
    column: usize,
) -> Result<DateTime<Utc>, PersistenceError> {
    match columns.next() {
        Some(SqlValue::Time(value)) => Ok(value),
        _ => Err(malformed(row, column, "timestamptz")),
    }
}

fn next_json(
    columns: &mut impl Iterator<Item = SqlValue>,
    row: usize,
    column: usize,
) -> Result<serde_json::Value, PersistenceError> {
    match columns.next() {
        Some(SqlValue::Json(value)) => Ok(value),
        _ => Err(malformed(row, column, "jsonb")),
    }
}

fn malformed(row: usize, column: usize, expected: &'static str) -> PersistenceError {
    PersistenceError::MalformedRow {
        row,
        column,
        expected,
    }
}
