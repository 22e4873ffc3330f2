//! # Notification Service
//!
//! The facade over the whole read path: resolve the caller's scope, plan,
//! compile, execute, map rows. Callers never see the stages; they hand in
//! a principal and a request and get rows or an error.
//!
//! ## Invariants
//! - Scope resolution happens before planning, so every statement that
//!   reaches the backend already carries the caller's visibility bounds
//! - An empty plan never reaches the backend; the service answers it with
//!   an empty result directly
//! - Exactly one terminal event is logged per operation

use std::future::{pending, Future};
use std::sync::Arc;

use crate::access::{AccessScopeResolver, Principal, ScopeDirectory};
use crate::compiler::QueryCompiler;
use crate::executor::{ExecutorError, QueryExecutor, StatementExecutor};
use crate::model::{Notification, NotificationId};
use crate::observability::{log_event_with_fields, Event, MetricsRegistry};
use crate::planner::{
    NotificationPoll, NotificationQuery, QueryPlan, QueryPlanner, ValidationError,
};

use super::errors::{QueryError, ServiceResult};

/// Which read operation an execution belongs to
#[derive(Debug, Clone, Copy)]
enum OpKind {
    Query,
    Poll,
}

impl OpKind {
    fn as_str(self) -> &'static str {
        match self {
            OpKind::Query => "query",
            OpKind::Poll => "poll",
        }
    }

    fn completed_event(self) -> Event {
        match self {
            OpKind::Query => Event::QueryCompleted,
            OpKind::Poll => Event::PollCompleted,
        }
    }
}

/// Scoped read access to stored notifications
pub struct NotificationService<D: ScopeDirectory, E: StatementExecutor> {
    resolver: AccessScopeResolver<D>,
    planner: QueryPlanner,
    compiler: QueryCompiler,
    executor: QueryExecutor<E>,
    metrics: Arc<MetricsRegistry>,
}

impl<D: ScopeDirectory, E: StatementExecutor> NotificationService<D, E> {
    pub fn new(directory: D, backend: E) -> Self {
        Self::with_metrics(directory, backend, Arc::new(MetricsRegistry::new()))
    }

    /// Create with a shared metrics registry
    pub fn with_metrics(directory: D, backend: E, metrics: Arc<MetricsRegistry>) -> Self {
        Self {
            resolver: AccessScopeResolver::new(directory),
            planner: QueryPlanner::new(),
            compiler: QueryCompiler::new(),
            executor: QueryExecutor::new(backend),
            metrics,
        }
    }

    /// The registry this service reports counters to
    pub fn metrics(&self) -> &MetricsRegistry {
        &self.metrics
    }

    /// Runs a historical query under the principal's scope
    pub async fn query(
        &self,
        principal: &Principal,
        request: &NotificationQuery,
    ) -> ServiceResult<Vec<Notification>> {
        self.query_until(principal, request, pending()).await
    }

    /// Runs a historical query, abandoning it when `cancel` completes first
    pub async fn query_until<C>(
        &self,
        principal: &Principal,
        request: &NotificationQuery,
        cancel: C,
    ) -> ServiceResult<Vec<Notification>>
    where
        C: Future<Output = ()> + Send,
    {
        let device = request.device.to_string();
        log_event_with_fields(Event::QueryReceived, &[("device", &device)]);

        let scope = self.resolver.resolve(principal);
        let plan = match self.planner.plan_query(request, scope) {
            Ok(plan) => plan,
            Err(err) => return Err(self.reject(err)),
        };

        self.execute(OpKind::Query, plan, cancel).await
    }

    /// Returns notifications newer than the poll watermark
    pub async fn poll(
        &self,
        principal: &Principal,
        request: &NotificationPoll,
    ) -> ServiceResult<Vec<Notification>> {
        self.poll_until(principal, request, pending()).await
    }

    /// Polls, abandoning the statement when `cancel` completes first
    pub async fn poll_until<C>(
        &self,
        principal: &Principal,
        request: &NotificationPoll,
        cancel: C,
    ) -> ServiceResult<Vec<Notification>>
    where
        C: Future<Output = ()> + Send,
    {
        let since = request.since.to_rfc3339();
        log_event_with_fields(Event::PollReceived, &[("since", &since)]);

        let scope = self.resolver.resolve(principal);
        let plan = self.planner.plan_poll(request, scope);

        self.execute(OpKind::Poll, plan, cancel).await
    }

    /// Looks up a single notification the principal may see
    ///
    /// An id outside the caller's scope comes back as `None`, exactly like
    /// an id that does not exist.
    pub async fn find_by_id(
        &self,
        principal: &Principal,
        id: NotificationId,
    ) -> ServiceResult<Option<Notification>> {
        self.find_by_id_until(principal, id, pending()).await
    }

    /// Single-row lookup, abandoning it when `cancel` completes first
    pub async fn find_by_id_until<C>(
        &self,
        principal: &Principal,
        id: NotificationId,
        cancel: C,
    ) -> ServiceResult<Option<Notification>>
    where
        C: Future<Output = ()> + Send,
    {
        let notification = id.to_string();
        log_event_with_fields(Event::QueryReceived, &[("notification", &notification)]);

        let scope = self.resolver.resolve(principal);
        let plan = self.planner.plan_find(id, scope);

        let rows = self.execute(OpKind::Query, plan, cancel).await?;
        Ok(rows.into_iter().next())
    }

    /// Records a validation rejection
    fn reject(&self, err: ValidationError) -> QueryError {
        self.metrics.increment_queries_rejected();
        let reason = err.to_string();
        log_event_with_fields(Event::QueryRejected, &[("reason", &reason)]);
        QueryError::Validation(err)
    }

    /// Shared tail of every operation: compile, run, account
    async fn execute<C>(
        &self,
        kind: OpKind,
        plan: QueryPlan,
        cancel: C,
    ) -> ServiceResult<Vec<Notification>>
    where
        C: Future<Output = ()> + Send,
    {
        if plan.is_empty() {
            self.metrics.increment_queries_short_circuited();
            log_event_with_fields(Event::QueryShortCircuited, &[("op", kind.as_str())]);
            return Ok(Vec::new());
        }

        let compiled = self.compiler.compile(&plan);
        let params = compiled.params.len().to_string();
        log_event_with_fields(
            Event::QueryPlanned,
            &[("op", kind.as_str()), ("params", &params)],
        );

        match self.executor.fetch_until(&compiled, cancel).await {
            Ok(rows) => {
                match kind {
                    OpKind::Query => self.metrics.increment_queries_executed(),
                    OpKind::Poll => self.metrics.increment_polls_executed(),
                }
                self.metrics.add_rows_returned(rows.len() as u64);
                let count = rows.len().to_string();
                log_event_with_fields(kind.completed_event(), &[("rows", &count)]);
                Ok(rows)
            }
            Err(ExecutorError::Cancelled) => {
                self.metrics.increment_queries_cancelled();
                log_event_with_fields(Event::QueryCancelled, &[("op", kind.as_str())]);
                Err(QueryError::Cancelled)
            }
            Err(ExecutorError::Persistence(source)) => {
                self.metrics.increment_queries_failed();
                let reason = source.to_string();
                log_event_with_fields(
                    Event::QueryFailed,
                    &[("op", kind.as_str()), ("reason", &reason)],
                );
                Err(QueryError::Persistence(source))
            }
        }
    }
}
