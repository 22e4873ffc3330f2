//! # Query Planner
//!
//! Turns a validated request plus the caller's access scope into an
//! immutable plan. Planning is deterministic: same request, same scope,
//! same plan.
//!
//! ## Invariants
//! - Every validation failure is raised here, before compilation
//! - The access scope is conjoined with caller filters; it can only narrow
//!   the result
//! - A predicate that can match nothing plans to [`QueryPlan::Empty`], so
//!   denial and "no data" are indistinguishable downstream

use chrono::{DateTime, Utc};

use crate::model::NotificationId;
use crate::predicate::Predicate;

use super::errors::{PlanResult, ValidationError};
use super::plan::{BucketedPlan, DirectPlan, QueryPlan, SortField, SortSpec};
use super::request::{NotificationPoll, NotificationQuery};

/// Produces deterministic plans from requests
#[derive(Debug, Default)]
pub struct QueryPlanner;

impl QueryPlanner {
    pub fn new() -> Self {
        Self
    }

    /// Plans a historical query
    pub fn plan_query(
        &self,
        request: &NotificationQuery,
        scope: Predicate,
    ) -> PlanResult<QueryPlan> {
        // 1. Validate pagination bounds
        let take = validated_count(request.take, ValidationError::NegativeTake)?;
        let skip = validated_count(request.skip, ValidationError::NegativeSkip)?;

        // 2. Validate the sort field against the allow-list
        let sort = sort_spec(request.sort_field.as_deref(), request.sort_ascending)?;

        // 3. Validate and merge the time range
        let time = time_clause(request.start, request.end)?;

        // 4. Validate the bucket width
        let interval = validated_interval(request.grid_interval)?;

        // 5. Conjoin caller filters with the access scope
        let mut clauses = vec![Predicate::device_eq(request.device)];
        if let Some(time) = time {
            clauses.push(time);
        }
        if let Some(name) = &request.name {
            clauses.push(Predicate::name_eq(name.clone()));
        }
        clauses.push(scope);
        let predicate = Predicate::all(clauses);

        // 6. Nothing can match: skip compilation and execution entirely
        if predicate == Predicate::False {
            return Ok(QueryPlan::Empty);
        }

        // 7. Pick the plan shape
        match interval {
            None => Ok(QueryPlan::Direct(DirectPlan {
                predicate,
                sort,
                take,
                skip,
                cacheable: false,
            })),
            Some(seconds) => Ok(QueryPlan::Bucketed(BucketedPlan {
                predicate,
                interval_seconds: seconds,
                sort,
                take,
                skip,
            })),
        }
    }

    /// Plans a watermark poll
    ///
    /// Polls carry no caller-controlled sort or pagination and their
    /// watermark is required by construction, so planning cannot fail.
    /// Repeated identical polls are common, so the plan is marked
    /// cache-eligible.
    pub fn plan_poll(&self, request: &NotificationPoll, scope: Predicate) -> QueryPlan {
        // An explicit empty candidate set short-circuits before any
        // predicate is built.
        if matches!(&request.devices, Some(devices) if devices.is_empty()) {
            return QueryPlan::Empty;
        }

        let mut clauses = vec![Predicate::after(request.since)];
        if let Some(devices) = &request.devices {
            clauses.push(Predicate::device_in(devices));
        }
        if let Some(names) = &request.names {
            clauses.push(Predicate::name_in(names));
        }
        clauses.push(scope);
        let predicate = Predicate::all(clauses);

        if predicate == Predicate::False {
            return QueryPlan::Empty;
        }

        QueryPlan::Direct(DirectPlan {
            predicate,
            sort: None,
            take: None,
            skip: None,
            cacheable: true,
        })
    }

    /// Plans a single-row lookup by notification id
    ///
    /// The scope rides along like any other clause, so an id outside the
    /// caller's scope plans to [`QueryPlan::Empty`] and is indistinguishable
    /// from an absent row.
    pub fn plan_find(&self, id: NotificationId, scope: Predicate) -> QueryPlan {
        let predicate = Predicate::id_eq(id).and(scope);

        if predicate == Predicate::False {
            return QueryPlan::Empty;
        }

        QueryPlan::Direct(DirectPlan {
            predicate,
            sort: None,
            take: Some(1),
            skip: None,
            cacheable: false,
        })
    }
}

/// Validates an optional non-negative count field
fn validated_count(
    value: Option<i32>,
    reject: fn(i32) -> ValidationError,
) -> PlanResult<Option<i32>> {
    match value {
        Some(n) if n < 0 => Err(reject(n)),
        other => Ok(other),
    }
}

/// Validates the optional bucket width
fn validated_interval(value: Option<i32>) -> PlanResult<Option<i32>> {
    match value {
        Some(seconds) if seconds <= 0 => {
            Err(ValidationError::NonPositiveGridInterval(seconds))
        }
        other => Ok(other),
    }
}

/// Validates the sort field and direction
fn sort_spec(field: Option<&str>, ascending: bool) -> PlanResult<Option<SortSpec>> {
    match field {
        None => Ok(None),
        Some(name) => {
            let field = SortField::parse(name)
                .ok_or_else(|| ValidationError::UnknownSortField(name.to_string()))?;
            Ok(Some(SortSpec { field, ascending }))
        }
    }
}

/// Builds the time-range clause from the open or closed bounds
fn time_clause(
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
) -> PlanResult<Option<Predicate>> {
    match (start, end) {
        (Some(start), Some(end)) if end < start => {
            Err(ValidationError::InvertedTimeRange { start, end })
        }
        (Some(start), Some(end)) => Ok(Some(Predicate::time_between(start, end))),
        (Some(start), None) => Ok(Some(Predicate::since(start))),
        (None, Some(end)) => Ok(Some(Predicate::until(end))),
        (None, None) => Ok(None),
    }
}
