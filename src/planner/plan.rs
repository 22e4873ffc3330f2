//! # Query Plans
//!
//! Immutable plan shapes produced by the planner. A plan carries everything
//! the compiler needs and nothing it has to look up: the merged predicate,
//! ordering, pagination, and for the down-sampling shape the bucket width.

use chrono::{DateTime, Utc};

use crate::predicate::Predicate;

/// Columns a caller may sort by
///
/// Closed allow-list: sort fields become query structure, so anything
/// outside this set is rejected during planning instead of being embedded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Timestamp,
    Id,
    Name,
}

impl SortField {
    /// Parses a caller-supplied sort field name
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "timestamp" => Some(SortField::Timestamp),
            "id" => Some(SortField::Id),
            "notification" => Some(SortField::Name),
            _ => None,
        }
    }

    /// Column the field maps to
    pub fn column(&self) -> &'static str {
        match self {
            SortField::Timestamp => "timestamp",
            SortField::Id => "id",
            SortField::Name => "notification",
        }
    }
}

/// Sort specification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    /// Column to sort by
    pub field: SortField,
    /// Ascending when true
    pub ascending: bool,
}

impl SortSpec {
    pub fn asc(field: SortField) -> Self {
        Self {
            field,
            ascending: true,
        }
    }

    pub fn desc(field: SortField) -> Self {
        Self {
            field,
            ascending: false,
        }
    }
}

/// Plan for a filtered, sorted, paginated read
#[derive(Debug, Clone, PartialEq)]
pub struct DirectPlan {
    /// Merged caller filters and access scope
    pub predicate: Predicate,
    /// Explicit sort; None means the deterministic default order
    pub sort: Option<SortSpec>,
    /// Row limit, validated non-negative
    pub take: Option<i32>,
    /// Row offset, validated non-negative
    pub skip: Option<i32>,
    /// Marks the compiled statement as eligible for a result cache
    pub cacheable: bool,
}

/// Plan for a down-sampled read: one representative row per
/// (name, bucket) pair
#[derive(Debug, Clone, PartialEq)]
pub struct BucketedPlan {
    /// Merged caller filters and access scope
    pub predicate: Predicate,
    /// Bucket width in seconds, validated positive
    pub interval_seconds: i32,
    /// Explicit sort; None means (bucket, name) order
    pub sort: Option<SortSpec>,
    /// Row limit, validated non-negative
    pub take: Option<i32>,
    /// Row offset, validated non-negative
    pub skip: Option<i32>,
}

impl BucketedPlan {
    /// Bucket index a timestamp falls into
    ///
    /// floor division of epoch seconds by the bucket width; the same
    /// arithmetic the compiled statement performs.
    pub fn bucket_index(&self, instant: DateTime<Utc>) -> i64 {
        instant.timestamp().div_euclid(i64::from(self.interval_seconds))
    }
}

/// The shapes a request can plan into
#[derive(Debug, Clone, PartialEq)]
pub enum QueryPlan {
    /// Nothing can match; the caller gets an empty result without any
    /// statement being issued
    Empty,
    /// Filtered, sorted, paginated read
    Direct(DirectPlan),
    /// Time-bucketed down-sampling read
    Bucketed(BucketedPlan),
}

impl QueryPlan {
    /// True when no statement should be issued for this plan
    pub fn is_empty(&self) -> bool {
        matches!(self, QueryPlan::Empty)
    }
}
