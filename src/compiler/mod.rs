//! # Query Compiler
//!
//! Renders a plan into statement text plus an ordered parameter list. The
//! text and the parameters grow in lockstep: every placeholder appended to
//! the text pushes its value in the same step, so `params[i]` is always
//! the value of `$i+1`.
//!
//! ## Invariants
//! - Statement text contains only compiler-chosen structural tokens
//!   (column and table names, operators, connectives) plus positional
//!   placeholders
//! - No caller-supplied value ever appears as literal text; limit and
//!   offset are the only caller-derived tokens rendered inline, and only
//!   as clamped non-negative integers
//! - Placeholder numbers are strictly increasing in order of appearance

use chrono::{DateTime, Utc};

use crate::planner::{BucketedPlan, DirectPlan, QueryPlan, SortField, SortSpec};
use crate::predicate::{Field, Predicate, Scalar};

const SELECT_COLUMNS: &str = "n.id, n.device_id, n.notification, n.timestamp, n.parameters";
const FROM_NOTIFICATION: &str = " FROM device_notification n";
const JOIN_DEVICE: &str = " JOIN device d ON d.id = n.device_id";

/// A value bound to one positional placeholder
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Int(i64),
    Text(String),
    Time(DateTime<Utc>),
    /// Opaque payload column; appears in result rows, never in parameters
    Json(serde_json::Value),
}

impl From<&Scalar> for SqlValue {
    fn from(value: &Scalar) -> Self {
        match value {
            Scalar::Int(v) => SqlValue::Int(*v),
            Scalar::Text(v) => SqlValue::Text(v.clone()),
            Scalar::Time(v) => SqlValue::Time(*v),
        }
    }
}

/// A ready-to-execute statement
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery {
    /// Statement text with positional placeholders
    pub text: String,
    /// Bound values, in placeholder order
    pub params: Vec<SqlValue>,
    /// Hint that a result cache may serve repeated identical calls
    pub cacheable: bool,
}

/// Text and parameters, grown together
struct StatementBuilder {
    text: String,
    params: Vec<SqlValue>,
}

impl StatementBuilder {
    fn new() -> Self {
        Self {
            text: String::new(),
            params: Vec::new(),
        }
    }

    /// Appends a structural token
    fn push(&mut self, sql: &str) {
        self.text.push_str(sql);
    }

    /// Appends the next placeholder and binds its value in the same step
    fn push_param(&mut self, value: SqlValue) {
        self.params.push(value);
        self.text.push_str(&format!("${}", self.params.len()));
    }
}

/// Renders plans to parameterized statements
#[derive(Debug, Default)]
pub struct QueryCompiler;

impl QueryCompiler {
    pub fn new() -> Self {
        Self
    }

    pub fn compile(&self, plan: &QueryPlan) -> CompiledQuery {
        match plan {
            QueryPlan::Empty => compile_empty(),
            QueryPlan::Direct(direct) => compile_direct(direct),
            QueryPlan::Bucketed(bucketed) => compile_bucketed(bucketed),
        }
    }
}

/// A statement that is valid to execute but matches nothing
fn compile_empty() -> CompiledQuery {
    let mut builder = StatementBuilder::new();
    builder.push("SELECT ");
    builder.push(SELECT_COLUMNS);
    builder.push(FROM_NOTIFICATION);
    builder.push(" WHERE FALSE");
    CompiledQuery {
        text: builder.text,
        params: builder.params,
        cacheable: false,
    }
}

fn compile_direct(plan: &DirectPlan) -> CompiledQuery {
    let mut builder = StatementBuilder::new();
    builder.push("SELECT ");
    builder.push(SELECT_COLUMNS);
    builder.push(FROM_NOTIFICATION);
    if plan.predicate.references(Field::Network) {
        builder.push(JOIN_DEVICE);
    }
    builder.push(" WHERE ");
    push_predicate(&mut builder, &plan.predicate);

    match plan.sort {
        Some(spec) => push_explicit_order(&mut builder, "n", spec),
        None => builder.push(" ORDER BY n.timestamp ASC, n.id ASC"),
    }
    push_page(&mut builder, plan.take, plan.skip);

    CompiledQuery {
        text: builder.text,
        params: builder.params,
        cacheable: plan.cacheable,
    }
}

/// Down-sampling statement: filters and the window run in a subquery, so
/// representatives are picked over visible rows only; the outer query
/// keeps exactly the row numbered first in each (name, bucket) partition.
fn compile_bucketed(plan: &BucketedPlan) -> CompiledQuery {
    let interval = i64::from(plan.interval_seconds);

    let mut builder = StatementBuilder::new();
    builder.push(
        "SELECT bucketed.id, bucketed.device_id, bucketed.notification, \
         bucketed.timestamp, bucketed.parameters FROM (SELECT ",
    );
    builder.push(SELECT_COLUMNS);
    builder.push(", floor(extract(EPOCH FROM n.timestamp) / ");
    builder.push_param(SqlValue::Int(interval));
    builder.push(") AS bucket, row_number() OVER (PARTITION BY n.notification, floor(extract(EPOCH FROM n.timestamp) / ");
    builder.push_param(SqlValue::Int(interval));
    builder.push(") ORDER BY n.timestamp ASC, n.id ASC) AS picked");
    builder.push(FROM_NOTIFICATION);
    if plan.predicate.references(Field::Network) {
        builder.push(JOIN_DEVICE);
    }
    builder.push(" WHERE ");
    push_predicate(&mut builder, &plan.predicate);
    builder.push(") AS bucketed WHERE bucketed.picked = 1");

    match plan.sort {
        Some(spec) => push_explicit_order(&mut builder, "bucketed", spec),
        None => builder.push(" ORDER BY bucketed.bucket ASC, bucketed.notification ASC"),
    }
    push_page(&mut builder, plan.take, plan.skip);

    CompiledQuery {
        text: builder.text,
        params: builder.params,
        cacheable: false,
    }
}

/// Column a predicate field reads from
fn column(field: Field) -> &'static str {
    match field {
        Field::Id => "n.id",
        Field::Device => "n.device_id",
        Field::Network => "d.network_id",
        Field::Name => "n.notification",
        Field::Timestamp => "n.timestamp",
    }
}

fn push_predicate(builder: &mut StatementBuilder, predicate: &Predicate) {
    match predicate {
        Predicate::True => builder.push("TRUE"),
        Predicate::False => builder.push("FALSE"),
        Predicate::Eq(field, value) => {
            builder.push(column(*field));
            builder.push(" = ");
            builder.push_param(value.into());
        }
        Predicate::In(field, values) => {
            builder.push(column(*field));
            builder.push(" IN (");
            for (i, value) in values.iter().enumerate() {
                if i > 0 {
                    builder.push(", ");
                }
                builder.push_param(value.into());
            }
            builder.push(")");
        }
        Predicate::Gt(field, value) => {
            builder.push(column(*field));
            builder.push(" > ");
            builder.push_param(value.into());
        }
        Predicate::Gte(field, value) => {
            builder.push(column(*field));
            builder.push(" >= ");
            builder.push_param(value.into());
        }
        Predicate::Lte(field, value) => {
            builder.push(column(*field));
            builder.push(" <= ");
            builder.push_param(value.into());
        }
        Predicate::Between(field, low, high) => {
            builder.push(column(*field));
            builder.push(" BETWEEN ");
            builder.push_param(low.into());
            builder.push(" AND ");
            builder.push_param(high.into());
        }
        Predicate::And(clauses) => push_connective(builder, clauses, " AND "),
        Predicate::Or(clauses) => push_connective(builder, clauses, " OR "),
    }
}

fn push_connective(builder: &mut StatementBuilder, clauses: &[Predicate], connective: &str) {
    builder.push("(");
    for (i, clause) in clauses.iter().enumerate() {
        if i > 0 {
            builder.push(connective);
        }
        push_predicate(builder, clause);
    }
    builder.push(")");
}

/// Explicit sort with a deterministic id tie-break
fn push_explicit_order(builder: &mut StatementBuilder, alias: &str, spec: SortSpec) {
    builder.push(" ORDER BY ");
    builder.push(alias);
    builder.push(".");
    builder.push(spec.field.column());
    builder.push(if spec.ascending { " ASC" } else { " DESC" });
    if spec.field != SortField::Id {
        builder.push(", ");
        builder.push(alias);
        builder.push(".id ASC");
    }
}

/// Pagination tokens, clamped so only non-negative integers reach the text
fn push_page(builder: &mut StatementBuilder, take: Option<i32>, skip: Option<i32>) {
    if let Some(take) = take {
        builder.push(&format!(" LIMIT {}", take.max(0)));
    }
    if let Some(skip) = skip {
        builder.push(&format!(" OFFSET {}", skip.max(0)));
    }
}
