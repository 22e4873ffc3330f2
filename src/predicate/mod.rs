//! # Predicate Algebra
//!
//! Composable filter conditions over notification and device attributes,
//! independent of any query syntax. Plans carry one predicate tree; the
//! compiler renders it to parameterized SQL and tests evaluate it directly
//! through [`Predicate::matches`].
//!
//! Constructors canonicalize degenerate shapes so downstream code never
//! special-cases them:
//! - an empty membership set is the match-nothing predicate
//! - an empty conjunction is the unconditional-true predicate
//! - an empty disjunction is the match-nothing predicate

use chrono::{DateTime, Utc};

use crate::model::{Device, DeviceId, NetworkId, Notification, NotificationId};

/// Attributes a predicate can reference
///
/// Closed set: every field maps to a known column, so no identifier derived
/// from untrusted input can reach query text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    /// Notification row id
    Id,
    /// Owning device id
    Device,
    /// Network of the owning device
    Network,
    /// Notification name
    Name,
    /// Event time
    Timestamp,
}

/// A comparable filter value
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Int(i64),
    Text(String),
    Time(DateTime<Utc>),
}

impl Scalar {
    /// Ordering comparison; values of different kinds never compare
    fn partial_cmp(&self, other: &Scalar) -> Option<std::cmp::Ordering> {
        match (self, other) {
            (Scalar::Int(a), Scalar::Int(b)) => Some(a.cmp(b)),
            (Scalar::Text(a), Scalar::Text(b)) => Some(a.cmp(b)),
            (Scalar::Time(a), Scalar::Time(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

/// A composable filter condition
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Matches every row
    True,
    /// Matches no row
    False,
    /// Field equals value
    Eq(Field, Scalar),
    /// Field is a member of the set (never constructed empty)
    In(Field, Vec<Scalar>),
    /// Field is strictly greater than the bound
    Gt(Field, Scalar),
    /// Field is greater than or equal to the bound
    Gte(Field, Scalar),
    /// Field is less than or equal to the bound
    Lte(Field, Scalar),
    /// Field lies in the inclusive range
    Between(Field, Scalar, Scalar),
    /// Conjunction (never constructed empty)
    And(Vec<Predicate>),
    /// Disjunction (never constructed empty)
    Or(Vec<Predicate>),
}

impl Predicate {
    /// Equality condition
    pub fn eq(field: Field, value: Scalar) -> Self {
        Predicate::Eq(field, value)
    }

    /// Set-membership condition; an empty set matches nothing
    pub fn in_set(field: Field, values: Vec<Scalar>) -> Self {
        if values.is_empty() {
            Predicate::False
        } else {
            Predicate::In(field, values)
        }
    }

    /// Strict lower bound
    pub fn gt(field: Field, value: Scalar) -> Self {
        Predicate::Gt(field, value)
    }

    /// Inclusive lower bound
    pub fn gte(field: Field, value: Scalar) -> Self {
        Predicate::Gte(field, value)
    }

    /// Inclusive upper bound
    pub fn lte(field: Field, value: Scalar) -> Self {
        Predicate::Lte(field, value)
    }

    /// Inclusive range
    pub fn between(field: Field, low: Scalar, high: Scalar) -> Self {
        Predicate::Between(field, low, high)
    }

    /// Conjunction of clauses
    ///
    /// True operands are dropped, a False operand collapses the whole
    /// conjunction, an empty conjunction is True, and a single survivor is
    /// returned unwrapped.
    pub fn all(clauses: Vec<Predicate>) -> Self {
        let mut kept = Vec::with_capacity(clauses.len());
        for clause in clauses {
            match clause {
                Predicate::True => {}
                Predicate::False => return Predicate::False,
                other => kept.push(other),
            }
        }
        match kept.len() {
            0 => Predicate::True,
            1 => kept.pop().unwrap(),
            _ => Predicate::And(kept),
        }
    }

    /// Disjunction of clauses
    ///
    /// False operands are dropped, a True operand collapses the whole
    /// disjunction, an empty disjunction is False (deny-by-default), and a
    /// single survivor is returned unwrapped.
    pub fn any(clauses: Vec<Predicate>) -> Self {
        let mut kept = Vec::with_capacity(clauses.len());
        for clause in clauses {
            match clause {
                Predicate::False => {}
                Predicate::True => return Predicate::True,
                other => kept.push(other),
            }
        }
        match kept.len() {
            0 => Predicate::False,
            1 => kept.pop().unwrap(),
            _ => Predicate::Or(kept),
        }
    }

    /// Conjunction with another predicate
    pub fn and(self, other: Predicate) -> Self {
        Predicate::all(vec![self, other])
    }

    // Domain shorthands used by the planner and the scope resolver.

    /// Notification id equals
    pub fn id_eq(id: NotificationId) -> Self {
        Predicate::eq(Field::Id, Scalar::Int(id.0))
    }

    /// Device id equals
    pub fn device_eq(device: DeviceId) -> Self {
        Predicate::eq(Field::Device, Scalar::Int(device.0))
    }

    /// Device id is one of the given set
    pub fn device_in(devices: &[DeviceId]) -> Self {
        Predicate::in_set(Field::Device, devices.iter().map(|d| Scalar::Int(d.0)).collect())
    }

    /// Network id is one of the given set
    pub fn network_in(networks: &[NetworkId]) -> Self {
        Predicate::in_set(
            Field::Network,
            networks.iter().map(|n| Scalar::Int(n.0)).collect(),
        )
    }

    /// Name equals
    pub fn name_eq(name: impl Into<String>) -> Self {
        Predicate::eq(Field::Name, Scalar::Text(name.into()))
    }

    /// Name is one of the given set
    pub fn name_in(names: &[String]) -> Self {
        Predicate::in_set(
            Field::Name,
            names.iter().map(|n| Scalar::Text(n.clone())).collect(),
        )
    }

    /// Timestamp strictly after the bound
    pub fn after(instant: DateTime<Utc>) -> Self {
        Predicate::gt(Field::Timestamp, Scalar::Time(instant))
    }

    /// Timestamp at or after the bound
    pub fn since(instant: DateTime<Utc>) -> Self {
        Predicate::gte(Field::Timestamp, Scalar::Time(instant))
    }

    /// Timestamp at or before the bound
    pub fn until(instant: DateTime<Utc>) -> Self {
        Predicate::lte(Field::Timestamp, Scalar::Time(instant))
    }

    /// Timestamp within the inclusive range
    pub fn time_between(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Predicate::between(Field::Timestamp, Scalar::Time(start), Scalar::Time(end))
    }

    /// True if any node in the tree references the field
    pub fn references(&self, field: Field) -> bool {
        match self {
            Predicate::True | Predicate::False => false,
            Predicate::Eq(f, _)
            | Predicate::In(f, _)
            | Predicate::Gt(f, _)
            | Predicate::Gte(f, _)
            | Predicate::Lte(f, _)
            | Predicate::Between(f, _, _) => *f == field,
            Predicate::And(clauses) | Predicate::Or(clauses) => {
                clauses.iter().any(|c| c.references(field))
            }
        }
    }

    /// Evaluates the predicate against a notification and its device
    ///
    /// Pure reference semantics for tests and fixtures; the production read
    /// path evaluates the same tree inside the compiled statement. Values of
    /// mismatched kinds never match.
    pub fn matches(&self, notification: &Notification, device: &Device) -> bool {
        match self {
            Predicate::True => true,
            Predicate::False => false,
            Predicate::Eq(field, expected) => {
                field_value(*field, notification, device) == *expected
            }
            Predicate::In(field, set) => {
                let actual = field_value(*field, notification, device);
                set.iter().any(|v| *v == actual)
            }
            Predicate::Gt(field, bound) => {
                matches!(
                    field_value(*field, notification, device).partial_cmp(bound),
                    Some(std::cmp::Ordering::Greater)
                )
            }
            Predicate::Gte(field, bound) => {
                matches!(
                    field_value(*field, notification, device).partial_cmp(bound),
                    Some(std::cmp::Ordering::Greater | std::cmp::Ordering::Equal)
                )
            }
            Predicate::Lte(field, bound) => {
                matches!(
                    field_value(*field, notification, device).partial_cmp(bound),
                    Some(std::cmp::Ordering::Less | std::cmp::Ordering::Equal)
                )
            }
            Predicate::Between(field, low, high) => {
                let actual = field_value(*field, notification, device);
                matches!(
                    actual.partial_cmp(low),
                    Some(std::cmp::Ordering::Greater | std::cmp::Ordering::Equal)
                ) && matches!(
                    actual.partial_cmp(high),
                    Some(std::cmp::Ordering::Less | std::cmp::Ordering::Equal)
                )
            }
            Predicate::And(clauses) => clauses.iter().all(|c| c.matches(notification, device)),
            Predicate::Or(clauses) => clauses.iter().any(|c| c.matches(notification, device)),
        }
    }
}

/// Extracts the attribute a field refers to
fn field_value(field: Field, notification: &Notification, device: &Device) -> Scalar {
    match field {
        Field::Id => Scalar::Int(notification.id.0),
        Field::Device => Scalar::Int(notification.device_id.0),
        Field::Network => Scalar::Int(device.network_id.0),
        Field::Name => Scalar::Text(notification.name.clone()),
        Field::Timestamp => Scalar::Time(notification.timestamp),
    }
}
