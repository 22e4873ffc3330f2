//! Observability events for the notification query engine
//!
//! Events are explicit and typed. Each maps to a stable wire name so
//! log consumers can filter without parsing free-form messages.

use std::fmt;

use super::Severity;

/// Observable events in the query lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Query lifecycle
    /// A query request was accepted for planning
    QueryReceived,
    /// Planning produced an executable plan
    QueryPlanned,
    /// The plan collapsed to a provably empty result, no statement issued
    QueryShortCircuited,
    /// Execution finished and rows were returned
    QueryCompleted,
    /// Validation rejected the request before execution
    QueryRejected,
    /// The backend reported a persistence failure
    QueryFailed,
    /// The caller's cancellation signal fired before rows arrived
    QueryCancelled,

    // Poll lifecycle
    /// A poll request was accepted for planning
    PollReceived,
    /// A poll finished and rows were returned
    PollCompleted,
}

impl Event {
    /// Returns the stable wire name for this event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::QueryReceived => "QUERY_BEGIN",
            Event::QueryPlanned => "QUERY_PLANNED",
            Event::QueryShortCircuited => "QUERY_SHORT_CIRCUIT",
            Event::QueryCompleted => "QUERY_COMPLETE",
            Event::QueryRejected => "QUERY_REJECTED",
            Event::QueryFailed => "QUERY_FAILED",
            Event::QueryCancelled => "QUERY_CANCELLED",
            Event::PollReceived => "POLL_BEGIN",
            Event::PollCompleted => "POLL_COMPLETE",
        }
    }

    /// Returns the severity this event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            Event::QueryReceived
            | Event::QueryPlanned
            | Event::QueryShortCircuited
            | Event::QueryCompleted
            | Event::PollReceived
            | Event::PollCompleted => Severity::Info,
            Event::QueryRejected | Event::QueryCancelled => Severity::Warn,
            Event::QueryFailed => Severity::Error,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
