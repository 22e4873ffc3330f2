//! Logging and metrics for the query lifecycle
//!
//! Every service operation emits typed [`Event`]s through a line-based
//! JSON logger and bumps counters in a [`MetricsRegistry`]. Emission is
//! synchronous and never feeds back into planning or execution.

mod events;
mod logger;
mod metrics;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use metrics::{MetricsRegistry, MetricsSnapshot};

/// Emits a lifecycle event with no extra fields
pub fn log_event(event: Event) {
    log_event_with_fields(event, &[]);
}

/// Emits a lifecycle event, routing error-severity lines to stderr
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    let severity = event.severity();
    if severity == Severity::Error {
        Logger::log_stderr(severity, event.as_str(), fields);
    } else {
        Logger::log(severity, event.as_str(), fields);
    }
}
