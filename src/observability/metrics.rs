//! Operational counters for the query engine
//!
//! Counters only: monotonic, exact, reset on process start. Increments
//! use relaxed atomics; a snapshot is a plain copy of the current
//! values, not a consistent cut across concurrent writers.

use std::sync::atomic::{AtomicU64, Ordering};

fn bump(counter: &AtomicU64) {
    counter.fetch_add(1, Ordering::Relaxed);
}

fn read(counter: &AtomicU64) -> u64 {
    counter.load(Ordering::Relaxed)
}

/// Counters for every operation outcome the service distinguishes
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    queries_executed: AtomicU64,
    queries_rejected: AtomicU64,
    queries_failed: AtomicU64,
    queries_cancelled: AtomicU64,
    queries_short_circuited: AtomicU64,
    polls_executed: AtomicU64,
    rows_returned: AtomicU64,
}

impl MetricsRegistry {
    /// All counters start at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// A query or lookup round trip reached the backend and succeeded
    pub fn increment_queries_executed(&self) {
        bump(&self.queries_executed);
    }

    /// A request failed validation before any statement existed
    pub fn increment_queries_rejected(&self) {
        bump(&self.queries_rejected);
    }

    /// The backend failed while running a statement
    pub fn increment_queries_failed(&self) {
        bump(&self.queries_failed);
    }

    /// A caller's cancellation fired before rows arrived
    pub fn increment_queries_cancelled(&self) {
        bump(&self.queries_cancelled);
    }

    /// An operation was answered empty without issuing a statement
    pub fn increment_queries_short_circuited(&self) {
        bump(&self.queries_short_circuited);
    }

    /// A poll round trip reached the backend and succeeded
    pub fn increment_polls_executed(&self) {
        bump(&self.polls_executed);
    }

    /// Rows handed back to callers, summed over all operations
    pub fn add_rows_returned(&self, rows: u64) {
        self.rows_returned.fetch_add(rows, Ordering::Relaxed);
    }

    /// Copies the current counter values
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            queries_executed: read(&self.queries_executed),
            queries_rejected: read(&self.queries_rejected),
            queries_failed: read(&self.queries_failed),
            queries_cancelled: read(&self.queries_cancelled),
            queries_short_circuited: read(&self.queries_short_circuited),
            polls_executed: read(&self.polls_executed),
            rows_returned: read(&self.rows_returned),
        }
    }

    /// Renders the current values as one JSON object
    pub fn to_json(&self) -> String {
        let s = self.snapshot();
        format!(
            concat!(
                r#"{{"queries_executed":{},"queries_rejected":{},"#,
                r#""queries_failed":{},"queries_cancelled":{},"#,
                r#""queries_short_circuited":{},"polls_executed":{},"#,
                r#""rows_returned":{}}}"#
            ),
            s.queries_executed,
            s.queries_rejected,
            s.queries_failed,
            s.queries_cancelled,
            s.queries_short_circuited,
            s.polls_executed,
            s.rows_returned,
        )
    }
}

/// A point-in-time copy of every counter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub queries_executed: u64,
    pub queries_rejected: u64,
    pub queries_failed: u64,
    pub queries_cancelled: u64,
    pub queries_short_circuited: u64,
    pub polls_executed: u64,
    pub rows_returned: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_fresh_registry_reads_zero() {
        let snapshot = MetricsRegistry::new().snapshot();

        assert_eq!(
            snapshot,
            MetricsSnapshot {
                queries_executed: 0,
                queries_rejected: 0,
                queries_failed: 0,
                queries_cancelled: 0,
                queries_short_circuited: 0,
                polls_executed: 0,
                rows_returned: 0,
            }
        );
    }

    #[test]
    fn test_counters_track_their_own_outcome() {
        let registry = MetricsRegistry::new();

        registry.increment_queries_executed();
        registry.increment_queries_executed();
        registry.increment_queries_rejected();
        registry.increment_queries_failed();
        registry.increment_queries_cancelled();
        registry.increment_queries_short_circuited();
        registry.increment_polls_executed();
        registry.add_rows_returned(7);

        let snapshot = registry.snapshot();
        assert_eq!(snapshot.queries_executed, 2);
        assert_eq!(snapshot.queries_rejected, 1);
        assert_eq!(snapshot.queries_failed, 1);
        assert_eq!(snapshot.queries_cancelled, 1);
        assert_eq!(snapshot.queries_short_circuited, 1);
        assert_eq!(snapshot.polls_executed, 1);
        assert_eq!(snapshot.rows_returned, 7);
    }

    #[test]
    fn test_snapshot_is_a_copy_not_a_view() {
        let registry = MetricsRegistry::new();
        registry.add_rows_returned(5);

        let before = registry.snapshot();
        registry.add_rows_returned(5);

        assert_eq!(before.rows_returned, 5);
        assert_eq!(registry.snapshot().rows_returned, 10);
    }

    #[test]
    fn test_json_rendering_matches_the_snapshot() {
        let registry = MetricsRegistry::new();
        registry.increment_queries_executed();
        registry.add_rows_returned(1234);

        let parsed: serde_json::Value = serde_json::from_str(&registry.to_json()).unwrap();
        assert_eq!(parsed["queries_executed"], 1);
        assert_eq!(parsed["rows_returned"], 1234);
        assert_eq!(parsed["polls_executed"], 0);
    }

    #[test]
    fn test_concurrent_increments_are_not_lost() {
        let registry = Arc::new(MetricsRegistry::new());

        let workers: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || {
                    for _ in 0..250 {
                        registry.increment_polls_executed();
                        registry.add_rows_returned(3);
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }

        let snapshot = registry.snapshot();
        assert_eq!(snapshot.polls_executed, 2000);
        assert_eq!(snapshot.rows_returned, 6000);
    }
}
