use serde::Serialize;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use crate::status::OperationKind;

#[derive(Default)]
struct KindCounters {
    dispatched: AtomicUsize,
    succeeded: AtomicUsize,
    failed: AtomicUsize,
    // Timing (in microseconds)
    total_time_us: AtomicU64,
}

/// Per-operation-kind counters for dispatched intents.
#[derive(Default)]
pub struct Metrics {
    kinds: [KindCounters; 5],
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_dispatch(&self, kind: OperationKind) {
        self.kinds[kind.index()].dispatched.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_outcome(&self, kind: OperationKind, success: bool, duration: Duration) {
        let counters = &self.kinds[kind.index()];
        if success {
            counters.succeeded.fetch_add(1, Ordering::Relaxed);
        } else {
            counters.failed.fetch_add(1, Ordering::Relaxed);
        }
        counters.total_time_us.fetch_add(duration.as_micros() as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let operations: Vec<KindSnapshot> = OperationKind::ALL
            .iter()
            .map(|kind| {
                let counters = &self.kinds[kind.index()];
                let succeeded = counters.succeeded.load(Ordering::Relaxed);
                let failed = counters.failed.load(Ordering::Relaxed);
                KindSnapshot {
                    kind: *kind,
                    dispatched: counters.dispatched.load(Ordering::Relaxed),
                    succeeded,
                    failed,
                    avg_time_ms: avg_time_ms(counters.total_time_us.load(Ordering::Relaxed), succeeded + failed),
                }
            })
            .collect();

        MetricsSnapshot {
            total_dispatched: operations.iter().map(|k| k.dispatched).sum(),
            total_succeeded: operations.iter().map(|k| k.succeeded).sum(),
            total_failed: operations.iter().map(|k| k.failed).sum(),
            operations,
        }
    }
}

fn avg_time_ms(total_us: u64, count: usize) -> f64 {
    if count > 0 {
        total_us as f64 / count as f64 / 1000.0 // Convert to ms
    } else {
        0.0
    }
}

#[derive(Debug, Serialize)]
pub struct MetricsSnapshot {
    pub total_dispatched: usize,
    pub total_succeeded: usize,
    pub total_failed: usize,
    pub operations: Vec<KindSnapshot>,
}

#[derive(Debug, Serialize)]
pub struct KindSnapshot {
    pub kind: OperationKind,
    pub dispatched: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub avg_time_ms: f64,
}

pub struct TimedOperation {
    start: Instant,
}

impl TimedOperation {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_per_kind() {
        let metrics = Metrics::new();
        metrics.record_dispatch(OperationKind::Fetch);
        metrics.record_dispatch(OperationKind::Fetch);
        metrics.record_dispatch(OperationKind::Delete);
        metrics.record_outcome(OperationKind::Fetch, true, Duration::from_millis(4));
        metrics.record_outcome(OperationKind::Fetch, false, Duration::from_millis(2));
        metrics.record_outcome(OperationKind::Delete, false, Duration::from_millis(1));

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.total_dispatched, 3);
        assert_eq!(snapshot.total_succeeded, 1);
        assert_eq!(snapshot.total_failed, 2);

        let fetch = &snapshot.operations[0];
        assert_eq!(fetch.kind, OperationKind::Fetch);
        assert_eq!(fetch.dispatched, 2);
        assert!((fetch.avg_time_ms - 3.0).abs() < 1e-9);
        assert_eq!(snapshot.operations[4].avg_time_ms, 0.0);
    }
}
