//! Dispatch metrics for observability

use std::sync::atomic::{AtomicU64, Ordering};

use contracts::DispatchOutcome;

use crate::publisher::GroupReport;

/// Monotonic counters for one dispatcher
///
/// Only counts; never consulted when classifying events.
#[derive(Debug, Default)]
pub struct DispatchMetrics {
    /// Dispatch calls completed
    batch_count: AtomicU64,
    /// Events classified succeeded
    succeeded_count: AtomicU64,
    /// Events classified invalid
    invalid_count: AtomicU64,
    /// Events classified failed
    failed_count: AtomicU64,
    /// Group publish attempts
    publish_count: AtomicU64,
    /// Group publish failures
    publish_failure_count: AtomicU64,
}

impl DispatchMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    pub fn batch_count(&self) -> u64 {
        self.batch_count.load(Ordering::Relaxed)
    }

    pub fn succeeded_count(&self) -> u64 {
        self.succeeded_count.load(Ordering::Relaxed)
    }

    pub fn invalid_count(&self) -> u64 {
        self.invalid_count.load(Ordering::Relaxed)
    }

    pub fn failed_count(&self) -> u64 {
        self.failed_count.load(Ordering::Relaxed)
    }

    pub fn publish_count(&self) -> u64 {
        self.publish_count.load(Ordering::Relaxed)
    }

    pub fn publish_failure_count(&self) -> u64 {
        self.publish_failure_count.load(Ordering::Relaxed)
    }

    /// Record the final outcome of one dispatch call
    pub fn record_outcome(&self, outcome: &DispatchOutcome) {
        self.batch_count.fetch_add(1, Ordering::Relaxed);
        self.succeeded_count
            .fetch_add(outcome.succeeded.len() as u64, Ordering::Relaxed);
        self.invalid_count
            .fetch_add(outcome.invalid.len() as u64, Ordering::Relaxed);
        self.failed_count
            .fetch_add(outcome.failed.len() as u64, Ordering::Relaxed);
    }

    /// Record one group publish
    pub fn record_group(&self, report: &GroupReport) {
        if !report.counts_as_publish() {
            return;
        }
        self.publish_count.fetch_add(1, Ordering::Relaxed);
        if report.publish_error.is_some() {
            self.publish_failure_count.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Get snapshot of all metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            batch_count: self.batch_count(),
            succeeded_count: self.succeeded_count(),
            invalid_count: self.invalid_count(),
            failed_count: self.failed_count(),
            publish_count: self.publish_count(),
            publish_failure_count: self.publish_failure_count(),
        }
    }
}

/// Snapshot of dispatch metrics (for reporting)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub batch_count: u64,
    pub succeeded_count: u64,
    pub invalid_count: u64,
    pub failed_count: u64,
    pub publish_count: u64,
    pub publish_failure_count: u64,
}
