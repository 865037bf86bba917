//! Reputation processor metrics.
//!
//! Provides atomic counters for monitoring reputation ingestion.

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics for the reputation ingestor.
#[derive(Debug, Default)]
pub struct ReputationMetrics {
    /// Put events handled.
    puts_received: AtomicU64,

    /// Values handed to the trust sink.
    forwarded: AtomicU64,

    /// Approval transactions sent.
    approvals_sent: AtomicU64,

    /// Approval transactions that failed.
    approvals_failed: AtomicU64,

    /// Values ignored for a future epoch.
    ignored_epoch: AtomicU64,

    /// Manager resolution failures.
    manager_failures: AtomicU64,

    /// Trust sink failures.
    sink_failures: AtomicU64,

    /// Approvals skipped outside the alphabet.
    non_alphabet_skips: AtomicU64,

    /// Approvals skipped because the reporter is not a manager.
    wrong_manager: AtomicU64,
}

impl ReputationMetrics {
    /// Creates a new metrics instance.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a handled put event.
    pub fn record_put(&self) {
        self.puts_received.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a value handed to the trust sink.
    pub fn record_forwarded(&self) {
        self.forwarded.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a sent approval.
    pub fn record_approval(&self) {
        self.approvals_sent.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a failed approval.
    pub fn record_approval_failure(&self) {
        self.approvals_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a value ignored for its epoch.
    pub fn record_ignored_epoch(&self) {
        self.ignored_epoch.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a manager resolution failure.
    pub fn record_manager_failure(&self) {
        self.manager_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a trust sink failure.
    pub fn record_sink_failure(&self) {
        self.sink_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Records an approval skipped outside the alphabet.
    pub fn record_non_alphabet(&self) {
        self.non_alphabet_skips.fetch_add(1, Ordering::Relaxed);
    }

    /// Records an approval skipped for a wrong manager.
    pub fn record_wrong_manager(&self) {
        self.wrong_manager.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns handled put events.
    #[must_use]
    pub fn puts_received(&self) -> u64 {
        self.puts_received.load(Ordering::Relaxed)
    }

    /// Returns values handed to the trust sink.
    #[must_use]
    pub fn forwarded(&self) -> u64 {
        self.forwarded.load(Ordering::Relaxed)
    }

    /// Returns sent approvals.
    #[must_use]
    pub fn approvals_sent(&self) -> u64 {
        self.approvals_sent.load(Ordering::Relaxed)
    }

    /// Returns failed approvals.
    #[must_use]
    pub fn approvals_failed(&self) -> u64 {
        self.approvals_failed.load(Ordering::Relaxed)
    }

    /// Returns values ignored for their epoch.
    #[must_use]
    pub fn ignored_epoch(&self) -> u64 {
        self.ignored_epoch.load(Ordering::Relaxed)
    }

    /// Returns manager resolution failures.
    #[must_use]
    pub fn manager_failures(&self) -> u64 {
        self.manager_failures.load(Ordering::Relaxed)
    }

    /// Returns trust sink failures.
    #[must_use]
    pub fn sink_failures(&self) -> u64 {
        self.sink_failures.load(Ordering::Relaxed)
    }

    /// Returns approvals skipped outside the alphabet.
    #[must_use]
    pub fn non_alphabet_skips(&self) -> u64 {
        self.non_alphabet_skips.load(Ordering::Relaxed)
    }

    /// Returns approvals skipped for a wrong manager.
    #[must_use]
    pub fn wrong_manager(&self) -> u64 {
        self.wrong_manager.load(Ordering::Relaxed)
    }

    /// Returns the share of handled events that reached the trust sink.
    #[must_use]
    pub fn forward_rate(&self) -> f64 {
        let received = self.puts_received();
        if received == 0 {
            0.0
        } else {
            self.forwarded() as f64 / received as f64
        }
    }

    /// Returns a snapshot of all metrics.
    #[must_use]
    pub fn snapshot(&self) -> ReputationMetricsSnapshot {
        ReputationMetricsSnapshot {
            puts_received: self.puts_received(),
            forwarded: self.forwarded(),
            approvals_sent: self.approvals_sent(),
            approvals_failed: self.approvals_failed(),
            ignored_epoch: self.ignored_epoch(),
            manager_failures: self.manager_failures(),
            sink_failures: self.sink_failures(),
            non_alphabet_skips: self.non_alphabet_skips(),
            wrong_manager: self.wrong_manager(),
        }
    }

    /// Resets all counters.
    pub fn reset(&self) {
        self.puts_received.store(0, Ordering::Relaxed);
        self.forwarded.store(0, Ordering::Relaxed);
        self.approvals_sent.store(0, Ordering::Relaxed);
        self.approvals_failed.store(0, Ordering::Relaxed);
        self.ignored_epoch.store(0, Ordering::Relaxed);
        self.manager_failures.store(0, Ordering::Relaxed);
        self.sink_failures.store(0, Ordering::Relaxed);
        self.non_alphabet_skips.store(0, Ordering::Relaxed);
        self.wrong_manager.store(0, Ordering::Relaxed);
    }
}

/// A point-in-time snapshot of reputation metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReputationMetricsSnapshot {
    /// Put events handled.
    pub puts_received: u64,
    /// Values handed to the trust sink.
    pub forwarded: u64,
    /// Approval transactions sent.
    pub approvals_sent: u64,
    /// Approval transactions that failed.
    pub approvals_failed: u64,
    /// Values ignored for a future epoch.
    pub ignored_epoch: u64,
    /// Manager resolution failures.
    pub manager_failures: u64,
    /// Trust sink failures.
    pub sink_failures: u64,
    /// Approvals skipped outside the alphabet.
    pub non_alphabet_skips: u64,
    /// Approvals skipped for a wrong manager.
    pub wrong_manager: u64,
}
