//! Dispatch metrics.
//!
//! Provides atomic counters for monitoring router outcomes.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters shared by the notification and notary routers of one processor.
#[derive(Debug, Default)]
pub struct DispatchMetrics {
    /// Raw notifications seen.
    notifications_received: AtomicU64,

    /// Raw notary requests seen.
    notary_received: AtomicU64,

    /// Events handed to the worker pool.
    dispatched: AtomicU64,

    /// Items without a matching registration.
    ignored: AtomicU64,

    /// Payloads that failed to decode.
    decode_failures: AtomicU64,

    /// Decoded events without a handler.
    missing_handlers: AtomicU64,

    /// Events dropped because the pool rejected them.
    rejected: AtomicU64,
}

impl DispatchMetrics {
    /// Creates a new metrics instance.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a raw notification.
    pub fn record_notification(&self) {
        self.notifications_received.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a raw notary request.
    pub fn record_notary(&self) {
        self.notary_received.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a dispatched event.
    pub fn record_dispatched(&self) {
        self.dispatched.fetch_add(1, Ordering::Relaxed);
    }

    /// Records an ignored item.
    pub fn record_ignored(&self) {
        self.ignored.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a decode failure.
    pub fn record_decode_failure(&self) {
        self.decode_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a decoded event without a handler.
    pub fn record_missing_handler(&self) {
        self.missing_handlers.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a pool rejection.
    pub fn record_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns raw notifications seen.
    #[must_use]
    pub fn notifications_received(&self) -> u64 {
        self.notifications_received.load(Ordering::Relaxed)
    }

    /// Returns raw notary requests seen.
    #[must_use]
    pub fn notary_received(&self) -> u64 {
        self.notary_received.load(Ordering::Relaxed)
    }

    /// Returns dispatched events.
    #[must_use]
    pub fn dispatched(&self) -> u64 {
        self.dispatched.load(Ordering::Relaxed)
    }

    /// Returns ignored items.
    #[must_use]
    pub fn ignored(&self) -> u64 {
        self.ignored.load(Ordering::Relaxed)
    }

    /// Returns decode failures.
    #[must_use]
    pub fn decode_failures(&self) -> u64 {
        self.decode_failures.load(Ordering::Relaxed)
    }

    /// Returns decoded events without a handler.
    #[must_use]
    pub fn missing_handlers(&self) -> u64 {
        self.missing_handlers.load(Ordering::Relaxed)
    }

    /// Returns pool rejections.
    #[must_use]
    pub fn rejected(&self) -> u64 {
        self.rejected.load(Ordering::Relaxed)
    }

    /// Returns every event lost after a registration matched.
    #[must_use]
    pub fn dropped(&self) -> u64 {
        self.decode_failures()
            .saturating_add(self.missing_handlers())
            .saturating_add(self.rejected())
    }

    /// Returns a snapshot of all metrics.
    #[must_use]
    pub fn snapshot(&self) -> DispatchMetricsSnapshot {
        DispatchMetricsSnapshot {
            notifications_received: self.notifications_received(),
            notary_received: self.notary_received(),
            dispatched: self.dispatched(),
            ignored: self.ignored(),
            decode_failures: self.decode_failures(),
            missing_handlers: self.missing_handlers(),
            rejected: self.rejected(),
        }
    }

    /// Resets all counters.
    pub fn reset(&self) {
        self.notifications_received.store(0, Ordering::Relaxed);
        self.notary_received.store(0, Ordering::Relaxed);
        self.dispatched.store(0, Ordering::Relaxed);
        self.ignored.store(0, Ordering::Relaxed);
        self.decode_failures.store(0, Ordering::Relaxed);
        self.missing_handlers.store(0, Ordering::Relaxed);
        self.rejected.store(0, Ordering::Relaxed);
    }
}

/// A point-in-time snapshot of dispatch metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DispatchMetricsSnapshot {
    /// Raw notifications seen.
    pub notifications_received: u64,
    /// Raw notary requests seen.
    pub notary_received: u64,
    /// Events handed to the worker pool.
    pub dispatched: u64,
    /// Items without a matching registration.
    pub ignored: u64,
    /// Payloads that failed to decode.
    pub decode_failures: u64,
    /// Decoded events without a handler.
    pub missing_handlers: u64,
    /// Pool rejections.
    pub rejected: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_new() {
        let metrics = DispatchMetrics::new();
        assert_eq!(metrics.snapshot(), DispatchMetricsSnapshot::default());
    }

    #[test]
    fn test_metrics_dropped() {
        let metrics = DispatchMetrics::new();

        metrics.record_decode_failure();
        metrics.record_missing_handler();
        metrics.record_rejected();
        metrics.record_rejected();
        metrics.record_ignored();

        assert_eq!(metrics.dropped(), 4);
        assert_eq!(metrics.rejected(), 2);
        assert_eq!(metrics.ignored(), 1);
    }

    #[test]
    fn test_metrics_reset() {
        let metrics = DispatchMetrics::new();

        metrics.record_notification();
        metrics.record_notary();
        metrics.record_dispatched();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.notifications_received, 1);
        assert_eq!(snapshot.notary_received, 1);
        assert_eq!(snapshot.dispatched, 1);

        metrics.reset();
        assert_eq!(metrics.snapshot(), DispatchMetricsSnapshot::default());
    }
}
