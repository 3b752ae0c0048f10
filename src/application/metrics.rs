//! Observability metrics for call-frequency controllers.
//!
//! Every controller owns a [`Metrics`] handle that can be cloned out and
//! queried at any time.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Metrics tracking how a controller treated incoming calls.
///
/// All metrics use atomic operations for thread-safe updates and reads.
#[derive(Debug, Clone)]
pub struct Metrics {
    inner: Arc<MetricsInner>,
}

#[derive(Debug)]
struct MetricsInner {
    /// Calls that reached the target
    calls_invoked: AtomicU64,
    /// Calls dropped by a throttle window or submission guard
    calls_suppressed: AtomicU64,
    /// Debounced calls replaced by a later call before firing
    calls_superseded: AtomicU64,
}

impl Metrics {
    /// Create a new metrics tracker.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MetricsInner {
                calls_invoked: AtomicU64::new(0),
                calls_suppressed: AtomicU64::new(0),
                calls_superseded: AtomicU64::new(0),
            }),
        }
    }

    pub(crate) fn record_invoked(&self) {
        self.inner.calls_invoked.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_suppressed(&self) {
        self.inner.calls_suppressed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_superseded(&self) {
        self.inner.calls_superseded.fetch_add(1, Ordering::Relaxed);
    }

    /// Get the number of calls that reached the target.
    pub fn calls_invoked(&self) -> u64 {
        self.inner.calls_invoked.load(Ordering::Relaxed)
    }

    /// Get the number of dropped calls.
    pub fn calls_suppressed(&self) -> u64 {
        self.inner.calls_suppressed.load(Ordering::Relaxed)
    }

    /// Get the number of debounced calls replaced before firing.
    pub fn calls_superseded(&self) -> u64 {
        self.inner.calls_superseded.load(Ordering::Relaxed)
    }

    /// Get a snapshot of all metrics.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            calls_invoked: self.calls_invoked(),
            calls_suppressed: self.calls_suppressed(),
            calls_superseded: self.calls_superseded(),
        }
    }

    /// Reset all metrics to zero.
    pub fn reset(&self) {
        self.inner.calls_invoked.store(0, Ordering::Relaxed);
        self.inner.calls_suppressed.store(0, Ordering::Relaxed);
        self.inner.calls_superseded.store(0, Ordering::Relaxed);
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// A point-in-time snapshot of metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Calls that reached the target
    pub calls_invoked: u64,
    /// Calls dropped by a throttle window or submission guard
    pub calls_suppressed: u64,
    /// Debounced calls replaced by a later call before firing
    pub calls_superseded: u64,
}

impl MetricsSnapshot {
    /// Fraction of calls that never reached the target (0.0 to 1.0).
    ///
    /// Suppressed and superseded calls both count as not reaching the
    /// target. Returns 0.0 if no calls have been seen.
    pub fn suppression_rate(&self) -> f64 {
        let total = self.total_calls();
        if total == 0 {
            0.0
        } else {
            self.calls_suppressed.saturating_add(self.calls_superseded) as f64 / total as f64
        }
    }

    /// Total number of calls seen by the controller.
    pub fn total_calls(&self) -> u64 {
        self.calls_invoked
            .saturating_add(self.calls_suppressed)
            .saturating_add(self.calls_superseded)
    }
}
