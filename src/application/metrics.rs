//! Observability metrics for throttling.
//!
//! Provides counters describing how calls into a throttle were handled.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Metrics tracking throttling statistics.
///
/// All metrics use atomic operations for thread-safe updates and reads.
/// Clones share the same counters.
#[derive(Debug, Clone)]
pub struct Metrics {
    inner: Arc<MetricsInner>,
}

#[derive(Debug)]
struct MetricsInner {
    /// Calls that ran the target on the leading edge
    immediate_runs: AtomicU64,
    /// Calls that armed a trailing flush
    deferred_calls: AtomicU64,
    /// Calls that replaced the pending call of an armed flush
    coalesced_calls: AtomicU64,
    /// Flushes that ran the target on the trailing edge
    trailing_runs: AtomicU64,
}

impl Metrics {
    /// Create a new metrics tracker.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MetricsInner {
                immediate_runs: AtomicU64::new(0),
                deferred_calls: AtomicU64::new(0),
                coalesced_calls: AtomicU64::new(0),
                trailing_runs: AtomicU64::new(0),
            }),
        }
    }

    pub(crate) fn record_immediate(&self) {
        self.inner.immediate_runs.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_deferred(&self) {
        self.inner.deferred_calls.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_coalesced(&self) {
        self.inner.coalesced_calls.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_trailing(&self) {
        self.inner.trailing_runs.fetch_add(1, Ordering::Relaxed);
    }

    /// Get the number of leading-edge executions.
    pub fn immediate_runs(&self) -> u64 {
        self.inner.immediate_runs.load(Ordering::Relaxed)
    }

    /// Get the number of calls that armed a trailing flush.
    pub fn deferred_calls(&self) -> u64 {
        self.inner.deferred_calls.load(Ordering::Relaxed)
    }

    /// Get the number of calls that overwrote an already pending call.
    pub fn coalesced_calls(&self) -> u64 {
        self.inner.coalesced_calls.load(Ordering::Relaxed)
    }

    /// Get the number of trailing-edge executions.
    pub fn trailing_runs(&self) -> u64 {
        self.inner.trailing_runs.load(Ordering::Relaxed)
    }

    /// Get a snapshot of all metrics.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            immediate_runs: self.immediate_runs(),
            deferred_calls: self.deferred_calls(),
            coalesced_calls: self.coalesced_calls(),
            trailing_runs: self.trailing_runs(),
        }
    }

    /// Reset all metrics to zero.
    pub fn reset(&self) {
        self.inner.immediate_runs.store(0, Ordering::Relaxed);
        self.inner.deferred_calls.store(0, Ordering::Relaxed);
        self.inner.coalesced_calls.store(0, Ordering::Relaxed);
        self.inner.trailing_runs.store(0, Ordering::Relaxed);
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
    /// Leading-edge executions
    pub immediate_runs: u64,
    /// Calls that armed a trailing flush
    pub deferred_calls: u64,
    /// Calls that replaced a pending call
    pub coalesced_calls: u64,
    /// Trailing-edge executions
    pub trailing_runs: u64,
}

impl MetricsSnapshot {
    /// Total number of calls received by the throttle.
    pub fn total_calls(&self) -> u64 {
        self.immediate_runs
            .saturating_add(self.deferred_calls)
            .saturating_add(self.coalesced_calls)
    }

    /// Total number of target executions, leading and trailing.
    pub fn executions(&self) -> u64 {
        self.immediate_runs.saturating_add(self.trailing_runs)
    }

    /// Fraction of calls that never reached the target (0.0 to 1.0).
    ///
    /// Every coalesced call drops the call it replaced, so this is the ratio of
    /// coalesced calls to total calls. Returns 0.0 if no calls have been made.
    pub fn drop_rate(&self) -> f64 {
        let total = self.total_calls();
        if total == 0 {
            0.0
        } else {
            self.coalesced_calls as f64 / total as f64
        }
    }
}
