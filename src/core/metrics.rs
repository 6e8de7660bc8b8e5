//! Service metrics for observability
//!
//! Counters for monitoring the dispatcher and the producer pipeline:
//! records dispatched and dropped, pool exhaustion, drain contention and
//! file rotations.

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics for log service observability
///
/// # Example
///
/// ```
/// use log_service::LoggerMetrics;
///
/// let metrics = LoggerMetrics::new();
///
/// metrics.record_dispatched();
/// metrics.record_dropped();
///
/// assert_eq!(metrics.dispatched_count(), 1);
/// assert_eq!(metrics.dropped_count(), 1);
/// ```
#[derive(Debug)]
pub struct LoggerMetrics {
    /// Records routed to their destinations
    dispatched: AtomicU64,

    /// Records a destination failed to persist
    dropped: AtomicU64,

    /// Records allocated outside the pool
    overflow_allocations: AtomicU64,

    /// Emissions skipped by the level filter
    filtered: AtomicU64,

    /// Drain attempts that found the queue lock held
    contended_drains: AtomicU64,

    /// Blocking drains forced after too many contended attempts
    forced_drains: AtomicU64,

    /// Files opened by rolling destinations
    rotations: AtomicU64,
}

impl LoggerMetrics {
    /// Create a new metrics instance with all counters at zero
    pub const fn new() -> Self {
        Self {
            dispatched: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
            overflow_allocations: AtomicU64::new(0),
            filtered: AtomicU64::new(0),
            contended_drains: AtomicU64::new(0),
            forced_drains: AtomicU64::new(0),
            rotations: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn dispatched_count(&self) -> u64 {
        self.dispatched.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn dropped_count(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn overflow_allocations(&self) -> u64 {
        self.overflow_allocations.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn filtered_count(&self) -> u64 {
        self.filtered.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn contended_drains(&self) -> u64 {
        self.contended_drains.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn forced_drains(&self) -> u64 {
        self.forced_drains.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn rotations(&self) -> u64 {
        self.rotations.load(Ordering::Relaxed)
    }

    /// Record a dispatched record, returns the previous count
    #[inline]
    pub fn record_dispatched(&self) -> u64 {
        self.dispatched.fetch_add(1, Ordering::Relaxed)
    }

    /// Record a dropped write, returns the previous count
    #[inline]
    pub fn record_dropped(&self) -> u64 {
        self.dropped.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_overflow_allocation(&self) -> u64 {
        self.overflow_allocations.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_filtered(&self) -> u64 {
        self.filtered.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_contended_drain(&self) -> u64 {
        self.contended_drains.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_forced_drain(&self) -> u64 {
        self.forced_drains.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_rotation(&self) -> u64 {
        self.rotations.fetch_add(1, Ordering::Relaxed)
    }

    /// Get drop rate as a percentage (0.0 - 100.0) of all routed records
    ///
    /// Returns 0.0 if nothing has been routed.
    pub fn drop_rate(&self) -> f64 {
        let dropped = self.dropped_count() as f64;
        let total = self.dispatched_count() as f64 + dropped;
        if total == 0.0 {
            0.0
        } else {
            (dropped / total) * 100.0
        }
    }

    /// Reset all metrics to zero
    pub fn reset(&self) {
        self.dispatched.store(0, Ordering::Relaxed);
        self.dropped.store(0, Ordering::Relaxed);
        self.overflow_allocations.store(0, Ordering::Relaxed);
        self.filtered.store(0, Ordering::Relaxed);
        self.contended_drains.store(0, Ordering::Relaxed);
        self.forced_drains.store(0, Ordering::Relaxed);
        self.rotations.store(0, Ordering::Relaxed);
    }
}

impl Default for LoggerMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for LoggerMetrics {
    /// Create a snapshot of the current metrics values
    fn clone(&self) -> Self {
        Self {
            dispatched: AtomicU64::new(self.dispatched_count()),
            dropped: AtomicU64::new(self.dropped_count()),
            overflow_allocations: AtomicU64::new(self.overflow_allocations()),
            filtered: AtomicU64::new(self.filtered_count()),
            contended_drains: AtomicU64::new(self.contended_drains()),
            forced_drains: AtomicU64::new(self.forced_drains()),
            rotations: AtomicU64::new(self.rotations()),
        }
    }
}
