use crate::sync::{AtomicU64, Ordering};

/// Outcome counters for a ring (uses atomics internally).
///
/// Updated outside the guard with relaxed adds; only the per-counter totals
/// are meaningful, not their relative ordering while calls are in flight.
#[derive(Debug)]
pub(crate) struct Metrics {
    written: AtomicU64,
    dropped: AtomicU64,
    consumed: AtomicU64,
    empty: AtomicU64,
}

impl Metrics {
    pub(crate) fn new() -> Self {
        Self {
            written: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
            consumed: AtomicU64::new(0),
            empty: AtomicU64::new(0),
        }
    }

    #[inline]
    pub(crate) fn add_written(&self) {
        self.written.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn add_dropped(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn add_consumed(&self) {
        self.consumed.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn add_empty(&self) {
        self.empty.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            written: self.written.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            consumed: self.consumed.load(Ordering::Relaxed),
            empty: self.empty.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of a ring's outcome counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Enqueues that stored an item.
    pub written: u64,
    /// Enqueues that found the cursor slot occupied.
    pub dropped: u64,
    /// Dequeues that returned an item.
    pub consumed: u64,
    /// Dequeues that found nothing.
    pub empty: u64,
}

impl MetricsSnapshot {
    /// Items written but not yet consumed, as implied by the counters.
    pub fn in_flight(&self) -> u64 {
        self.written.saturating_sub(self.consumed)
    }
}
