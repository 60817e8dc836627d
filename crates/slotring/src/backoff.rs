use crate::sync::{spin_loop, yield_now};

/// Exponential backoff for contended guard acquisition (Crossbeam-style).
///
/// The two guard entry points use it differently:
/// - the producer entry only ever calls [`spin`](Self::spin), which issues
///   PAUSE hints and never leaves the CPU;
/// - the consumer entry calls [`snooze`](Self::snooze), which spins first and
///   then yields the thread once spinning stops paying off.
#[derive(Debug)]
pub(crate) struct Backoff {
    step: u32,
}

impl Backoff {
    #[cfg(not(feature = "loom"))]
    const SPIN_LIMIT: u32 = 6; // 2^6 = 64 spins max per round
    // Under loom every spin hint is a scheduling point; keep rounds to one.
    #[cfg(feature = "loom")]
    const SPIN_LIMIT: u32 = 0;
    const YIELD_LIMIT: u32 = 10;

    /// Creates a new backoff instance.
    #[inline]
    pub(crate) fn new() -> Self {
        Self { step: 0 }
    }

    /// Busy-wait with PAUSE hints. Safe in contexts that must not sleep.
    #[inline]
    pub(crate) fn spin(&mut self) {
        let spins = 1 << self.step.min(Self::SPIN_LIMIT);
        for _ in 0..spins {
            spin_loop();
        }
        if self.step <= Self::SPIN_LIMIT {
            self.step += 1;
        }
    }

    /// Spin, then yield to the scheduler. Only for contexts allowed to block.
    #[inline]
    pub(crate) fn snooze(&mut self) {
        if self.step <= Self::SPIN_LIMIT {
            self.spin();
        } else {
            yield_now();
            if self.step <= Self::YIELD_LIMIT {
                self.step += 1;
            }
        }
    }

    /// True once the spin phase is exhausted; further `snooze` calls yield.
    #[inline]
    pub(crate) fn spins_exhausted(&self) -> bool {
        self.step > Self::SPIN_LIMIT
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new()
    }
}
