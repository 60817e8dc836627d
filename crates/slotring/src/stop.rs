//! Shared stop flag for the producer's self-rescheduling.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A cloneable flag that stops the producer from rescheduling itself.
///
/// The producer checks it after each period fires. Raising it never
/// interrupts a period already in progress; that period completes normally
/// and simply does not arm the next one.
#[derive(Debug, Clone, Default)]
pub struct StopSignal {
    stopped: Arc<AtomicBool>,
}

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests that no further periods be scheduled. Idempotent.
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::Release);
    }

    /// Returns `true` once [`stop`](Self::stop) has been called on any clone.
    #[inline]
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_state() {
        let signal = StopSignal::new();
        let clone = signal.clone();
        assert!(!clone.is_stopped());

        signal.stop();
        signal.stop();
        assert!(clone.is_stopped());
    }
}
