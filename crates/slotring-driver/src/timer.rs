//! Tokio-backed [`PeriodicTimer`].

use slotring::{PeriodicTimer, Timestamp};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tokio::time::Instant;

/// A one-shot deadline that the producer re-arms after every expiry.
///
/// Deadlines are kept as an offset from a fixed origin and advanced by
/// exactly one period per [`schedule_after`](PeriodicTimer::schedule_after),
/// so a late expiry does not push later ones back.
#[derive(Debug)]
pub struct TokioTimer {
    origin: Instant,
    /// Nanoseconds from `origin` to the next expiry.
    deadline: AtomicU64,
    armed: AtomicBool,
}

impl TokioTimer {
    /// Creates an unarmed timer whose clock starts now.
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            deadline: AtomicU64::new(0),
            armed: AtomicBool::new(false),
        }
    }

    /// Arms the first expiry `delay` after the origin.
    pub fn arm(&self, delay: Duration) {
        self.deadline.store(nanos(delay), Ordering::Relaxed);
        self.armed.store(true, Ordering::Release);
    }

    /// Disarms the timer. A deadline already taken by the runner is unaffected.
    pub fn cancel(&self) {
        self.armed.store(false, Ordering::Release);
    }

    pub fn is_armed(&self) -> bool {
        self.armed.load(Ordering::Acquire)
    }

    /// Consumes the armed deadline, if any.
    pub(crate) fn take_deadline(&self) -> Option<Instant> {
        if !self.armed.swap(false, Ordering::AcqRel) {
            return None;
        }
        let offset = self.deadline.load(Ordering::Relaxed);
        Some(self.origin + Duration::from_nanos(offset))
    }

    pub fn origin(&self) -> Instant {
        self.origin
    }
}

impl Default for TokioTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl PeriodicTimer for TokioTimer {
    fn now(&self) -> Timestamp {
        Timestamp::from_elapsed(self.origin.elapsed())
    }

    fn schedule_after(&self, period: Duration) {
        self.deadline.fetch_add(nanos(period), Ordering::Relaxed);
        self.armed.store(true, Ordering::Release);
    }
}

#[inline]
fn nanos(d: Duration) -> u64 {
    u64::try_from(d.as_nanos()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn deadlines_advance_by_whole_periods() {
        let timer = TokioTimer::new();
        let origin = timer.origin();
        assert!(timer.take_deadline().is_none());

        timer.arm(Duration::from_millis(100));
        assert_eq!(timer.take_deadline(), Some(origin + Duration::from_millis(100)));
        assert!(!timer.is_armed());

        // Late rescheduling still lands on the period grid.
        tokio::time::advance(Duration::from_millis(170)).await;
        timer.schedule_after(Duration::from_millis(100));
        assert_eq!(timer.take_deadline(), Some(origin + Duration::from_millis(200)));
    }

    #[tokio::test(start_paused = true)]
    async fn now_measures_from_origin() {
        let timer = TokioTimer::new();
        assert_eq!(timer.now(), Timestamp::ZERO);
        tokio::time::advance(Duration::from_millis(5)).await;
        assert_eq!(timer.now().as_duration(), Duration::from_millis(5));
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_disarms() {
        let timer = TokioTimer::new();
        timer.arm(Duration::from_secs(1));
        timer.cancel();
        assert!(timer.take_deadline().is_none());
    }
}
