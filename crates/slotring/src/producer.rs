//! Periodic producer: one enqueue attempt per timer period.

use crate::event::{DiagnosticSink, Event};
use crate::guard::{LocalInterrupts, NoInterrupts};
use crate::invariants::debug_assert_sequence_increases;
use crate::ring::{EnqueueOutcome, Ring};
use crate::slot::{Payload, Timestamp};
use crate::stop::StopSignal;
use std::sync::Arc;
use std::time::Duration;

/// The periodic timer facility the producer runs on.
///
/// Both methods are called from the producer's own (non-blocking) context, so
/// implementations must return promptly and must not sleep.
pub trait PeriodicTimer {
    /// Current time on a monotonic clock.
    fn now(&self) -> Timestamp;

    /// Arms the timer to fire once more, `period` after the previous expiry.
    fn schedule_after(&self, period: Duration);
}

impl<T: PeriodicTimer + ?Sized> PeriodicTimer for Arc<T> {
    fn now(&self) -> Timestamp {
        (**self).now()
    }

    fn schedule_after(&self, period: Duration) {
        (**self).schedule_after(period);
    }
}

/// Strictly increasing sequence numbers starting at 1.
///
/// Owned by the producer alone, so it needs no synchronization.
#[derive(Debug, Default)]
pub struct SequenceGenerator {
    last: u64,
}

impl SequenceGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the next sequence number.
    #[inline]
    pub fn next(&mut self) -> u64 {
        let next = self.last + 1;
        debug_assert_sequence_increases!(self.last, next);
        self.last = next;
        next
    }

    /// The most recently issued number, or 0 before the first call.
    #[inline]
    pub fn last(&self) -> u64 {
        self.last
    }
}

/// What one producer invocation did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodReport {
    /// Sequence number assigned this period.
    pub sequence: u64,
    /// Enqueue result for that sequence number.
    pub outcome: EnqueueOutcome,
    /// Whether the next period was armed.
    pub rescheduled: bool,
}

/// Writer side of the ring, driven by a [`PeriodicTimer`].
pub struct Producer<Tm, S, I: LocalInterrupts = NoInterrupts> {
    ring: Arc<Ring<I>>,
    timer: Tm,
    sink: S,
    sequence: SequenceGenerator,
    stop: StopSignal,
}

impl<Tm, S, I> Producer<Tm, S, I>
where
    Tm: PeriodicTimer,
    S: DiagnosticSink,
    I: LocalInterrupts,
{
    /// Creates a producer that writes into `ring` every `ring.config().period`.
    pub fn new(ring: Arc<Ring<I>>, timer: Tm, sink: S, stop: StopSignal) -> Self {
        Self {
            ring,
            timer,
            sink,
            sequence: SequenceGenerator::new(),
            stop,
        }
    }

    /// Timer callback. Call once per expiry.
    ///
    /// Captures the time, takes the next sequence number, attempts one
    /// enqueue, reports the result, then re-arms the timer unless the stop
    /// signal is raised. An overflow loses the item; it is reported and
    /// nothing is retried.
    pub fn on_period_fired(&mut self) -> PeriodReport {
        tracing::trace!("period fired");
        let timestamp = self.timer.now();
        let sequence = self.sequence.next();

        let outcome = self.ring.enqueue(Payload::new(sequence, timestamp));

        let event = match outcome {
            EnqueueOutcome::Written { slot } => Event::Written {
                sequence,
                timestamp,
                slot,
            },
            EnqueueOutcome::Dropped { .. } => Event::Overflow { sequence },
        };
        self.sink.report(&event);

        let rescheduled = !self.stop.is_stopped();
        if rescheduled {
            self.timer.schedule_after(self.period());
        }

        PeriodReport {
            sequence,
            outcome,
            rescheduled,
        }
    }

    /// Interval between invocations.
    #[inline]
    pub fn period(&self) -> Duration {
        self.ring.config().period
    }

    /// The most recently assigned sequence number.
    pub fn last_sequence(&self) -> u64 {
        self.sequence.last()
    }

    pub fn timer(&self) -> &Tm {
        &self.timer
    }

    pub fn ring(&self) -> &Arc<Ring<I>> {
        &self.ring
    }
}

#[cfg(all(test, not(feature = "loom")))]
mod tests {
    use super::*;
    use crate::{Config, MemorySink};
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Mutex;

    /// Clock that advances by one period per `schedule_after`.
    #[derive(Default)]
    struct ManualTimer {
        now: AtomicU64,
        armed: Mutex<Vec<Duration>>,
    }

    impl PeriodicTimer for ManualTimer {
        fn now(&self) -> Timestamp {
            Timestamp::from_nanos(self.now.load(Ordering::Relaxed))
        }

        fn schedule_after(&self, period: Duration) {
            self.now
                .fetch_add(period.as_nanos() as u64, Ordering::Relaxed);
            self.armed.lock().unwrap().push(period);
        }
    }

    fn producer(
        capacity: usize,
    ) -> (
        Producer<Arc<ManualTimer>, Arc<MemorySink>>,
        Arc<ManualTimer>,
        Arc<MemorySink>,
        StopSignal,
    ) {
        let config = Config::default()
            .with_capacity(capacity)
            .with_period(Duration::from_millis(10));
        let ring = Arc::new(Ring::new(config).unwrap());
        let timer = Arc::new(ManualTimer::default());
        let sink = Arc::new(MemorySink::new());
        let stop = StopSignal::new();
        let producer = Producer::new(
            ring,
            Arc::clone(&timer),
            Arc::clone(&sink),
            stop.clone(),
        );
        (producer, timer, sink, stop)
    }

    #[test]
    fn sequence_starts_at_one_and_increases() {
        let mut seq = SequenceGenerator::new();
        assert_eq!(seq.last(), 0);
        assert_eq!(seq.next(), 1);
        assert_eq!(seq.next(), 2);
        assert_eq!(seq.last(), 2);
    }

    #[test]
    fn first_period_writes_sequence_one() {
        let (mut producer, timer, sink, _stop) = producer(5);

        let report = producer.on_period_fired();

        assert_eq!(report.sequence, 1);
        assert_eq!(report.outcome, EnqueueOutcome::Written { slot: 0 });
        assert!(report.rescheduled);
        assert_eq!(
            sink.events(),
            vec![Event::Written {
                sequence: 1,
                timestamp: Timestamp::ZERO,
                slot: 0
            }]
        );
        assert_eq!(*timer.armed.lock().unwrap(), vec![Duration::from_millis(10)]);
    }

    #[test]
    fn overflow_reports_lost_sequence() {
        let (mut producer, _timer, sink, _stop) = producer(2);

        for _ in 0..4 {
            let _ = producer.on_period_fired();
        }

        let overflowed: Vec<u64> = sink
            .events()
            .iter()
            .filter_map(|e| match e {
                Event::Overflow { sequence } => Some(*sequence),
                _ => None,
            })
            .collect();
        assert_eq!(overflowed, vec![3, 4]);
        // Lost numbers are not reused.
        assert_eq!(producer.last_sequence(), 4);
    }

    #[test]
    fn timestamps_follow_the_timer() {
        let (mut producer, _timer, _sink, _stop) = producer(3);
        for _ in 0..3 {
            let _ = producer.on_period_fired();
        }

        let stamps: Vec<u64> = producer
            .ring()
            .drain()
            .iter()
            .map(|p| p.timestamp.as_nanos())
            .collect();
        assert_eq!(stamps, vec![0, 10_000_000, 20_000_000]);
    }

    #[test]
    fn stop_signal_prevents_rescheduling() {
        let (mut producer, timer, _sink, stop) = producer(5);
        let _ = producer.on_period_fired();

        stop.stop();
        let report = producer.on_period_fired();

        // The fired period still completes.
        assert!(report.outcome.is_written());
        assert!(!report.rescheduled);
        assert_eq!(timer.armed.lock().unwrap().len(), 1);
    }
}
