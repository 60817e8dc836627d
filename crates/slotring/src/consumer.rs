//! Trigger-driven consumer: one dequeue attempt per external trigger.

use crate::event::{DiagnosticSink, Event};
use crate::guard::{LocalInterrupts, NoInterrupts};
use crate::ring::{DequeueOutcome, Ring};
use std::sync::Arc;

/// Reader side of the ring.
///
/// Runs in a context that may block, but never waits for data: a trigger with
/// nothing pending is an ordinary [`Event::Empty`].
pub struct Consumer<S, I: LocalInterrupts = NoInterrupts> {
    ring: Arc<Ring<I>>,
    sink: S,
}

impl<S: DiagnosticSink, I: LocalInterrupts> Consumer<S, I> {
    pub fn new(ring: Arc<Ring<I>>, sink: S) -> Self {
        Self { ring, sink }
    }

    /// Trigger callback. Call once per edge.
    pub fn on_trigger_fired(&self) -> DequeueOutcome {
        let outcome = self.ring.dequeue();
        let event = match outcome {
            DequeueOutcome::Item(payload) => Event::consumed(payload),
            DequeueOutcome::Empty => Event::Empty,
        };
        self.sink.report(&event);
        outcome
    }

    pub fn ring(&self) -> &Arc<Ring<I>> {
        &self.ring
    }
}

#[cfg(all(test, not(feature = "loom")))]
mod tests {
    use super::*;
    use crate::{MemorySink, Payload, Timestamp};

    #[test]
    fn empty_trigger_is_reported_not_failed() {
        let ring: Arc<Ring> = Arc::new(Ring::with_capacity(5).unwrap());
        let sink = MemorySink::new();
        let consumer = Consumer::new(ring, &sink);

        assert_eq!(consumer.on_trigger_fired(), DequeueOutcome::Empty);
        assert_eq!(sink.events(), vec![Event::Empty]);
    }

    #[test]
    fn consumed_item_reports_sequence_and_time() {
        let ring: Arc<Ring> = Arc::new(Ring::with_capacity(5).unwrap());
        let _ = ring.enqueue(Payload::new(7, Timestamp::from_nanos(99)));
        let sink = MemorySink::new();
        let consumer = Consumer::new(Arc::clone(&ring), &sink);

        let outcome = consumer.on_trigger_fired();

        assert_eq!(
            outcome,
            DequeueOutcome::Item(Payload::new(7, Timestamp::from_nanos(99)))
        );
        assert_eq!(
            sink.events(),
            vec![Event::Consumed {
                sequence: 7,
                timestamp: Timestamp::from_nanos(99)
            }]
        );
        assert!(ring.is_empty());
    }
}
