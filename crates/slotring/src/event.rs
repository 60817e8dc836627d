//! Diagnostic events and the sinks that receive them.
//!
//! Every producer and consumer invocation ends in exactly one [`Event`]
//! handed to a [`DiagnosticSink`]. Sinks are called after the guard has been
//! released, never from inside a critical section.

use crate::slot::{Payload, Timestamp};
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

/// Outcome of one producer or consumer invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// The producer stored an item.
    Written {
        sequence: u64,
        timestamp: Timestamp,
        slot: usize,
    },
    /// The producer found the cursor slot occupied; `sequence` is lost.
    Overflow { sequence: u64 },
    /// The consumer took the oldest pending item.
    Consumed { sequence: u64, timestamp: Timestamp },
    /// The consumer fired with nothing pending.
    Empty,
}

impl Event {
    pub(crate) fn consumed(payload: Payload) -> Self {
        Self::Consumed {
            sequence: payload.sequence,
            timestamp: payload.timestamp,
        }
    }

    /// Sequence number the event refers to, if any.
    pub fn sequence(&self) -> Option<u64> {
        match *self {
            Self::Written { sequence, .. }
            | Self::Overflow { sequence }
            | Self::Consumed { sequence, .. } => Some(sequence),
            Self::Empty => None,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Written {
                sequence,
                timestamp,
                slot,
            } => write!(
                f,
                "Element stored with num: {sequence}, time: {timestamp} (slot {slot})"
            ),
            Self::Overflow { sequence } => write!(f, "list overflow with num: {sequence}"),
            Self::Consumed {
                sequence,
                timestamp,
            } => write!(f, "Element with num: {sequence}, time: {timestamp}"),
            Self::Empty => f.write_str("Filled element does not exist"),
        }
    }
}

/// Write-only destination for [`Event`]s.
pub trait DiagnosticSink: Send + Sync {
    fn report(&self, event: &Event);
}

impl<S: DiagnosticSink + ?Sized> DiagnosticSink for Arc<S> {
    fn report(&self, event: &Event) {
        (**self).report(event);
    }
}

impl<S: DiagnosticSink + ?Sized> DiagnosticSink for &S {
    fn report(&self, event: &Event) {
        (**self).report(event);
    }
}

/// Fan-out: report to both sinks, left first.
impl<A: DiagnosticSink, B: DiagnosticSink> DiagnosticSink for (A, B) {
    fn report(&self, event: &Event) {
        self.0.report(event);
        self.1.report(event);
    }
}

/// Sink that logs through `tracing`.
///
/// Overflow is a `warn`; everything else is `info`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&self, event: &Event) {
        match *event {
            Event::Written {
                sequence,
                timestamp,
                slot,
            } => tracing::info!(sequence, %timestamp, slot, "{event}"),
            Event::Overflow { sequence } => tracing::warn!(sequence, "{event}"),
            Event::Consumed {
                sequence,
                timestamp,
            } => tracing::info!(sequence, %timestamp, "{event}"),
            Event::Empty => tracing::info!("{event}"),
        }
    }
}

/// Sink that keeps every event in memory, in report order.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<Event>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything reported so far.
    pub fn events(&self) -> Vec<Event> {
        self.lock().clone()
    }

    /// Removes and returns everything reported so far.
    pub fn take(&self) -> Vec<Event> {
        std::mem::take(&mut *self.lock())
    }

    /// Number of recorded events matching `pred`.
    pub fn count(&self, pred: impl Fn(&Event) -> bool) -> usize {
        self.lock().iter().filter(|e| pred(e)).count()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Event>> {
        // A panicking reporter cannot leave the Vec half-written.
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl DiagnosticSink for MemorySink {
    fn report(&self, event: &Event) {
        self.lock().push(*event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_module_messages() {
        let consumed = Event::Consumed {
            sequence: 3,
            timestamp: Timestamp::from_nanos(42),
        };
        assert_eq!(consumed.to_string(), "Element with num: 3, time: 42");
        assert_eq!(
            Event::Overflow { sequence: 9 }.to_string(),
            "list overflow with num: 9"
        );
        assert_eq!(Event::Empty.to_string(), "Filled element does not exist");
    }

    #[test]
    fn sequence_accessor() {
        assert_eq!(Event::Overflow { sequence: 4 }.sequence(), Some(4));
        assert_eq!(Event::Empty.sequence(), None);
    }

    #[test]
    fn memory_sink_records_in_order() {
        let sink = MemorySink::new();
        sink.report(&Event::Empty);
        sink.report(&Event::Overflow { sequence: 1 });

        assert_eq!(
            sink.events(),
            vec![Event::Empty, Event::Overflow { sequence: 1 }]
        );
        assert_eq!(sink.count(|e| matches!(e, Event::Empty)), 1);
        assert_eq!(sink.take().len(), 2);
        assert!(sink.events().is_empty());
    }

    #[test]
    fn pair_fans_out() {
        let left = MemorySink::new();
        let right = MemorySink::new();
        let both = (&left, &right);

        both.report(&Event::Empty);

        assert_eq!(left.events(), vec![Event::Empty]);
        assert_eq!(right.events(), vec![Event::Empty]);
    }
}
