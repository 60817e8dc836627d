//! Property-based tests for the ring's ordering and capacity guarantees.
//!
//! Every run is checked against a `VecDeque` model with drop-newest overflow:
//! if the ring agrees with the model on every step, it is a bounded FIFO.

#![cfg(not(feature = "loom"))]

use proptest::prelude::*;
use slotring::{Config, DequeueOutcome, EnqueueOutcome, Payload, Ring, Timestamp};
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy)]
enum Op {
    Enqueue,
    Dequeue,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![Just(Op::Enqueue), Just(Op::Dequeue)]
}

fn ring(capacity: usize) -> Ring {
    Ring::new(Config::default().with_capacity(capacity)).unwrap()
}

fn item(seq: u64) -> Payload {
    Payload::new(seq, Timestamp::from_nanos(seq.wrapping_mul(7)))
}

// =============================================================================
// Capacity bound
// =============================================================================

proptest! {
    /// With no dequeues, exactly the first N enqueues are written.
    #[test]
    fn prop_capacity_bound(
        capacity in 1usize..16,
        attempts in 0usize..64,
    ) {
        let ring = ring(capacity);
        let written = (1..=attempts as u64)
            .map(|seq| ring.enqueue(item(seq)))
            .take_while(EnqueueOutcome::is_written)
            .count();

        prop_assert_eq!(written, attempts.min(capacity));
        // And nothing after the first drop gets in.
        for seq in 0..4 {
            prop_assert!(attempts < capacity || ring.enqueue(item(1000 + seq)).is_dropped());
        }
        prop_assert_eq!(ring.occupied(), attempts.min(capacity));
    }
}

// =============================================================================
// FIFO order + occupancy conservation
// =============================================================================

proptest! {
    /// Ring agrees with a bounded VecDeque on every step of any op sequence.
    #[test]
    fn prop_matches_bounded_fifo_model(
        capacity in 1usize..8,
        ops in prop::collection::vec(op(), 1..200),
    ) {
        let ring = ring(capacity);
        let mut model: VecDeque<Payload> = VecDeque::new();
        let mut next_seq = 1u64;
        let (mut written, mut consumed) = (0u64, 0u64);

        for op in ops {
            match op {
                Op::Enqueue => {
                    let payload = item(next_seq);
                    next_seq += 1;
                    let outcome = ring.enqueue(payload);
                    if model.len() < capacity {
                        prop_assert!(outcome.is_written());
                        model.push_back(payload);
                        written += 1;
                    } else {
                        prop_assert!(outcome.is_dropped());
                    }
                }
                Op::Dequeue => {
                    let expected = model.pop_front();
                    let got = ring.dequeue().into_item();
                    prop_assert_eq!(got, expected);
                    if got.is_some() {
                        consumed += 1;
                    }
                }
            }

            let occupied = ring.occupied();
            prop_assert_eq!(occupied as u64, written - consumed);
            prop_assert!(occupied <= capacity);
        }

        let m = ring.metrics();
        prop_assert_eq!(m.written, written);
        prop_assert_eq!(m.consumed, consumed);
    }
}

proptest! {
    /// Dequeued sequence numbers are strictly increasing: no reordering, no
    /// double consumption.
    #[test]
    fn prop_dequeues_strictly_increase(
        capacity in 1usize..8,
        ops in prop::collection::vec(op(), 1..200),
    ) {
        let ring = ring(capacity);
        let mut next_seq = 1u64;
        let mut last_seen = 0u64;

        for op in ops {
            match op {
                Op::Enqueue => {
                    let _ = ring.enqueue(item(next_seq));
                    next_seq += 1;
                }
                Op::Dequeue => {
                    if let DequeueOutcome::Item(p) = ring.dequeue() {
                        prop_assert!(p.sequence > last_seen,
                            "got {} after {}", p.sequence, last_seen);
                        last_seen = p.sequence;
                    }
                }
            }
        }
    }
}
