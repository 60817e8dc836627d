//! slotring - Fixed-Capacity FIFO Between a Timer and a Trigger
//!
//! A ring of N slots shared by two independently triggered contexts:
//!
//! - a **producer** invoked on every timer period, which must never block
//!   (it may run where sleeping is illegal), and
//! - a **consumer** invoked on every external trigger (a button edge, say),
//!   which may block but never waits for data.
//!
//! # Key Properties
//!
//! - Exactly N items fit; further enqueues are dropped (drop-newest) and
//!   reported as overflow
//! - FIFO order from a single write cursor, with no separate read index
//! - One spinning [`Guard`] with two entry points: interrupt-masking and
//!   spin-only for the producer, yield-capable for the consumer
//! - Bounded critical sections: one slot inspection to enqueue, at most N to
//!   dequeue, no allocation after construction
//!
//! # Example
//!
//! ```
//! use slotring::{Config, DequeueOutcome, Payload, Ring, Timestamp};
//!
//! let ring: Ring = Ring::new(Config::default().with_capacity(3)).unwrap();
//!
//! for seq in 1..=4 {
//!     let outcome = ring.enqueue(Payload::new(seq, Timestamp::from_nanos(seq * 10)));
//!     println!("{seq}: {outcome:?}"); // the fourth is dropped
//! }
//!
//! assert_eq!(
//!     ring.dequeue(),
//!     DequeueOutcome::Item(Payload::new(1, Timestamp::from_nanos(10)))
//! );
//! ```

mod backoff;
mod config;
mod consumer;
mod error;
mod event;
mod guard;
mod invariants;
mod metrics;
mod producer;
mod ring;
mod slot;
mod stop;
mod sync;

pub use config::{
    Config, DEFAULT_CAPACITY, DEFAULT_PERIOD, FAST_CONFIG, MAX_CAPACITY, RELAXED_CONFIG,
};
pub use consumer::Consumer;
pub use error::ConfigError;
pub use event::{DiagnosticSink, Event, MemorySink, TracingSink};
pub use guard::{Guard, LocalInterrupts, NoInterrupts};
pub use metrics::MetricsSnapshot;
pub use producer::{PeriodReport, PeriodicTimer, Producer, SequenceGenerator};
pub use ring::{DequeueOutcome, EnqueueOutcome, Ring};
pub use slot::{Payload, Timestamp};
pub use stop::StopSignal;
