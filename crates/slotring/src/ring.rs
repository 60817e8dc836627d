use crate::guard::{Guard, LocalInterrupts, NoInterrupts};
use crate::invariants::{
    debug_assert_bounded_occupancy, debug_assert_contiguous_run, debug_assert_cursor_in_bounds,
};
use crate::metrics::{Metrics, MetricsSnapshot};
use crate::slot::{Payload, Slot};
use crate::{Config, ConfigError};

// =============================================================================
// ORDERING WITHOUT A READ CURSOR
// =============================================================================
//
// The ring keeps a single write cursor. There is no head index.
//
// ## Enqueue
//
// Targets the slot at `cursor`. If it is free the payload is stored and the
// cursor advances by one (mod N). If it is occupied nothing changes: the new
// item is dropped and the cursor stays put.
//
// ## Dequeue
//
// Scans forward from `cursor` over at most N slots and takes the first
// occupied one. The cursor does not move.
//
// ## Why that is FIFO
//
// Writes only ever land at the cursor and the cursor only advances on a
// successful write, so the occupied slots are always the run
// `cursor-k .. cursor-1` for k items. Consumption removes from the front of
// that run (the first occupied slot after the cursor), which is the item
// written k writes ago. When the ring is full, `cursor` itself holds the
// oldest item, so the scan finds it immediately and the next write refills it.
//
// Both operations run inside the guard: enqueue through the producer entry,
// everything else through the consumer entry.
//
// =============================================================================

/// Result of an enqueue attempt.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnqueueOutcome {
    /// The payload was stored in `slot`.
    Written {
        /// Index the payload landed in.
        slot: usize,
    },
    /// The slot at the cursor was still occupied; the payload was discarded.
    Dropped {
        /// Index of the occupied cursor slot.
        slot: usize,
    },
}

impl EnqueueOutcome {
    #[inline]
    pub fn is_written(&self) -> bool {
        matches!(self, Self::Written { .. })
    }

    #[inline]
    pub fn is_dropped(&self) -> bool {
        matches!(self, Self::Dropped { .. })
    }
}

/// Result of a dequeue attempt.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DequeueOutcome {
    /// The oldest pending item, now removed from the ring.
    Item(Payload),
    /// No slot was occupied.
    Empty,
}

impl DequeueOutcome {
    /// Converts into an `Option`, discarding the outcome tag.
    #[inline]
    pub fn into_item(self) -> Option<Payload> {
        match self {
            Self::Item(payload) => Some(payload),
            Self::Empty => None,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

/// Slots plus write cursor. Only ever touched inside the guard.
#[derive(Debug)]
pub(crate) struct RingState {
    slots: Box<[Slot]>,
    pub(crate) cursor: usize,
}

impl RingState {
    fn new(capacity: usize) -> Self {
        Self {
            slots: vec![Slot::EMPTY; capacity].into_boxed_slice(),
            cursor: 0,
        }
    }

    #[inline]
    fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// One inspection, at most one write. Constant time, no allocation.
    #[inline]
    fn enqueue(&mut self, payload: Payload) -> EnqueueOutcome {
        let slot = self.cursor;
        let target = &mut self.slots[slot];
        if target.is_occupied() {
            return EnqueueOutcome::Dropped { slot };
        }

        target.fill(payload);
        self.cursor = (slot + 1) % self.capacity();
        debug_assert_cursor_in_bounds!(self.cursor, self.capacity());
        self.check();

        EnqueueOutcome::Written { slot }
    }

    /// At most `capacity` inspections, at most one write.
    fn dequeue(&mut self) -> DequeueOutcome {
        let capacity = self.capacity();
        for offset in 0..capacity {
            let idx = (self.cursor + offset) % capacity;
            if let Some(payload) = self.slots[idx].take() {
                self.check();
                return DequeueOutcome::Item(payload);
            }
        }
        DequeueOutcome::Empty
    }

    fn occupied(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_occupied()).count()
    }

    /// True if exactly the `k` slots before the cursor are occupied.
    pub(crate) fn is_contiguous_run(&self) -> bool {
        let capacity = self.capacity();
        let occupied = self.occupied();
        (1..=capacity).all(|back| {
            let idx = (self.cursor + capacity - back) % capacity;
            self.slots[idx].is_occupied() == (back <= occupied)
        })
    }

    pub(crate) fn occupancy_map(&self) -> Vec<bool> {
        self.slots.iter().map(Slot::is_occupied).collect()
    }

    #[inline]
    fn check(&self) {
        if cfg!(debug_assertions) {
            debug_assert_bounded_occupancy!(self.occupied(), self.capacity());
            debug_assert_contiguous_run!(self);
        }
    }
}

/// Fixed-capacity FIFO of [`Payload`]s shared by one producer and one consumer.
///
/// All slot state sits behind a [`Guard`]. [`enqueue`](Self::enqueue) uses the
/// guard's producer entry (interrupts masked, spin-only) and never blocks or
/// allocates; every other method uses the consumer entry.
///
/// Share one ring between the two contexts through an `Arc`.
pub struct Ring<I: LocalInterrupts = NoInterrupts> {
    state: Guard<RingState, I>,
    metrics: Metrics,
    config: Config,
}

impl<I: LocalInterrupts> Ring<I> {
    /// Creates an empty ring with `config.capacity` slots and the cursor at 0.
    ///
    /// This is the only allocation the ring ever makes.
    pub fn new(config: Config) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            state: Guard::new(RingState::new(config.capacity)),
            metrics: Metrics::new(),
            config,
        })
    }

    /// Creates an empty ring with `capacity` slots and default settings otherwise.
    pub fn with_capacity(capacity: usize) -> Result<Self, ConfigError> {
        Self::new(Config::default().with_capacity(capacity))
    }

    // ---------------------------------------------------------------------
    // PRODUCER API
    // ---------------------------------------------------------------------

    /// Stores `payload` at the cursor if that slot is free.
    ///
    /// Safe to call from a context that must not sleep: bounded work, no
    /// allocation, and the guard is taken through its interrupt-masking,
    /// spin-only entry.
    #[inline]
    pub fn enqueue(&self, payload: Payload) -> EnqueueOutcome {
        let outcome = self.state.with_irqsave(|state| state.enqueue(payload));

        if self.config.enable_metrics {
            match outcome {
                EnqueueOutcome::Written { .. } => self.metrics.add_written(),
                EnqueueOutcome::Dropped { .. } => self.metrics.add_dropped(),
            }
        }

        outcome
    }

    // ---------------------------------------------------------------------
    // CONSUMER API
    // ---------------------------------------------------------------------

    /// Removes and returns the oldest pending item, if any.
    ///
    /// Never waits for an item to show up; an empty ring yields
    /// [`DequeueOutcome::Empty`] at once.
    pub fn dequeue(&self) -> DequeueOutcome {
        let outcome = self.state.with_lock(RingState::dequeue);

        if self.config.enable_metrics {
            match outcome {
                DequeueOutcome::Item(_) => self.metrics.add_consumed(),
                DequeueOutcome::Empty => self.metrics.add_empty(),
            }
        }

        outcome
    }

    /// Empties the ring in one critical section, returning the items oldest
    /// first.
    ///
    /// Meant for teardown. Drained items are discarded, not consumed, so the
    /// metrics are left untouched.
    pub fn drain(&self) -> Vec<Payload> {
        let mut items = Vec::with_capacity(self.capacity());
        self.state.with_lock(|state| {
            while let DequeueOutcome::Item(payload) = state.dequeue() {
                items.push(payload);
            }
        });
        items
    }

    // ---------------------------------------------------------------------
    // STATUS
    // ---------------------------------------------------------------------

    /// Number of slots.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.config.capacity
    }

    /// Number of occupied slots.
    pub fn occupied(&self) -> usize {
        self.state.with_lock(|state| state.occupied())
    }

    /// Returns true if no slot is occupied.
    pub fn is_empty(&self) -> bool {
        self.occupied() == 0
    }

    /// Returns true if every slot is occupied.
    pub fn is_full(&self) -> bool {
        self.occupied() == self.capacity()
    }

    /// Index the next enqueue will target.
    pub fn cursor(&self) -> usize {
        self.state.with_lock(|state| state.cursor)
    }

    /// The configuration this ring was built from.
    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get a snapshot of metrics if enabled.
    pub fn metrics(&self) -> MetricsSnapshot {
        if self.config.enable_metrics {
            self.metrics.snapshot()
        } else {
            MetricsSnapshot::default()
        }
    }
}

impl<I: LocalInterrupts> std::fmt::Debug for Ring<I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ring")
            .field("capacity", &self.capacity())
            .field("guard", &self.state)
            .finish_non_exhaustive()
    }
}
