//! Slot and payload types.

use std::fmt;
use std::time::Duration;

/// A point on a monotonic clock, in nanoseconds since the clock's origin.
///
/// Zero is an ordinary value: emptiness is tracked by the slot, not encoded
/// in the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Timestamp(u64);

impl Timestamp {
    /// The clock origin.
    pub const ZERO: Self = Self(0);

    /// Creates a timestamp from nanoseconds since the origin.
    #[inline]
    pub const fn from_nanos(nanos: u64) -> Self {
        Self(nanos)
    }

    /// Creates a timestamp from the time elapsed since the origin.
    ///
    /// Saturates at `u64::MAX` nanoseconds (about 584 years).
    #[inline]
    pub fn from_elapsed(elapsed: Duration) -> Self {
        Self(u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX))
    }

    /// Nanoseconds since the origin.
    #[inline]
    pub const fn as_nanos(self) -> u64 {
        self.0
    }

    /// Time elapsed since the origin.
    #[inline]
    pub const fn as_duration(self) -> Duration {
        Duration::from_nanos(self.0)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One produced item: its sequence number and when it was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Payload {
    /// Producer-assigned, strictly increasing from 1.
    pub sequence: u64,
    /// Captured when the producer fired.
    pub timestamp: Timestamp,
}

impl Payload {
    pub const fn new(sequence: u64, timestamp: Timestamp) -> Self {
        Self {
            sequence,
            timestamp,
        }
    }
}

/// A single storage cell of the ring.
///
/// `Some` means occupied by one unconsumed item; `None` means free. Fusing the
/// flag with the payload makes a stale payload in a free slot unrepresentable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Slot {
    payload: Option<Payload>,
}

impl Slot {
    pub(crate) const EMPTY: Self = Self { payload: None };

    #[inline]
    pub(crate) fn is_occupied(&self) -> bool {
        self.payload.is_some()
    }

    /// Stores `payload` into a free slot.
    #[inline]
    pub(crate) fn fill(&mut self, payload: Payload) {
        debug_assert!(!self.is_occupied(), "overwriting an unconsumed slot");
        self.payload = Some(payload);
    }

    /// Removes and returns the payload, leaving the slot free.
    #[inline]
    pub(crate) fn take(&mut self) -> Option<Payload> {
        self.payload.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_payload_is_a_real_item() {
        let mut slot = Slot::EMPTY;
        assert!(!slot.is_occupied());

        slot.fill(Payload::new(0, Timestamp::ZERO));
        assert!(slot.is_occupied());
        assert_eq!(slot.take(), Some(Payload::new(0, Timestamp::ZERO)));
        assert!(!slot.is_occupied());
        assert_eq!(slot.take(), None);
    }

    #[test]
    fn timestamp_conversions() {
        let ts = Timestamp::from_elapsed(Duration::from_millis(1500));
        assert_eq!(ts.as_nanos(), 1_500_000_000);
        assert_eq!(ts.as_duration(), Duration::from_millis(1500));
        assert_eq!(ts.to_string(), "1500000000");
        assert_eq!(Timestamp::from_elapsed(Duration::MAX).as_nanos(), u64::MAX);
    }
}
