//! Error types for ring construction.
//!
//! The ring paths themselves never fail: overflow and emptiness are outcome
//! variants ([`EnqueueOutcome`](crate::EnqueueOutcome),
//! [`DequeueOutcome`](crate::DequeueOutcome)), not errors. Only building a
//! ring from a bad [`Config`](crate::Config) is fallible.

use thiserror::Error;

/// Errors raised while validating a [`Config`](crate::Config).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A ring needs at least one slot.
    #[error("ring capacity must be at least 1")]
    ZeroCapacity,

    /// The dequeue scan visits every slot under the guard, so the slot count is capped.
    #[error("ring capacity {capacity} exceeds the maximum of {max}")]
    CapacityTooLarge { capacity: usize, max: usize },

    /// The producer period must be non-zero.
    #[error("producer period must be non-zero")]
    ZeroPeriod,
}
