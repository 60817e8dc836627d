use crate::ConfigError;
use std::time::Duration;

/// Slot count of the reference module.
pub const DEFAULT_CAPACITY: usize = 5;

/// Largest slot count [`Config::validate`] accepts.
pub const MAX_CAPACITY: usize = 1 << 16;

/// Producer period of the reference module (one second).
pub const DEFAULT_PERIOD: Duration = Duration::from_secs(1);

/// Configuration for a [`Ring`](crate::Ring) and the producer that feeds it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Number of slots. Fixed for the lifetime of the ring.
    pub capacity: usize,
    /// Interval between producer invocations.
    pub period: Duration,
    /// Enable outcome counters on the ring (one relaxed atomic add per call)
    pub enable_metrics: bool,
}

impl Config {
    /// Creates a new configuration with custom settings.
    pub const fn new(capacity: usize, period: Duration, enable_metrics: bool) -> Self {
        Self {
            capacity,
            period,
            enable_metrics,
        }
    }

    /// Sets the slot count.
    pub const fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets the producer period.
    pub const fn with_period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    /// Enables or disables the ring's outcome counters.
    pub const fn with_metrics(mut self, enable_metrics: bool) -> Self {
        self.enable_metrics = enable_metrics;
        self
    }

    /// Checks that the configuration can back a ring.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if self.capacity > MAX_CAPACITY {
            return Err(ConfigError::CapacityTooLarge {
                capacity: self.capacity,
                max: MAX_CAPACITY,
            });
        }
        if self.period.is_zero() {
            return Err(ConfigError::ZeroPeriod);
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            period: DEFAULT_PERIOD,
            enable_metrics: true,
        }
    }
}

/// Tiny ring polled quickly; handy for demos and overflow experiments.
pub const FAST_CONFIG: Config = Config::new(3, Duration::from_millis(100), true);

/// Larger ring for bursty triggers, no counters.
pub const RELAXED_CONFIG: Config = Config::new(64, Duration::from_millis(10), false);
