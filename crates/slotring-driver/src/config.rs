//! Module configuration, loadable from JSON.

use crate::ModuleError;
use serde::{Deserialize, Serialize};
use slotring::{Config, DEFAULT_CAPACITY, DEFAULT_PERIOD};
use std::path::Path;
use std::time::Duration;

/// Trigger line of the reference board's user button (bank 2, bit 8).
pub const DEFAULT_TRIGGER_LINE: u32 = 32 * 2 + 8;

/// Deepest trigger queue [`ModuleConfig::validate`] accepts.
pub const MAX_TRIGGER_QUEUE: usize = 1024;

/// Configuration for a [`Module`](crate::Module).
///
/// Every field has a default, so `{}` is a valid config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModuleConfig {
    /// Ring slot count.
    ///
    /// Default: 5
    pub capacity: usize,

    /// Producer period in whole milliseconds.
    ///
    /// Default: 1000
    pub period_ms: u64,

    /// Delay before the first producer invocation, in milliseconds.
    ///
    /// Default: one period
    pub first_fire_ms: Option<u64>,

    /// Line number the trigger is wired to.
    ///
    /// Default: 72
    pub trigger_line: u32,

    /// Edges that may be pending before further ones are coalesced.
    ///
    /// Default: 4
    pub trigger_queue: usize,

    /// Keep outcome counters on the ring.
    ///
    /// Default: true
    pub enable_metrics: bool,
}

impl Default for ModuleConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            period_ms: DEFAULT_PERIOD.as_millis() as u64,
            first_fire_ms: None,
            trigger_line: DEFAULT_TRIGGER_LINE,
            trigger_queue: 4,
            enable_metrics: true,
        }
    }
}

impl ModuleConfig {
    /// Parses a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, ModuleError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ModuleError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Checks everything [`Module::start`](crate::Module::start) relies on.
    pub fn validate(&self) -> Result<(), ModuleError> {
        self.ring_config().validate()?;
        if self.trigger_queue == 0 {
            return Err(ModuleError::ZeroTriggerQueue);
        }
        if self.trigger_queue > MAX_TRIGGER_QUEUE {
            return Err(ModuleError::TriggerQueueTooDeep {
                depth: self.trigger_queue,
                max: MAX_TRIGGER_QUEUE,
            });
        }
        Ok(())
    }

    /// The core ring configuration.
    pub fn ring_config(&self) -> Config {
        Config::new(self.capacity, self.period(), self.enable_metrics)
    }

    pub fn period(&self) -> Duration {
        Duration::from_millis(self.period_ms)
    }

    pub fn first_fire(&self) -> Duration {
        self.first_fire_ms
            .map_or_else(|| self.period(), Duration::from_millis)
    }

    /// Sets the slot count.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets the producer period.
    ///
    /// The period is kept in whole milliseconds: any sub-millisecond part of
    /// `period` is truncated, so anything under 1ms becomes zero and fails
    /// [`validate`](Self::validate).
    pub fn with_period(mut self, period: Duration) -> Self {
        self.period_ms = period.as_millis() as u64;
        self
    }

    /// Sets the trigger line number.
    pub fn with_trigger_line(mut self, line: u32) -> Self {
        self.trigger_line = line;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotring::ConfigError;

    #[test]
    fn empty_document_is_reference_module() {
        let config = ModuleConfig::from_json_str("{}").unwrap();
        assert_eq!(config, ModuleConfig::default());
        assert_eq!(config.ring_config(), Config::default());
        assert_eq!(config.first_fire(), Duration::from_secs(1));
        assert_eq!(config.trigger_line, 72);
    }

    #[test]
    fn fields_override_defaults() {
        let config = ModuleConfig::from_json_str(
            r#"{ "capacity": 3, "period_ms": 250, "first_fire_ms": 10, "trigger_line": 5 }"#,
        )
        .unwrap();
        assert_eq!(config.capacity, 3);
        assert_eq!(config.period(), Duration::from_millis(250));
        assert_eq!(config.first_fire(), Duration::from_millis(10));
        assert_eq!(config.trigger_line, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn unknown_fields_rejected() {
        let err = ModuleConfig::from_json_str(r#"{ "capacty": 3 }"#).unwrap_err();
        assert!(matches!(err, ModuleError::Parse(_)));
    }

    #[test]
    fn validation_errors() {
        let zero_cap = ModuleConfig::default().with_capacity(0);
        assert!(matches!(
            zero_cap.validate(),
            Err(ModuleError::Config(ConfigError::ZeroCapacity))
        ));

        let zero_period = ModuleConfig::default().with_period(Duration::ZERO);
        assert!(matches!(
            zero_period.validate(),
            Err(ModuleError::Config(ConfigError::ZeroPeriod))
        ));

        let zero_queue = ModuleConfig {
            trigger_queue: 0,
            ..ModuleConfig::default()
        };
        assert!(matches!(
            zero_queue.validate(),
            Err(ModuleError::ZeroTriggerQueue)
        ));
    }

    #[test]
    fn bounds_are_enforced_before_start() {
        let deep = ModuleConfig::from_json_str(r#"{ "trigger_queue": 18446744073709551615 }"#)
            .unwrap();
        assert!(matches!(
            deep.validate(),
            Err(ModuleError::TriggerQueueTooDeep {
                max: MAX_TRIGGER_QUEUE,
                ..
            })
        ));

        let at_limit = ModuleConfig {
            trigger_queue: MAX_TRIGGER_QUEUE,
            ..ModuleConfig::default()
        };
        assert!(at_limit.validate().is_ok());

        let huge = ModuleConfig::default().with_capacity(usize::MAX);
        assert!(matches!(
            huge.validate(),
            Err(ModuleError::Config(ConfigError::CapacityTooLarge { .. }))
        ));
    }

    #[test]
    fn period_is_whole_milliseconds() {
        let config = ModuleConfig::default().with_period(Duration::from_micros(1500));
        assert_eq!(config.period(), Duration::from_millis(1));

        let sub_milli = ModuleConfig::default().with_period(Duration::from_micros(500));
        assert_eq!(sub_milli.period_ms, 0);
        assert!(matches!(
            sub_milli.validate(),
            Err(ModuleError::Config(ConfigError::ZeroPeriod))
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = ModuleConfig::from_path("/nonexistent/slotring.json").unwrap_err();
        assert!(matches!(err, ModuleError::Io(_)));
    }
}
