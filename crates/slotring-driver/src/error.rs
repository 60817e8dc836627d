//! Error types for module setup and teardown.

use slotring::ConfigError;
use thiserror::Error;

/// Errors from acquiring a trigger line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LineError {
    /// Another owner holds the line.
    #[error("trigger line {line} is already in use")]
    Busy { line: u32 },

    /// No such line on this platform.
    #[error("trigger line {line} does not exist")]
    Unavailable { line: u32 },
}

/// Errors that can occur while starting or stopping a [`Module`](crate::Module).
#[derive(Debug, Error)]
pub enum ModuleError {
    /// The ring configuration was rejected.
    #[error("invalid ring configuration: {0}")]
    Config(#[from] ConfigError),

    /// The trigger queue needs room for at least one pending edge.
    #[error("trigger queue depth must be at least 1")]
    ZeroTriggerQueue,

    /// The trigger queue depth is above [`MAX_TRIGGER_QUEUE`](crate::MAX_TRIGGER_QUEUE).
    #[error("trigger queue depth {depth} exceeds the maximum of {max}")]
    TriggerQueueTooDeep { depth: usize, max: usize },

    /// The trigger line could not be acquired.
    #[error("can't set up trigger line: {0}")]
    Trigger(#[from] LineError),

    /// The configuration file could not be read.
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration file is not valid JSON for [`ModuleConfig`](crate::ModuleConfig).
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    /// A producer or consumer task panicked or was cancelled.
    #[error("module task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl ModuleError {
    /// Returns `true` if the error happened before anything was started.
    #[inline]
    pub fn is_setup(&self) -> bool {
        !matches!(self, Self::Task(_))
    }
}
