//! slotring-driver - Run a slotring producer/consumer pair on tokio
//!
//! Binds the [`slotring`] core to concrete event sources:
//!
//! - [`TokioTimer`] fires the producer on a fixed period, deadline-based so
//!   expiries do not drift
//! - [`TriggerLine`] is the external input whose edges fire the consumer;
//!   [`SimulatedLine`] stands in for real hardware
//! - [`Module`] owns the lifecycle: ordered start-up with unwinding on
//!   failure, and a teardown that reports what was never consumed
//!
//! # Example
//!
//! ```
//! use slotring::MemorySink;
//! use slotring_driver::{LineRegistry, Module, ModuleConfig};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! # #[tokio::main(flavor = "current_thread", start_paused = true)]
//! # async fn main() -> Result<(), slotring_driver::ModuleError> {
//! let config = ModuleConfig::default().with_period(Duration::from_millis(100));
//! let board = LineRegistry::with_lines([config.trigger_line]);
//! let sink = Arc::new(MemorySink::new());
//!
//! let module = Module::start(&config, board.line(config.trigger_line), Arc::clone(&sink))?;
//! tokio::time::sleep(Duration::from_millis(250)).await;
//!
//! let summary = module.stop().await?;
//! assert_eq!(summary.last_sequence, 2);
//! assert_eq!(summary.leftover.len(), 2);
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
mod module;
mod timer;
mod trigger;

pub use config::{ModuleConfig, DEFAULT_TRIGGER_LINE, MAX_TRIGGER_QUEUE};
pub use error::{LineError, ModuleError};
pub use module::{Module, ShutdownSummary};
pub use timer::TokioTimer;
pub use trigger::{LineRegistry, SimulatedLine, TriggerHandle, TriggerLine};
