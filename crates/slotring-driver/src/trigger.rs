//! External trigger lines and the edge queue that feeds the consumer.

use crate::LineError;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::mpsc;

/// An input line whose falling edges invoke the consumer.
///
/// `request` is called once during start-up; `release` during teardown or
/// when a later start-up step fails.
pub trait TriggerLine: Send {
    /// Line number, for diagnostics.
    fn line(&self) -> u32;

    /// Claims the line for exclusive use.
    fn request(&mut self) -> Result<(), LineError>;

    /// Gives the line back. Releasing an unclaimed line is a no-op.
    fn release(&mut self);
}

#[derive(Debug, Default)]
struct RegistryState {
    lines: HashSet<u32>,
    held: HashSet<u32>,
}

/// The set of lines that exist on a simulated board and which are claimed.
#[derive(Debug, Clone, Default)]
pub struct LineRegistry {
    state: Arc<Mutex<RegistryState>>,
}

impl LineRegistry {
    /// A board exposing exactly `lines`.
    pub fn with_lines(lines: impl IntoIterator<Item = u32>) -> Self {
        Self {
            state: Arc::new(Mutex::new(RegistryState {
                lines: lines.into_iter().collect(),
                held: HashSet::new(),
            })),
        }
    }

    /// Returns a handle for `line`. Nothing is claimed until [`TriggerLine::request`].
    pub fn line(&self, line: u32) -> SimulatedLine {
        SimulatedLine {
            line,
            registry: self.clone(),
            held: false,
        }
    }

    pub fn is_held(&self, line: u32) -> bool {
        self.lock().held.contains(&line)
    }

    fn lock(&self) -> MutexGuard<'_, RegistryState> {
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

/// A line on a [`LineRegistry`]. Released on drop.
#[derive(Debug)]
pub struct SimulatedLine {
    line: u32,
    registry: LineRegistry,
    held: bool,
}

impl TriggerLine for SimulatedLine {
    fn line(&self) -> u32 {
        self.line
    }

    fn request(&mut self) -> Result<(), LineError> {
        if self.held {
            return Ok(());
        }
        let mut state = self.registry.lock();
        if !state.lines.contains(&self.line) {
            return Err(LineError::Unavailable { line: self.line });
        }
        if !state.held.insert(self.line) {
            return Err(LineError::Busy { line: self.line });
        }
        self.held = true;
        Ok(())
    }

    fn release(&mut self) {
        if self.held {
            self.registry.lock().held.remove(&self.line);
            self.held = false;
        }
    }
}

impl Drop for SimulatedLine {
    fn drop(&mut self) {
        self.release();
    }
}

/// Delivers falling edges to a running module's consumer.
///
/// Edges are queued up to the configured depth; beyond that they coalesce,
/// the way a pending interrupt is not counted twice.
#[derive(Debug, Clone)]
pub struct TriggerHandle {
    line: u32,
    edges: mpsc::Sender<()>,
}

impl TriggerHandle {
    /// `depth` must already be validated: tokio panics on 0 or an oversized bound.
    pub(crate) fn channel(line: u32, depth: usize) -> (Self, mpsc::Receiver<()>) {
        let (edges, rx) = mpsc::channel(depth);
        (Self { line, edges }, rx)
    }

    /// Signals one falling edge.
    ///
    /// Returns `false` if the edge was coalesced into an already-pending one
    /// or the module has stopped.
    pub fn fire(&self) -> bool {
        match self.edges.try_send(()) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(())) => {
                tracing::debug!(line = self.line, "edge coalesced");
                false
            }
            Err(mpsc::error::TrySendError::Closed(())) => false,
        }
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    /// Returns `true` once the consumer has gone away.
    pub fn is_closed(&self) -> bool {
        self.edges.is_closed()
    }
}
