//! Module lifecycle: wire a ring, a timer and a trigger line together.
//!
//! Start-up runs in a fixed order (ring, timer, trigger line, tasks) and a
//! failure releases whatever was already acquired, in reverse. Teardown raises
//! the stop signal, releases the line, cancels the pending expiry and waits
//! for both tasks before handing back whatever is still in the ring.

use crate::timer::TokioTimer;
use crate::trigger::{TriggerHandle, TriggerLine};
use crate::{ModuleConfig, ModuleError};
use slotring::{
    Consumer, DiagnosticSink, MetricsSnapshot, Payload, Producer, Ring, StopSignal,
};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

/// What a stopped module leaves behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShutdownSummary {
    /// Last sequence number the producer assigned (0 if it never fired).
    pub last_sequence: u64,
    /// Trigger edges the consumer handled.
    pub triggers_handled: u64,
    /// Items still in the ring at teardown, oldest first.
    pub leftover: Vec<Payload>,
    pub metrics: MetricsSnapshot,
}

/// A running producer/consumer pair sharing one ring.
pub struct Module<L: TriggerLine> {
    ring: Arc<Ring>,
    timer: Arc<TokioTimer>,
    stop: StopSignal,
    line: L,
    trigger: TriggerHandle,
    producer_task: JoinHandle<u64>,
    consumer_task: JoinHandle<u64>,
    producer_shutdown: oneshot::Sender<()>,
    consumer_shutdown: oneshot::Sender<()>,
}

impl<L: TriggerLine> Module<L> {
    /// Starts the module on the current tokio runtime.
    ///
    /// The first producer invocation happens `config.first_fire()` from now.
    /// If `line` cannot be claimed the timer is cancelled and nothing is
    /// spawned.
    pub fn start<S>(config: &ModuleConfig, mut line: L, sink: S) -> Result<Self, ModuleError>
    where
        S: DiagnosticSink + Clone + 'static,
    {
        config.validate()?;

        tracing::info!(capacity = config.capacity, "initializing ring");
        let ring: Arc<Ring> = Arc::new(Ring::new(config.ring_config())?);

        let timer = Arc::new(TokioTimer::new());
        timer.arm(config.first_fire());
        tracing::info!(period_ms = config.period_ms, "timer armed");

        if let Err(e) = line.request() {
            tracing::error!(line = line.line(), error = %e, "can't set up trigger line");
            timer.cancel();
            return Err(e.into());
        }
        tracing::info!(line = line.line(), "trigger line claimed");

        let stop = StopSignal::new();
        let (trigger, edges) = TriggerHandle::channel(line.line(), config.trigger_queue);

        let producer = Producer::new(
            Arc::clone(&ring),
            Arc::clone(&timer),
            sink.clone(),
            stop.clone(),
        );
        let (producer_shutdown, producer_rx) = oneshot::channel();
        let producer_task = tokio::spawn(run_producer(producer, producer_rx));

        let consumer = Consumer::new(Arc::clone(&ring), sink);
        let (consumer_shutdown, consumer_rx) = oneshot::channel();
        let consumer_task = tokio::spawn(run_consumer(consumer, edges, consumer_rx));

        tracing::info!("module started");
        Ok(Self {
            ring,
            timer,
            stop,
            line,
            trigger,
            producer_task,
            consumer_task,
            producer_shutdown,
            consumer_shutdown,
        })
    }

    /// Stops both tasks and returns what was left in the ring.
    ///
    /// A period or trigger already being handled completes first.
    pub async fn stop(self) -> Result<ShutdownSummary, ModuleError> {
        let Self {
            ring,
            timer,
            stop,
            mut line,
            trigger,
            producer_task,
            consumer_task,
            producer_shutdown,
            consumer_shutdown,
        } = self;

        stop.stop();

        // Receivers may already be gone if a task ended on its own.
        let _ = consumer_shutdown.send(());
        drop(trigger);
        let triggers_handled = consumer_task.await?;
        line.release();
        tracing::info!(line = line.line(), triggers_handled, "trigger line released");

        timer.cancel();
        let _ = producer_shutdown.send(());
        let last_sequence = producer_task.await?;
        tracing::info!(last_sequence, "timer stopped");

        let metrics = ring.metrics();
        let leftover = ring.drain();
        for payload in &leftover {
            tracing::debug!(
                sequence = payload.sequence,
                timestamp = %payload.timestamp,
                "discarding unconsumed item"
            );
        }
        tracing::info!(discarded = leftover.len(), "ring freed");

        Ok(ShutdownSummary {
            last_sequence,
            triggers_handled,
            leftover,
            metrics,
        })
    }

    /// A handle for signalling trigger edges.
    pub fn trigger(&self) -> TriggerHandle {
        self.trigger.clone()
    }

    pub fn ring(&self) -> &Arc<Ring> {
        &self.ring
    }

    /// The stop signal shared with the producer.
    ///
    /// Raising it lets the current period finish and arms no further ones;
    /// [`stop`](Self::stop) is still needed to release the line.
    pub fn stop_signal(&self) -> &StopSignal {
        &self.stop
    }

    pub fn line(&self) -> u32 {
        self.line.line()
    }
}

impl<L: TriggerLine> std::fmt::Debug for Module<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Module")
            .field("line", &self.line.line())
            .field("ring", &self.ring)
            .field("stopped", &self.stop.is_stopped())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Task bodies
// ============================================================================

/// Sleeps until each armed deadline and runs one producer invocation.
///
/// Exits when the producer stops rescheduling or on shutdown. Returns the last
/// sequence number assigned.
async fn run_producer<S: DiagnosticSink>(
    mut producer: Producer<Arc<TokioTimer>, S>,
    mut shutdown: oneshot::Receiver<()>,
) -> u64 {
    let timer = Arc::clone(producer.timer());
    while let Some(deadline) = timer.take_deadline() {
        tokio::select! {
            biased;
            _ = &mut shutdown => break,
            () = tokio::time::sleep_until(deadline) => {
                let report = producer.on_period_fired();
                tracing::trace!(
                    sequence = report.sequence,
                    rescheduled = report.rescheduled,
                    "period complete"
                );
            }
        }
    }
    producer.last_sequence()
}

/// Runs the consumer once per queued edge. Returns the number handled.
async fn run_consumer<S: DiagnosticSink>(
    consumer: Consumer<S>,
    mut edges: mpsc::Receiver<()>,
    mut shutdown: oneshot::Receiver<()>,
) -> u64 {
    let mut handled = 0u64;
    loop {
        tokio::select! {
            biased;
            _ = &mut shutdown => break,
            edge = edges.recv() => {
                if edge.is_none() {
                    break;
                }
                let _ = consumer.on_trigger_fired();
                handled += 1;
            }
        }
    }
    handled
}
