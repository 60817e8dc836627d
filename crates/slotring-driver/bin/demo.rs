//! Runs the reference module with a simulated button.
//!
//! Usage: `demo [CONFIG.json] [SECONDS]`
//!
//! The button is pressed at random intervals; Ctrl-C stops early.
//! Set `RUST_LOG=slotring=debug` for more detail.

use anyhow::Context;
use rand::Rng;
use slotring::TracingSink;
use slotring_driver::{LineRegistry, Module, ModuleConfig};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const DEFAULT_RUN_SECS: u64 = 10;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => ModuleConfig::from_path(&path)
            .with_context(|| format!("loading config from {path}"))?,
        None => ModuleConfig::default(),
    };
    let run_for = match args.next() {
        Some(secs) => Duration::from_secs(secs.parse().context("SECONDS must be an integer")?),
        None => Duration::from_secs(DEFAULT_RUN_SECS),
    };

    let board = LineRegistry::with_lines([config.trigger_line]);
    let module = Module::start(&config, board.line(config.trigger_line), TracingSink)?;

    let button = module.trigger();
    let max_gap = config.period_ms.saturating_mul(3).max(2);
    let presses = tokio::spawn(async move {
        loop {
            let gap = rand::thread_rng().gen_range(1..max_gap);
            tokio::time::sleep(Duration::from_millis(gap)).await;
            if button.is_closed() {
                break;
            }
            if !button.fire() {
                tracing::debug!("button press coalesced");
            }
        }
    });

    tokio::select! {
        () = tokio::time::sleep(run_for) => {}
        res = tokio::signal::ctrl_c() => res.context("waiting for Ctrl-C")?,
    }

    let summary = module.stop().await?;
    presses.abort();

    tracing::info!(
        last_sequence = summary.last_sequence,
        triggers = summary.triggers_handled,
        written = summary.metrics.written,
        dropped = summary.metrics.dropped,
        consumed = summary.metrics.consumed,
        empty = summary.metrics.empty,
        leftover = summary.leftover.len(),
        "module stopped"
    );
    Ok(())
}
