use std::io;

use anyhow::{anyhow, Context};
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Run a bounded black-box optimization whose objective is answered over stdin.
///
/// Each candidate point is printed as `REQUEST_EVALUATION [..]` and must be
/// answered with one line holding a number. The result is printed once as
/// `FINAL_RESULT {..}`.
#[derive(Parser)]
#[command(name = "bads-bridge", version)]
struct Args {
    /// JSON object with x0, lower_bounds, upper_bounds, plausible_lower_bounds,
    /// plausible_upper_bounds and optional options
    config: String,

    /// Log filter for stderr output (e.g. warn, info, bb_optimizer=debug)
    #[arg(long, env = "BADS_BRIDGE_LOG", default_value = "warn")]
    log_level: String,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_level)?;

    let stdin = io::stdin();
    let stdout = io::stdout();
    bb_bridge::run(&args.config, stdin.lock(), stdout.lock()).context("bads-bridge run failed")?;
    Ok(())
}

// Logs go to stderr; stdout carries only the protocol lines.
fn init_tracing(level: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::try_new(level)
        .with_context(|| format!("invalid log level {level:?}"))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow!("failed to install tracing subscriber: {e}"))
}
