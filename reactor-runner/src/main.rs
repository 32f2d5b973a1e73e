//! Runner binary for the reactor demonstrations.
//!
//! Loads configuration, initializes tracing, starts the tokio runtime and runs the selected
//! demonstration until it finishes or the process receives Ctrl-C.

use std::process::ExitCode;

use clap::Parser;
use reactor_config::shared::RunnerConfig;
use reactor_telemetry::tracing::init_tracing;
use tracing::{error, info};

use crate::config::load_runner_config;
use crate::core::{Demo, run_demo};
use crate::error::{RunnerError, RunnerResult};

mod config;
mod core;
mod error;

/// Command line arguments of the runner.
#[derive(Debug, Parser)]
#[command(version, about = "Runs the backpressure and retry demonstrations")]
struct Args {
    #[command(subcommand)]
    demo: Option<Demo>,
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprint!("{}", err.render_report());
            ExitCode::FAILURE
        }
    }
}

/// Loads configuration, initializes tracing and runs the demonstration on a multi-threaded
/// runtime.
fn run() -> RunnerResult<()> {
    let args = Args::parse();
    let config = load_runner_config()?;

    let _log_flusher = init_tracing(env!("CARGO_BIN_NAME")).map_err(RunnerError::config)?;

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(async_main(args.demo.unwrap_or_default(), config))
}

async fn async_main(demo: Demo, config: RunnerConfig) -> RunnerResult<()> {
    tokio::select! {
        result = run_demo(demo, &config) => {
            if let Err(err) = &result {
                error!("{err}");
            }
            result
        }
        _ = tokio::signal::ctrl_c() => {
            info!("received ctrl-c, stopping");
            Ok(())
        }
    }
}
