use anyhow::{Context, Result};
use std::process::ExitCode;
use tracing::error;
use user_service::core::config::Config;
use user_service::core::{startup, tracing_init};

fn main() -> ExitCode {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    // Initialize tracing/logging; the guard flushes the file sink on exit
    let _log_guard = tracing_init::init_tracing(&config.logging);

    match run(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %format!("{:#}", e), "Startup failed");
            ExitCode::FAILURE
        }
    }
}

fn run(config: Config) -> Result<()> {
    // Single-threaded event loop: handlers interleave at I/O boundaries
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to build Tokio runtime")?;

    runtime.block_on(startup::run(config))
}
