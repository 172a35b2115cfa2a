//! Standalone database migrator
//!
//! Waits for the database to accept connections, creates the users table if
//! absent, verifies it and exits. Exit status 0 on success, 1 on any failure.

use std::process::ExitCode;
use tracing::{error, info};
use user_service::core::config::Config;
use user_service::core::tracing_init;
use user_service::migration::mysql_target::MySqlTarget;
use user_service::migration::{self, RetryPolicy};

fn main() -> ExitCode {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    tracing_init::init_console_tracing(&config.logging);

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!(error = %e, "Failed to build Tokio runtime");
            return ExitCode::FAILURE;
        }
    };

    info!(
        host = %config.database.host,
        port = config.database.port,
        database = %config.database.name,
        "Database migration service starting"
    );

    let policy = RetryPolicy::from(&config.migration);
    let target = MySqlTarget::new(&config.database);

    match runtime.block_on(migration::run(&target, &policy)) {
        Ok(report) => {
            info!(
                attempts = report.attempts,
                rows = report.rows,
                "All migrations applied"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Migration aborted");
            ExitCode::FAILURE
        }
    }
}
