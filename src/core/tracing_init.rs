use crate::core::config::LoggingConfig;
use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use tracing::Subscriber;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::fmt::format::{Format, Json, JsonFields};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

pub const LOG_FILE_NAME: &str = "app.log";

pub type JsonFileLayer<S> = fmt::Layer<S, JsonFields, Format<Json>, NonBlocking>;

/// Create the log directory and prove the log file is appendable
///
/// Returns the path of the log file.
pub fn prepare_log_sink(dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .context(format!("Failed to create log directory: {}", dir.display()))?;

    let path = dir.join(LOG_FILE_NAME);
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .context(format!("Log file is not writable: {}", path.display()))?;

    Ok(path)
}

/// JSON layer appending one record per line to `<dir>/app.log`
///
/// Records are written from a background worker; dropping the guard flushes
/// them.
pub fn json_file_layer<S>(dir: &Path) -> (JsonFileLayer<S>, WorkerGuard)
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    let appender = tracing_appender::rolling::never(dir, LOG_FILE_NAME);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let layer = fmt::layer()
        .json()
        .with_current_span(false)
        .with_ansi(false)
        .with_writer(writer);

    (layer, guard)
}

/// Install the global subscriber: console plus append-only JSON file
///
/// Each record is one JSON object per line with timestamp, level, message and
/// the event's structured fields. If the log directory is unusable the
/// service keeps running with console output only. The returned guard must
/// be held until exit so buffered file records are flushed.
pub fn init_tracing(config: &LoggingConfig) -> Option<WorkerGuard> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.level));

    let console = if config.format == "console" {
        // Pretty console output for development/debug
        fmt::layer()
            .with_target(true)
            .with_level(true)
            .with_ansi(true)
            .with_line_number(true)
            .boxed()
    } else {
        fmt::layer().json().with_current_span(false).boxed()
    };

    match prepare_log_sink(&config.dir) {
        Ok(_) => {
            let (file, guard) = json_file_layer(&config.dir);

            tracing_subscriber::registry()
                .with(env_filter)
                .with(console)
                .with(file)
                .init();

            Some(guard)
        }
        Err(e) => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(console)
                .init();

            tracing::warn!(
                log_dir = %config.dir.display(),
                error = %format!("{:#}", e),
                "File logging disabled, continuing with console output only"
            );

            None
        }
    }
}

/// Console-only subscriber for short-lived tools such as the migrator
pub fn init_console_tracing(config: &LoggingConfig) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.level));

    if config.format == "console" {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_target(false).with_ansi(true))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().with_current_span(false))
            .init();
    }
}
