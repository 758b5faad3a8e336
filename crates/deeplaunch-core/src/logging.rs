//! Logging configuration using tracing

use std::path::PathBuf;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::error::{Error, Result};

/// Environment variable controlling the log filter.
pub const LOG_ENV_VAR: &str = "DEEPLAUNCH_LOG";

const DEFAULT_FILTER: &str = "deeplaunch=info,warn";

/// Initialize the logging subsystem
///
/// Logs are written to `~/.local/share/deeplaunch/logs/`.
/// Log level is controlled by the `DEEPLAUNCH_LOG` environment variable.
/// When `echo_to_stderr` is set (long-running `serve` mode) the same events
/// are also printed to stderr.
///
/// # Examples
/// ```bash
/// DEEPLAUNCH_LOG=debug deeplaunch serve
/// DEEPLAUNCH_LOG=deeplaunch_launcher=trace deeplaunch launch ...
/// ```
pub fn init(echo_to_stderr: bool) -> Result<()> {
    let log_dir = get_log_directory();
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, "deeplaunch.log");

    let env_filter =
        EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let stderr_layer = echo_to_stderr.then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .compact()
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(false)
                .with_file(true)
                .with_line_number(true)
                .with_timer(fmt::time::ChronoLocal::new(
                    "%Y-%m-%d %H:%M:%S%.3f".to_string(),
                )),
        )
        .with(stderr_layer)
        .try_init()
        .map_err(|e| Error::LoggingInit(e.to_string()))?;

    tracing::info!("═══════════════════════════════════════════════════════");
    tracing::info!("deeplaunch starting");
    tracing::info!("Log directory: {}", log_dir.display());
    tracing::info!("═══════════════════════════════════════════════════════");

    Ok(())
}

/// Get the log directory path
fn get_log_directory() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    base.join("deeplaunch").join("logs")
}
