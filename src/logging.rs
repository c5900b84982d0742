//! Logging setup for the `idmd` binary.
//!
//! Console output goes to stderr so that commands printing tables or CSV to
//! stdout stay pipeable. A second layer writes daily-rotated files into the
//! platform data directory.
//!
//! ```no_run
//! idmd::logging::init(false).expect("Failed to initialize logging");
//! tracing::info!("App started");
//! ```
//!
//! The library itself only emits `tracing` events; installing a subscriber
//! is left to the embedding application.

use anyhow::{Context as _, Result};
use std::path::PathBuf;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    EnvFilter, Layer as _, fmt, layer::SubscriberExt as _, util::SubscriberInitExt as _,
};

/// Gets the log directory path based on platform conventions
///
/// Returns:
/// - Windows: `%APPDATA%/idmd/logs`
/// - macOS: `~/Library/Application Support/idmd/logs`
/// - Linux: `~/.local/share/idmd/logs`
pub fn get_log_dir() -> Result<PathBuf> {
    let base_dir = dirs::data_dir().context("Failed to determine data directory")?;
    Ok(base_dir.join("idmd").join("logs"))
}

fn ensure_log_dir() -> Result<PathBuf> {
    let log_dir = get_log_dir()?;
    if !log_dir.exists() {
        std::fs::create_dir_all(&log_dir)
            .with_context(|| format!("Failed to create log directory: {}", log_dir.display()))?;
    }
    Ok(log_dir)
}

/// Builds the filter: `RUST_LOG` wins, otherwise `info` (or `debug` when verbose).
fn env_filter(verbose: bool) -> Result<EnvFilter> {
    let default_level = if verbose { "debug" } else { "info" };
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .context("Failed to create env filter")
}

/// Initializes console and file logging.
///
/// If the log directory cannot be created the file layer is skipped and a
/// warning is emitted once the console layer is live.
///
/// # Errors
///
/// Returns error if the filter cannot be built or a global subscriber is
/// already installed.
pub fn init(verbose: bool) -> Result<()> {
    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_line_number(verbose)
        .with_file(verbose)
        .with_writer(std::io::stderr)
        .with_filter(env_filter(verbose)?);

    let appender = ensure_log_dir().and_then(|dir| {
        RollingFileAppender::builder()
            .rotation(Rotation::DAILY)
            .max_log_files(10)
            .filename_prefix("idmd")
            .filename_suffix("log")
            .build(&dir)
            .context("Failed to create file appender")
            .map(|appender| (dir, appender))
    });

    let (log_dir, file_layer) = match appender {
        Ok((dir, appender)) => {
            let layer = fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_line_number(true)
                .with_file(true)
                .with_ansi(false)
                .with_writer(appender)
                .with_filter(env_filter(verbose)?);
            (Ok(dir), Some(layer))
        }
        Err(e) => (Err(e), None),
    };

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    match log_dir {
        Ok(dir) => tracing::debug!("Logging initialized, log directory: {}", dir.display()),
        Err(e) => tracing::warn!("File logging disabled: {e:#}"),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_log_dir() {
        if let Ok(log_dir) = get_log_dir() {
            assert!(log_dir.ends_with("idmd/logs") || log_dir.ends_with("idmd\\logs"));
        }
    }

    #[test]
    fn test_env_filter_builds() {
        assert!(env_filter(true).is_ok());
    }
}
