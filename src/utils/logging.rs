//! Logging system initialization
//!
//! Sets up tracing-based logging to `<log_dir>\importer.log`. The previous
//! sessions' logs are shifted on startup, keeping `SESSIONS_KEPT` of them.

use crate::error::{ImportError, Result, StringError};
use std::path::Path;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt};

/// Log file name prefix and suffix (`importer.log`)
const LOG_PREFIX: &str = "importer";
const LOG_SUFFIX: &str = "log";

/// Number of historical session logs to keep (importer.log.1 through importer.log.5)
const SESSIONS_KEPT: u8 = 5;

/// Initialize the logging system
///
/// Log level defaults to INFO and can be overridden via `RUST_LOG`.
pub fn init_logging(log_dir: &Path) -> Result<()> {
    std::fs::create_dir_all(log_dir)?;
    shift_session_logs(&log_dir.join(format!("{LOG_PREFIX}.{LOG_SUFFIX}")), SESSIONS_KEPT)?;

    // Rotation is handled per session above, not by time
    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(LOG_PREFIX)
        .filename_suffix(LOG_SUFFIX)
        .build(log_dir)
        .map_err(|e| ImportError::ConfigError(Box::new(e)))?;

    let subscriber = fmt()
        .with_writer(file_appender)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| ImportError::ConfigError(Box::new(e)))?;

    tracing::info!("gameimport v{} started", env!("CARGO_PKG_VERSION"));
    Ok(())
}

/// Shift `log.N` to `log.N+1` for every kept session and move the current log to `log.1`
///
/// The oldest log (`log.<keep>`) is deleted. Nothing happens when the current
/// log does not exist.
fn shift_session_logs(log_path: &Path, keep: u8) -> Result<()> {
    if !log_path.exists() {
        return Ok(());
    }

    let dir = log_path
        .parent()
        .ok_or_else(|| ImportError::ConfigError(StringError::new("Invalid log path")))?;
    let file_name = log_path
        .file_name()
        .ok_or_else(|| ImportError::ConfigError(StringError::new("Invalid log filename")))?
        .to_string_lossy()
        .into_owned();
    let numbered = |n: u8| dir.join(format!("{file_name}.{n}"));

    let oldest = numbered(keep);
    if oldest.exists() {
        std::fs::remove_file(&oldest)?;
    }

    for n in (1..keep).rev() {
        let current = numbered(n);
        if current.exists() {
            std::fs::rename(&current, numbered(n + 1))?;
        }
    }

    std::fs::rename(log_path, numbered(1))?;
    Ok(())
}
