//! Logging initialization for studio-site.
//!
//! Logs go to stderr, or through a non-blocking appender to `logging.file`
//! when it is set.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;

pub struct LoggingHandle {
    /// Flushes the file writer on drop
    pub _guard: Option<WorkerGuard>,

    /// Path to the log file (only set when file logging is enabled)
    pub log_file_path: Option<PathBuf>,
}

/// Effective filter directive: `--debug` beats `RUST_LOG`, which beats config.
fn filter_directive(config: &Config, debug_override: bool, rust_log: Option<String>) -> String {
    if debug_override {
        return "debug".to_string();
    }
    rust_log.unwrap_or_else(|| config.logging.level.clone())
}

/// Split a configured log file path into the directory and file name the
/// appender expects.
fn split_log_path(path: &Path) -> (PathBuf, String) {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "studio-site.log".to_string());
    (dir, name)
}

/// Install the global subscriber.
///
/// Keep the returned handle alive until exit so the file writer flushes.
pub fn init_logging(config: &Config, debug_override: bool) -> Result<LoggingHandle> {
    let directive = filter_directive(config, debug_override, std::env::var("RUST_LOG").ok());
    let filter = tracing_subscriber::EnvFilter::new(directive);

    let (writer, guard, log_file_path) = match config.logging.file.as_deref() {
        Some(file) => {
            let (logs_dir, log_filename) = split_log_path(Path::new(file));
            std::fs::create_dir_all(&logs_dir).with_context(|| {
                format!("Failed to create log directory {}", logs_dir.display())
            })?;
            let appender = tracing_appender::rolling::never(&logs_dir, &log_filename);
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            (
                BoxMakeWriter::new(non_blocking),
                Some(guard),
                Some(logs_dir.join(log_filename)),
            )
        }
        None => (BoxMakeWriter::new(std::io::stderr), None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                // plain text when writing to a file
                .with_ansi(log_file_path.is_none())
                .with_writer(writer),
        )
        .init();

    Ok(LoggingHandle {
        _guard: guard,
        log_file_path,
    })
}
