//! Tracing subscriber setup
//!
//! Output goes to stdout and to a session log file. The file is truncated
//! once when the process starts and only appended to afterwards.

use anyhow::{Context, Result};
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{Level as TraceLevel, info, warn};
use tracing_subscriber::FmtSubscriber;
use tracing_subscriber::fmt::writer::MakeWriterExt;

use crate::constants::config;

/// `LOG_LEVEL` value to tracing level, defaulting to info
pub fn parse_level(value: Option<&str>) -> TraceLevel {
    match value.unwrap_or("info").trim().to_lowercase().as_str() {
        "trace" => TraceLevel::TRACE,
        "debug" => TraceLevel::DEBUG,
        "warn" => TraceLevel::WARN,
        "error" => TraceLevel::ERROR,
        _ => TraceLevel::INFO,
    }
}

/// Log file next to the settings file
pub fn default_log_path(settings_path: &Path) -> PathBuf {
    settings_path
        .parent()
        .map(|dir| dir.join(config::LOG_FILENAME))
        .unwrap_or_else(|| PathBuf::from(config::LOG_FILENAME))
}

/// Truncate the session log and reopen it for appending
fn open_session_log(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .context(format!("Failed to create log directory: {}", parent.display()))?;
    }
    File::create(path).context(format!("Failed to reset log file {}", path.display()))?;
    OpenOptions::new()
        .append(true)
        .open(path)
        .context(format!("Failed to open log file {}", path.display()))
}

/// Install the global subscriber. A log file that cannot be opened is not
/// fatal; logging continues on stdout only.
pub fn init(log_path: &Path) -> Result<()> {
    let level = parse_level(std::env::var("LOG_LEVEL").ok().as_deref());

    match open_session_log(log_path) {
        Ok(file) => {
            let subscriber = FmtSubscriber::builder()
                .with_max_level(level)
                .with_ansi(false)
                .with_writer(std::io::stdout.and(Mutex::new(file)))
                .finish();
            tracing::subscriber::set_global_default(subscriber)
                .context("Failed to install tracing subscriber")?;
            info!(path = %log_path.display(), level = %level, "Logging initialized");
        }
        Err(err) => {
            let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
            tracing::subscriber::set_global_default(subscriber)
                .context("Failed to install tracing subscriber")?;
            warn!(error = %err, "Session log unavailable, logging to stdout only");
        }
    }
    Ok(())
}
