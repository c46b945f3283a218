#![forbid(unsafe_code)]

mod config;
mod constants;
mod desktop;
mod drag;
mod error;
mod event_handler;
mod geometry;
mod gui;
mod hit_test;
mod hotkeys;
mod logging;
mod resize;
mod snapping;
mod types;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use tracing::{error, info};

use config::{PersistedSettings, SettingsStore};

#[derive(Parser, Debug)]
#[command(name = "meritscalc")]
#[command(version, about = "Merits calculator with a custom borderless window", long_about = None)]
struct Cli {
    /// Settings file (defaults to <config dir>/meritscalc/settings.json)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Session log file (defaults to meritscalc.log next to the settings file)
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Start from default settings; the saved file is replaced on the next save
    #[arg(long)]
    reset: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings_path = cli.config.unwrap_or_else(SettingsStore::default_path);
    let log_path = cli
        .log_file
        .unwrap_or_else(|| logging::default_log_path(&settings_path));
    logging::init(&log_path)?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        settings = %settings_path.display(),
        "Starting MeritsCalc"
    );

    let store = SettingsStore::new(&settings_path);
    let settings = if cli.reset {
        info!("--reset given, ignoring saved settings");
        PersistedSettings::default()
    } else {
        store.load()
    };

    let shutdown = Arc::new(AtomicBool::new(false));
    #[cfg(unix)]
    register_signals(&shutdown)?;

    gui::run_gui(settings, store, shutdown)
        .inspect_err(|err| error!(error = %err, "GUI exited with error"))
}

/// SIGINT/SIGTERM set `flag`; the UI loop turns it into a normal close
#[cfg(unix)]
fn register_signals(flag: &Arc<AtomicBool>) -> Result<()> {
    use signal_hook::consts::{SIGINT, SIGTERM};

    for signal in [SIGINT, SIGTERM] {
        signal_hook::flag::register(signal, Arc::clone(flag))
            .context(format!("Failed to register handler for signal {signal}"))?;
    }
    Ok(())
}
