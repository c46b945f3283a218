//! Error taxonomy for the window chrome core
//!
//! None of these are fatal. Callers recover locally: corrupt settings fall back
//! to defaults, shortcut errors are shown in the settings panel, geometry is
//! clamped, and failed writes are retried on the next debounce cycle.

use std::path::PathBuf;
use thiserror::Error;

use crate::hotkeys::KeyChord;

#[derive(Debug, Error)]
pub enum ChromeError {
    /// Settings file exists but could not be read or parsed.
    #[error("Settings file {path} is unreadable: {reason}")]
    ConfigCorrupt { path: PathBuf, reason: String },

    /// Chord is already bound to another action.
    #[error("{chord} is already bound to '{existing}'")]
    ShortcutConflict { chord: KeyChord, existing: String },

    /// Chord is owned by the operating system.
    #[error("{0} is reserved by the system")]
    ShortcutReserved(KeyChord),

    /// Action id has no built-in meaning.
    #[error("Unknown shortcut action '{0}'")]
    UnknownAction(String),

    /// A geometry value had to be clamped.
    #[error("Geometry out of bounds: {0}")]
    GeometryOutOfBounds(String),

    /// Settings could not be written to disk.
    #[error("Failed to write settings to {path}: {source}")]
    PersistenceWriteFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize settings: {0}")]
    Serialize(#[from] serde_json::Error),
}
