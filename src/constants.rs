//! Application-wide constants
//!
//! This module contains all magic numbers and string literals used throughout
//! the application, providing a single source of truth for constant values.

/// Window size limits and the first-run placement
pub mod geometry {
    /// Smallest width the window can be resized to
    pub const MIN_WIDTH: i32 = 400;

    /// Smallest height the window can be resized to
    pub const MIN_HEIGHT: i32 = 500;

    /// First-run position and size
    pub const DEFAULT_X: i32 = 100;
    pub const DEFAULT_Y: i32 = 100;
    pub const DEFAULT_WIDTH: i32 = 500;
    pub const DEFAULT_HEIGHT: i32 = 720;

    /// Range accepted for a locked width/height ratio
    pub const MIN_ASPECT_RATIO: f64 = 0.1;
    pub const MAX_ASPECT_RATIO: f64 = 10.0;

    /// DPI scale assumed until the render layer reports one
    pub const DEFAULT_DPI_SCALE: f32 = 1.0;
}

/// Window transparency
pub mod opacity {
    /// Visibility floor: the window can never be made fully invisible
    pub const MIN: f32 = 0.1;

    pub const MAX: f32 = 1.0;

    pub const DEFAULT: f32 = 0.9;
}

/// Custom window chrome (title bar and resize borders), in logical pixels
pub mod chrome {
    /// Width of the invisible resize band along each window edge
    pub const BORDER_THICKNESS: i32 = 6;

    /// Height of the custom title bar
    pub const TITLE_BAR_HEIGHT: i32 = 32;
}

/// Edge snapping
pub mod snapping {
    /// Default pull-in distance in pixels
    pub const DEFAULT_THRESHOLD: i32 = 12;

    /// Upper bound accepted from the settings file
    pub const MAX_THRESHOLD: i32 = 200;
}

/// Settings persistence
pub mod persistence {
    /// Quiet period before a requested save is written
    pub const DEBOUNCE_MS: u64 = 300;

    /// Suffix appended to a settings file that failed to parse
    pub const CORRUPT_SUFFIX: &str = "corrupt";
}

/// File locations
pub mod config {
    /// Directory under the platform config dir
    pub const APP_DIR: &str = "meritscalc";

    /// Settings file name
    pub const FILENAME: &str = "settings.json";

    /// Session log file name (reset at startup)
    pub const LOG_FILENAME: &str = "meritscalc.log";
}

/// Shortcut action identifiers
pub mod actions {
    pub const SAVE: &str = "save";
    pub const QUIT: &str = "quit";
    pub const COPY_REPORT: &str = "copy_report";
    pub const CLEAR: &str = "clear";
    pub const MINIMIZE: &str = "minimize";
    pub const TOGGLE_TRANSPARENCY: &str = "toggle_transparency";
    pub const TOGGLE_ALWAYS_ON_TOP: &str = "toggle_always_on_top";
}
