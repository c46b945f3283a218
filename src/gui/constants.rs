//! GUI-specific constants for layout, colors and intervals

use egui;

pub const APP_TITLE: &str = "MeritsCalc";

/// Layout spacing
pub const SECTION_SPACING: f32 = 12.0;
pub const ITEM_SPACING: f32 = 6.0;
pub const PADDING: f32 = 8.0;

/// Title bar buttons
pub const TITLE_BUTTON_WIDTH: f32 = 28.0;

/// Background and status colors
pub const PANEL_FILL: egui::Color32 = egui::Color32::from_rgb(24, 26, 32);
pub const TITLE_FILL: egui::Color32 = egui::Color32::from_rgb(36, 39, 48);
pub const STATUS_OK: egui::Color32 = egui::Color32::from_rgb(0, 200, 0);
pub const STATUS_ERROR: egui::Color32 = egui::Color32::from_rgb(220, 60, 60);
pub const STATUS_INFO: egui::Color32 = egui::Color32::from_rgb(200, 200, 0);

/// Idle wakeup so a pending shutdown signal is noticed
pub const SIGNAL_CHECK_INTERVAL_MS: u64 = 250;

/// How long a status message stays visible
pub const STATUS_TIMEOUT_MS: u64 = 4000;
