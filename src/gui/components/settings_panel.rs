//! Settings panel: window appearance, snapping and shortcut editing

use eframe::egui;

use crate::constants::{opacity, snapping};
use crate::gui::constants::*;
use crate::hotkeys::ShortcutBindings;
use crate::hotkeys::bindings::DEFAULT_ACTIONS;
use crate::snapping::SnapConfig;

/// Current values shown by the panel
pub struct SettingsView<'a> {
    pub opacity: f32,
    pub aspect_lock: bool,
    pub snap: SnapConfig,
    pub always_on_top: bool,
    pub shortcuts: &'a ShortcutBindings,
    pub listening_for: Option<&'a str>,
}

/// Changes requested through the panel
#[derive(Debug, Clone, PartialEq)]
pub enum SettingsAction {
    SetOpacity(f32),
    SetAspectLock(bool),
    SetSnap(SnapConfig),
    SetAlwaysOnTop(bool),
    StartRecording(String),
    CancelRecording,
    ResetShortcut(String),
}

/// `"toggle_always_on_top"` -> `"Toggle always on top"`
pub fn action_label(action: &str) -> String {
    let spaced = action.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn ui(ui: &mut egui::Ui, view: &SettingsView<'_>) -> Vec<SettingsAction> {
    let mut actions = Vec::new();

    ui.group(|ui| {
        ui.label(egui::RichText::new("Window").strong());
        ui.add_space(ITEM_SPACING);

        let mut value = view.opacity;
        let slider = egui::Slider::new(&mut value, opacity::MIN..=opacity::MAX)
            .text("Opacity")
            .fixed_decimals(2);
        if ui.add(slider).changed() {
            actions.push(SettingsAction::SetOpacity(value));
        }

        let mut aspect = view.aspect_lock;
        if ui.checkbox(&mut aspect, "Lock aspect ratio").changed() {
            actions.push(SettingsAction::SetAspectLock(aspect));
        }

        let mut on_top = view.always_on_top;
        if ui.checkbox(&mut on_top, "Always on top").changed() {
            actions.push(SettingsAction::SetAlwaysOnTop(on_top));
        }
    });

    ui.add_space(SECTION_SPACING);

    ui.group(|ui| {
        ui.label(egui::RichText::new("Snapping").strong());
        ui.add_space(ITEM_SPACING);

        let mut snap = view.snap;
        let mut changed = ui.checkbox(&mut snap.screen_edges, "Snap to screen edges").changed();
        changed |= ui.checkbox(&mut snap.other_windows, "Snap to other windows").changed();
        ui.horizontal(|ui| {
            ui.label("Threshold:");
            let threshold = egui::DragValue::new(&mut snap.threshold_px)
                .range(0..=snapping::MAX_THRESHOLD)
                .suffix(" px");
            changed |= ui.add(threshold).changed();
        });
        if changed {
            actions.push(SettingsAction::SetSnap(snap));
        }
    });

    ui.add_space(SECTION_SPACING);

    ui.group(|ui| {
        ui.label(egui::RichText::new("Keyboard Shortcuts").strong());
        ui.add_space(ITEM_SPACING);

        egui::Grid::new("shortcut_grid")
            .num_columns(3)
            .spacing([ITEM_SPACING * 2.0, ITEM_SPACING])
            .show(ui, |ui| {
                let extra = view
                    .shortcuts
                    .iter()
                    .map(|(action, _)| action)
                    .filter(|action| !DEFAULT_ACTIONS.iter().any(|d| d == action));
                for action in DEFAULT_ACTIONS.into_iter().chain(extra) {
                    ui.label(action_label(action));

                    let chord = view
                        .shortcuts
                        .chord_for(action)
                        .map(ToString::to_string)
                        .unwrap_or_else(|| "Unassigned".to_string());

                    if view.listening_for == Some(action) {
                        if ui.button("Press keys... (click to cancel)").clicked() {
                            actions.push(SettingsAction::CancelRecording);
                        }
                    } else if ui.button(chord).on_hover_text("Click to change").clicked() {
                        actions.push(SettingsAction::StartRecording(action.to_string()));
                    }

                    if ui.small_button("Reset").clicked() {
                        actions.push(SettingsAction::ResetShortcut(action.to_string()));
                    }
                    ui.end_row();
                }
            });
    });

    actions
}
