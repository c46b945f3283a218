//! Custom title bar drawn inside the borderless window

use eframe::egui;

use crate::constants::chrome;
use crate::gui::constants::*;

/// Buttons clicked this frame
#[derive(Debug, Default)]
pub struct TitleBarResponse {
    pub minimize: bool,
    pub close: bool,
    pub toggle_settings: bool,
    pub toggle_always_on_top: bool,
    /// Area covered by buttons; presses here must not start a window move
    pub controls: Option<egui::Rect>,
}

pub fn ui(
    ctx: &egui::Context,
    opacity: f32,
    always_on_top: bool,
    settings_open: bool,
) -> TitleBarResponse {
    let mut response = TitleBarResponse::default();

    let frame = egui::Frame::new()
        .fill(TITLE_FILL.gamma_multiply(opacity))
        .inner_margin(egui::Margin::symmetric(PADDING as i8, 0));

    egui::TopBottomPanel::top("title_bar")
        .exact_height(chrome::TITLE_BAR_HEIGHT as f32)
        .frame(frame)
        .show_separator_line(false)
        .show(ctx, |ui| {
            ui.multiply_opacity(opacity);
            ui.horizontal_centered(|ui| {
                ui.label(egui::RichText::new(APP_TITLE).strong());

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let height = chrome::TITLE_BAR_HEIGHT as f32 - 8.0;
                    let size = egui::vec2(TITLE_BUTTON_WIDTH, height);

                    let close = ui.add_sized(size, egui::Button::new("\u{2715}").frame(false));
                    let minimize = ui.add_sized(size, egui::Button::new("\u{2013}").frame(false));
                    let toggle = |icon: &'static str, selected: bool| {
                        egui::Button::new(icon).selected(selected).frame(false)
                    };
                    let pin = ui
                        .add_sized(size, toggle("\u{1F4CC}", always_on_top))
                        .on_hover_text("Always on top");
                    let gear = ui
                        .add_sized(size, toggle("\u{2699}", settings_open))
                        .on_hover_text("Settings");

                    response.close = close.clicked();
                    response.minimize = minimize.clicked();
                    response.toggle_always_on_top = pin.clicked();
                    response.toggle_settings = gear.clicked();
                    let controls = [minimize.rect, pin.rect, gear.rect]
                        .into_iter()
                        .fold(close.rect, |all, rect| all.union(rect));
                    response.controls = Some(controls);
                });
            });
        });

    response
}
