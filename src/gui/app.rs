//! Main window: a borderless, translucent eframe viewport whose chrome
//! (title bar, resize borders, snapping) is driven by [`WindowChrome`]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use anyhow::{Result, anyhow};
use eframe::{NativeOptions, egui};
use tracing::{debug, error, info, warn};

use crate::config::{PersistedSettings, SettingsStore};
use crate::constants::{actions, geometry as limits, opacity};
use crate::desktop::{Desktop, DesktopSnapshot, StaticDesktop, X11Desktop};
use crate::error::ChromeError;
use crate::event_handler::{InputEvent, WindowChrome};
use crate::geometry::{GeometryModel, Opacity, WindowGeometry};
use crate::gui::components::{settings_panel, title_bar};
use crate::gui::constants::*;
use crate::hit_test::Zone;
use crate::hotkeys::{KeyPress, RecordOutcome, ShortcutRecorder};
use crate::types::{Position, Rect};

/// Desktop query used by the window: X11 when available, otherwise the
/// monitor size egui reports. Results are converted to logical points.
pub struct AppDesktop {
    x11: Option<X11Desktop>,
    fallback: StaticDesktop,
    pixels_per_point: f32,
}

impl AppDesktop {
    pub fn new(pixels_per_point: f32) -> Self {
        let x11 = match X11Desktop::connect() {
            Ok(desktop) => Some(desktop),
            Err(err) => {
                warn!(error = %err, "X11 desktop query unavailable, using monitor size");
                None
            }
        };
        Self {
            x11,
            fallback: StaticDesktop::default(),
            pixels_per_point,
        }
    }

    /// Per-frame scale and monitor information from egui
    fn update(&mut self, pixels_per_point: f32, monitor_size: Option<egui::Vec2>) {
        self.pixels_per_point = pixels_per_point;
        if let Some(size) = monitor_size {
            self.fallback = StaticDesktop::new(vec![Rect::new(0, 0, size.x as i32, size.y as i32)]);
        }
    }
}

impl Desktop for AppDesktop {
    fn snapshot(&self) -> Result<DesktopSnapshot> {
        let fallback = self.fallback.snapshot()?;
        let Some(x11) = &self.x11 else {
            return Ok(fallback);
        };
        match x11.snapshot() {
            Ok(snapshot) => {
                let mut snapshot = snapshot.scaled(self.pixels_per_point);
                if snapshot.work_areas.is_empty() {
                    snapshot.work_areas = fallback.work_areas;
                }
                Ok(snapshot)
            }
            Err(err) => {
                warn!(error = %err, "X11 desktop query failed, using monitor size");
                Ok(fallback)
            }
        }
    }
}

struct StatusMessage {
    text: String,
    color: egui::Color32,
    shown: Instant,
}

pub struct MeritsApp {
    chrome: WindowChrome,
    settings: PersistedSettings,
    store: SettingsStore,
    recorder: ShortcutRecorder,
    desktop: AppDesktop,
    shutdown: Arc<AtomicBool>,
    /// Configured opacity while the transparency toggle forces full opacity
    remembered_opacity: Option<Opacity>,
    /// Geometry last sent to the window system
    applied: WindowGeometry,
    title_controls: Option<egui::Rect>,
    show_settings: bool,
    status: Option<StatusMessage>,
}

impl MeritsApp {
    /// Build the app and place the window using the saved settings
    pub fn new(
        settings: PersistedSettings,
        store: SettingsStore,
        shutdown: Arc<AtomicBool>,
    ) -> Self {
        let desktop = AppDesktop::new(settings.geometry.dpi_scale);
        let model = GeometryModel::new(settings.geometry, settings.aspect_lock, settings.opacity);
        let mut chrome = WindowChrome::new(model, settings.snap);
        chrome.refresh_desktop(&desktop);
        let applied = chrome.model_mut().restore();

        info!(
            x = applied.x,
            y = applied.y,
            width = applied.width,
            height = applied.height,
            opacity = settings.opacity.value(),
            always_on_top = settings.always_on_top,
            "Window placement restored"
        );

        Self {
            chrome,
            settings,
            store,
            recorder: ShortcutRecorder::new(),
            desktop,
            shutdown,
            remembered_opacity: None,
            applied,
            title_controls: None,
            show_settings: false,
            status: None,
        }
    }

    pub fn initial_geometry(&self) -> WindowGeometry {
        self.applied
    }

    /// Current state in its on-disk shape
    fn snapshot(&self) -> PersistedSettings {
        let model = self.chrome.model();
        let mut settings = self.settings.clone();
        settings.geometry = model.geometry();
        settings.aspect_lock = model.aspect_lock();
        settings.opacity = self.remembered_opacity.unwrap_or(model.opacity());
        settings.snap = self.chrome.snap_config();
        settings
    }

    fn request_save(&mut self) {
        let snapshot = self.snapshot();
        self.store.request_save(snapshot);
    }

    fn save_now(&mut self) {
        let snapshot = self.snapshot();
        match self.store.flush_now(&snapshot) {
            Ok(()) => self.set_status("Settings saved", STATUS_OK),
            Err(err) => self.report_error(&err),
        }
    }

    fn set_status(&mut self, text: impl Into<String>, color: egui::Color32) {
        self.status = Some(StatusMessage {
            text: text.into(),
            color,
            shown: Instant::now(),
        });
    }

    fn report_error(&mut self, err: &ChromeError) {
        error!(error = %err, "Settings error");
        self.set_status(err.to_string(), STATUS_ERROR);
    }

    fn collect_input(&self, ctx: &egui::Context) -> (Vec<InputEvent>, Vec<KeyPress>) {
        let geometry = self.chrome.model().geometry();
        let controls = self.title_controls;
        let dragging = self.chrome.is_dragging();

        ctx.input(|i| {
            let origin = i
                .viewport()
                .outer_rect
                .map(|r| r.min)
                .unwrap_or(egui::pos2(geometry.x as f32, geometry.y as f32));
            let over_controls = |pos: egui::Pos2| controls.is_some_and(|r| r.contains(pos));

            let mut events = Vec::new();
            let mut keys = Vec::new();
            for event in &i.events {
                match event {
                    egui::Event::PointerMoved(pos) => {
                        events.push(InputEvent::PointerMoved(to_desktop(origin, *pos)));
                    }
                    egui::Event::PointerButton {
                        pos,
                        button: egui::PointerButton::Primary,
                        pressed,
                        ..
                    } => {
                        if !*pressed {
                            let pos = to_desktop(origin, *pos);
                            events.push(InputEvent::PointerReleased(Some(pos)));
                        } else if !over_controls(*pos) {
                            events.push(InputEvent::PointerPressed(to_desktop(origin, *pos)));
                        }
                    }
                    egui::Event::WindowFocused(false) => events.push(InputEvent::FocusLost),
                    other => keys.extend(key_press_for(other)),
                }
            }

            let released = events
                .iter()
                .any(|e| matches!(e, InputEvent::PointerReleased(_)));
            if capture_lost(dragging, i.pointer.primary_down(), released) {
                debug!("Primary button up without a release event, ending gesture");
                events.push(InputEvent::CaptureLost);
            }

            if i.pointer.button_double_clicked(egui::PointerButton::Primary)
                && let Some(pos) = i.pointer.interact_pos()
                && !over_controls(pos)
            {
                events.push(InputEvent::DoubleClicked(to_desktop(origin, pos)));
            }

            (events, keys)
        })
    }

    fn handle_key(&mut self, ctx: &egui::Context, press: KeyPress) {
        match self.recorder.handle_key(&press, &mut self.settings.shortcuts) {
            RecordOutcome::Ignored => {}
            RecordOutcome::StillListening => return,
            RecordOutcome::Bound { action, chord } => {
                let label = settings_panel::action_label(&action);
                self.set_status(format!("{label} is now {chord}"), STATUS_OK);
                self.request_save();
                return;
            }
            RecordOutcome::Rejected { error, .. } => {
                self.set_status(error.to_string(), STATUS_ERROR);
                return;
            }
        }

        let Some(chord) = press.to_chord() else {
            return;
        };
        let Some(action) = self.settings.shortcuts.action_for(&chord).map(str::to_string) else {
            return;
        };
        debug!(action = %action, chord = %chord, "Shortcut triggered");
        self.run_action(ctx, &action);
    }

    fn run_action(&mut self, ctx: &egui::Context, action: &str) {
        match action {
            actions::SAVE => self.save_now(),
            actions::QUIT => {
                info!("Quit requested");
                ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            }
            actions::COPY_REPORT => {
                ctx.copy_text(self.report());
                self.set_status("Report copied to clipboard", STATUS_INFO);
            }
            actions::CLEAR => {
                self.status = None;
                self.recorder.cancel();
            }
            actions::MINIMIZE => ctx.send_viewport_cmd(egui::ViewportCommand::Minimized(true)),
            actions::TOGGLE_TRANSPARENCY => self.toggle_transparency(),
            actions::TOGGLE_ALWAYS_ON_TOP => {
                let enabled = !self.settings.always_on_top;
                self.set_always_on_top(ctx, enabled);
            }
            other => debug!(action = %other, "No handler for shortcut action"),
        }
    }

    fn toggle_transparency(&mut self) {
        let current = self.chrome.model().opacity();
        let (next, remembered) = toggled_opacity(current, self.remembered_opacity);
        self.remembered_opacity = remembered;
        self.chrome.model_mut().set_opacity(next.value());
        info!(opacity = next.value(), "Transparency toggled");
        self.request_save();
    }

    fn set_always_on_top(&mut self, ctx: &egui::Context, enabled: bool) {
        self.settings.always_on_top = enabled;
        ctx.send_viewport_cmd(egui::ViewportCommand::WindowLevel(window_level(enabled)));
        info!(enabled, "Always on top changed");
        self.request_save();
    }

    fn apply_settings_action(
        &mut self,
        ctx: &egui::Context,
        action: settings_panel::SettingsAction,
    ) {
        use settings_panel::SettingsAction;

        match action {
            SettingsAction::SetOpacity(value) => {
                self.remembered_opacity = None;
                self.chrome.model_mut().set_opacity(value);
            }
            SettingsAction::SetAspectLock(enabled) => {
                self.chrome.model_mut().set_aspect_lock(enabled);
            }
            SettingsAction::SetSnap(snap) => self.chrome.set_snap_config(snap),
            SettingsAction::SetAlwaysOnTop(enabled) => {
                self.set_always_on_top(ctx, enabled);
                return;
            }
            SettingsAction::StartRecording(action) => {
                self.recorder.start(&action);
                return;
            }
            SettingsAction::CancelRecording => {
                self.recorder.cancel();
                return;
            }
            SettingsAction::ResetShortcut(action) => {
                self.recorder.cancel();
                if let Err(err) = self.settings.shortcuts.reset(&action) {
                    self.set_status(err.to_string(), STATUS_ERROR);
                    return;
                }
            }
        }
        self.request_save();
    }

    /// Plain-text summary of the calculator values
    fn report(&self) -> String {
        let mut report = format!("{APP_TITLE} report\n");
        for (key, value) in self.settings.external.iter() {
            report.push_str(&format!("{}: {}\n", settings_panel::action_label(key), value));
        }
        report
    }

    /// Push model geometry to the window system when it changed
    fn apply_geometry(&mut self, ctx: &egui::Context) {
        let geometry = self.chrome.model().geometry();
        if geometry == self.applied {
            return;
        }
        if (geometry.x, geometry.y) != (self.applied.x, self.applied.y) {
            ctx.send_viewport_cmd(egui::ViewportCommand::OuterPosition(egui::pos2(
                geometry.x as f32,
                geometry.y as f32,
            )));
        }
        if (geometry.width, geometry.height) != (self.applied.width, self.applied.height) {
            ctx.send_viewport_cmd(egui::ViewportCommand::InnerSize(egui::vec2(
                geometry.width as f32,
                geometry.height as f32,
            )));
        }
        self.applied = geometry;
    }

    fn poll_store(&mut self) {
        if let Some(Err(err)) = self.store.poll() {
            self.report_error(&err);
        }
    }

    fn schedule_repaint(&self, ctx: &egui::Context) {
        let mut wait = Duration::from_millis(SIGNAL_CHECK_INTERVAL_MS);
        if let Some(deadline) = self.store.next_deadline() {
            wait = wait.min(deadline.saturating_duration_since(Instant::now()));
        }
        ctx.request_repaint_after(wait);
    }

    fn client_ui(&mut self, ui: &mut egui::Ui) {
        ui.add_space(PADDING);
        ui.group(|ui| {
            ui.label(egui::RichText::new("Rates").strong());
            ui.add_space(ITEM_SPACING);
            egui::Grid::new("rates_grid").num_columns(2).show(ui, |ui| {
                for (key, value) in self.settings.external.iter() {
                    ui.label(settings_panel::action_label(key));
                    ui.label(value.to_string());
                    ui.end_row();
                }
            });
        });
    }
}

impl eframe::App for MeritsApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.shutdown.swap(false, Ordering::SeqCst) {
            info!("Shutdown signal received, closing window");
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }

        let pixels_per_point = ctx.pixels_per_point();
        let monitor_size = ctx.input(|i| i.viewport().monitor_size);
        self.desktop.update(pixels_per_point, monitor_size);
        self.chrome.model_mut().set_dpi_scale(pixels_per_point);

        let (events, keys) = self.collect_input(ctx);
        for event in events {
            if event == InputEvent::FocusLost {
                self.recorder.cancel();
            }
            let response = self.chrome.handle_event(event, &self.desktop);
            if response.save_requested {
                self.request_save();
            }
        }
        for press in keys {
            self.handle_key(ctx, press);
        }

        self.apply_geometry(ctx);
        ctx.set_cursor_icon(cursor_for(self.chrome.hover_zone()));

        let opacity = self.chrome.model().opacity().value();
        let title = title_bar::ui(ctx, opacity, self.settings.always_on_top, self.show_settings);
        self.title_controls = title.controls;
        if title.close {
            self.run_action(ctx, actions::QUIT);
        }
        if title.minimize {
            self.run_action(ctx, actions::MINIMIZE);
        }
        if title.toggle_always_on_top {
            self.run_action(ctx, actions::TOGGLE_ALWAYS_ON_TOP);
        }
        if title.toggle_settings {
            self.show_settings = !self.show_settings;
            if !self.show_settings {
                self.recorder.cancel();
            }
        }

        if self
            .status
            .as_ref()
            .is_some_and(|s| s.shown.elapsed() > Duration::from_millis(STATUS_TIMEOUT_MS))
        {
            self.status = None;
        }

        let frame = egui::Frame::central_panel(&ctx.style())
            .fill(PANEL_FILL.gamma_multiply(opacity))
            .inner_margin(PADDING);
        let mut requested = Vec::new();
        egui::CentralPanel::default().frame(frame).show(ctx, |ui| {
            ui.multiply_opacity(opacity);
            egui::ScrollArea::vertical().show(ui, |ui| {
                if self.show_settings {
                    let model = self.chrome.model();
                    let view = settings_panel::SettingsView {
                        opacity: model.opacity().value(),
                        aspect_lock: model.aspect_lock().enabled,
                        snap: self.chrome.snap_config(),
                        always_on_top: self.settings.always_on_top,
                        shortcuts: &self.settings.shortcuts,
                        listening_for: self.recorder.listening_for(),
                    };
                    requested = settings_panel::ui(ui, &view);
                } else {
                    self.client_ui(ui);
                }

                if let Some(status) = &self.status {
                    ui.add_space(SECTION_SPACING);
                    ui.colored_label(status.color, &status.text);
                }
            });
        });
        for action in requested {
            self.apply_settings_action(ctx, action);
        }
        self.apply_geometry(ctx);

        self.poll_store();
        self.schedule_repaint(ctx);
    }

    fn clear_color(&self, _visuals: &egui::Visuals) -> [f32; 4] {
        [0.0, 0.0, 0.0, 0.0]
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        let snapshot = self.snapshot();
        if let Err(err) = self.store.flush_now(&snapshot) {
            error!(error = %err, "Failed to save settings during shutdown");
        }
        info!("MeritsCalc exiting");
    }
}

/// Window-local egui position to desktop coordinates
fn to_desktop(origin: egui::Pos2, pos: egui::Pos2) -> Position {
    Position::new((origin.x + pos.x).round() as i32, (origin.y + pos.y).round() as i32)
}

/// Key press carried by an input event. Clipboard shortcuts arrive as
/// `Copy`/`Cut`/`Paste` with no `Key` event, so they map back to their chords.
fn key_press_for(event: &egui::Event) -> Option<KeyPress> {
    let clipboard = |key: &str| Some(KeyPress::new(key).with_modifiers(true, false, false, false));
    match event {
        egui::Event::Key {
            key,
            pressed: true,
            repeat: false,
            modifiers,
            ..
        } => Some(KeyPress::new(key.name()).with_modifiers(
            modifiers.ctrl,
            modifiers.alt,
            modifiers.shift,
            modifiers.mac_cmd,
        )),
        egui::Event::Copy => clipboard("C"),
        egui::Event::Cut => clipboard("X"),
        egui::Event::Paste(_) => clipboard("V"),
        _ => None,
    }
}

/// A gesture whose button came up without the release reaching the window
fn capture_lost(dragging: bool, primary_down: bool, released: bool) -> bool {
    dragging && !primary_down && !released
}

fn cursor_for(zone: Zone) -> egui::CursorIcon {
    match zone {
        Zone::N => egui::CursorIcon::ResizeNorth,
        Zone::S => egui::CursorIcon::ResizeSouth,
        Zone::E => egui::CursorIcon::ResizeEast,
        Zone::W => egui::CursorIcon::ResizeWest,
        Zone::NE => egui::CursorIcon::ResizeNorthEast,
        Zone::NW => egui::CursorIcon::ResizeNorthWest,
        Zone::SE => egui::CursorIcon::ResizeSouthEast,
        Zone::SW => egui::CursorIcon::ResizeSouthWest,
        Zone::TitleBar | Zone::Client | Zone::None => egui::CursorIcon::Default,
    }
}

fn window_level(always_on_top: bool) -> egui::WindowLevel {
    if always_on_top {
        egui::WindowLevel::AlwaysOnTop
    } else {
        egui::WindowLevel::Normal
    }
}

/// Transparency toggle: translucent -> opaque remembers the configured
/// value; opaque goes back to it, or to the default if none was remembered.
fn toggled_opacity(current: Opacity, remembered: Option<Opacity>) -> (Opacity, Option<Opacity>) {
    match remembered {
        Some(previous) => (previous, None),
        None if current.is_opaque() => (Opacity::new(opacity::DEFAULT), None),
        None => (Opacity::new(opacity::MAX), Some(current)),
    }
}

pub fn run_gui(
    settings: PersistedSettings,
    store: SettingsStore,
    shutdown: Arc<AtomicBool>,
) -> Result<()> {
    let always_on_top = settings.always_on_top;
    let app = MeritsApp::new(settings, store, shutdown);
    let geometry = app.initial_geometry();

    let options = NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(APP_TITLE)
            .with_decorations(false)
            .with_transparent(true)
            .with_position([geometry.x as f32, geometry.y as f32])
            .with_inner_size([geometry.width as f32, geometry.height as f32])
            .with_min_inner_size([limits::MIN_WIDTH as f32, limits::MIN_HEIGHT as f32])
            .with_window_level(window_level(always_on_top)),
        ..Default::default()
    };

    eframe::run_native(APP_TITLE, options, Box::new(move |_cc| Ok(Box::new(app))))
        .map_err(|err| anyhow!("Failed to launch window: {err}"))
}
