//! Pointer event dispatch for the custom window chrome
//!
//! The render layer translates its input into [`InputEvent`]s in desktop
//! coordinates and applies whatever geometry [`WindowChrome`] reports back.
//! At most one of resize and move is active at a time.

use tracing::{debug, warn};

use crate::constants::chrome;
use crate::desktop::{Desktop, DesktopSnapshot};
use crate::drag::MoveController;
use crate::geometry::{GeometryModel, WindowGeometry};
use crate::hit_test::{self, Zone};
use crate::resize::ResizeController;
use crate::snapping::{SnapConfig, SnapContext};
use crate::types::{Position, Rect};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    PointerMoved(Position),
    PointerPressed(Position),
    /// Release position, if the pointer is still known
    PointerReleased(Option<Position>),
    DoubleClicked(Position),
    FocusLost,
    /// Primary button came up without the window seeing the release
    CaptureLost,
}

/// What the render layer has to do after an event
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ChromeResponse {
    pub geometry: Option<WindowGeometry>,
    pub save_requested: bool,
}

impl ChromeResponse {
    fn changed(geometry: WindowGeometry) -> Self {
        Self {
            geometry: Some(geometry),
            save_requested: false,
        }
    }

    fn committed(geometry: Option<WindowGeometry>) -> Self {
        Self {
            save_requested: geometry.is_some(),
            geometry,
        }
    }
}

pub struct WindowChrome {
    model: GeometryModel,
    resize: ResizeController,
    mover: MoveController,
    snap: SnapConfig,
    hover: Zone,
    desktop: DesktopSnapshot,
}

impl WindowChrome {
    pub fn new(model: GeometryModel, snap: SnapConfig) -> Self {
        Self {
            model,
            resize: ResizeController::new(),
            mover: MoveController::new(),
            snap,
            hover: Zone::None,
            desktop: DesktopSnapshot::default(),
        }
    }

    pub fn model(&self) -> &GeometryModel {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut GeometryModel {
        &mut self.model
    }

    pub fn snap_config(&self) -> SnapConfig {
        self.snap
    }

    pub fn set_snap_config(&mut self, snap: SnapConfig) {
        self.snap = snap;
    }

    /// Zone under the pointer, or the zone being dragged
    pub fn hover_zone(&self) -> Zone {
        self.hover
    }

    pub fn is_dragging(&self) -> bool {
        self.resize.is_active() || self.mover.is_active()
    }

    pub fn title_bar(&self) -> Rect {
        let window = self.model.geometry().rect();
        Rect::new(window.x, window.y, window.width, chrome::TITLE_BAR_HEIGHT)
    }

    pub fn classify(&self, pointer: Position) -> Zone {
        hit_test::classify(
            pointer,
            self.model.geometry().rect(),
            self.title_bar(),
            chrome::BORDER_THICKNESS,
        )
    }

    /// Re-read work areas and other windows. Keeps the previous snapshot
    /// if the query fails.
    pub fn refresh_desktop(&mut self, desktop: &dyn Desktop) {
        match desktop.snapshot() {
            Ok(snapshot) => {
                if !snapshot.work_areas.is_empty() {
                    self.model.set_work_areas(snapshot.work_areas.clone());
                }
                self.desktop = snapshot;
            }
            Err(e) => warn!(error = %e, "Desktop query failed, using previous snapshot"),
        }
    }

    pub fn handle_event(&mut self, event: InputEvent, desktop: &dyn Desktop) -> ChromeResponse {
        match event {
            InputEvent::PointerMoved(pointer) => self.pointer_moved(pointer),
            InputEvent::PointerPressed(pointer) => self.pointer_pressed(pointer, desktop),
            InputEvent::PointerReleased(pointer) => self.pointer_released(pointer),
            InputEvent::DoubleClicked(pointer) => self.double_clicked(pointer, desktop),
            InputEvent::FocusLost | InputEvent::CaptureLost => self.cancel_gesture(),
        }
    }

    fn pointer_moved(&mut self, pointer: Position) -> ChromeResponse {
        let snap = SnapContext {
            screens: &self.desktop.work_areas,
            others: &self.desktop.windows,
            config: &self.snap,
        };
        let before = self.model.geometry();
        let updated = if self.resize.is_active() {
            self.resize.update(pointer, &mut self.model, &snap)
        } else if self.mover.is_active() {
            self.mover.update(pointer, &mut self.model, &snap)
        } else {
            self.hover = self.classify(pointer);
            return ChromeResponse::default();
        };

        match updated {
            Some(geometry) if geometry != before => {
                // Manual sizing takes over from a maximized layout
                self.model.clear_maximized();
                ChromeResponse::changed(geometry)
            }
            _ => ChromeResponse::default(),
        }
    }

    fn pointer_pressed(&mut self, pointer: Position, desktop: &dyn Desktop) -> ChromeResponse {
        if self.is_dragging() {
            return ChromeResponse::default();
        }
        let zone = self.classify(pointer);
        self.hover = zone;
        if !zone.is_resize() && zone != Zone::TitleBar {
            return ChromeResponse::default();
        }

        self.refresh_desktop(desktop);
        let anchor = self.model.geometry();
        if zone == Zone::TitleBar {
            self.mover.begin(pointer, anchor);
        } else {
            self.resize.begin(zone, pointer, anchor);
        }
        ChromeResponse::default()
    }

    fn pointer_released(&mut self, pointer: Option<Position>) -> ChromeResponse {
        let snap = SnapContext {
            screens: &self.desktop.work_areas,
            others: &self.desktop.windows,
            config: &self.snap,
        };
        let before = self.model.geometry();
        let geometry = if self.resize.is_active() {
            self.resize.finish(pointer, &mut self.model, &snap)
        } else {
            self.mover.finish(pointer, &mut self.model, &snap)
        };
        if geometry.is_some_and(|g| g != before) {
            self.model.clear_maximized();
        }
        if let Some(pointer) = pointer {
            self.hover = self.classify(pointer);
        }
        ChromeResponse::committed(geometry)
    }

    fn double_clicked(&mut self, pointer: Position, desktop: &dyn Desktop) -> ChromeResponse {
        if self.classify(pointer) != Zone::TitleBar {
            return ChromeResponse::default();
        }
        // The first click of the pair started a move; drop it
        self.resize.cancel(&self.model);
        self.mover.cancel(&self.model);
        self.refresh_desktop(desktop);
        let geometry = self.model.toggle_maximize();
        debug!(maximized = self.model.is_maximized(), "Title bar double-click");
        ChromeResponse::committed(Some(geometry))
    }

    fn cancel_gesture(&mut self) -> ChromeResponse {
        let geometry = self
            .resize
            .cancel(&self.model)
            .or_else(|| self.mover.cancel(&self.model));
        self.hover = Zone::None;
        ChromeResponse::committed(geometry)
    }
}
