//! Window geometry state
//!
//! [`GeometryModel`] is the single owner of the window's position, size, aspect
//! lock and opacity. Every change goes through [`GeometryModel::propose`], which
//! clamps the proposal into range and applies the aspect constraint before
//! committing it. Proposals are never rejected outright.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};

use crate::constants::{geometry as limits, opacity};
use crate::error::ChromeError;
use crate::types::Rect;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowGeometry {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    #[serde(default = "default_dpi_scale")]
    pub dpi_scale: f32,
}

fn default_dpi_scale() -> f32 {
    limits::DEFAULT_DPI_SCALE
}

impl Default for WindowGeometry {
    fn default() -> Self {
        Self {
            x: limits::DEFAULT_X,
            y: limits::DEFAULT_Y,
            width: limits::DEFAULT_WIDTH,
            height: limits::DEFAULT_HEIGHT,
            dpi_scale: limits::DEFAULT_DPI_SCALE,
        }
    }
}

impl WindowGeometry {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            dpi_scale: limits::DEFAULT_DPI_SCALE,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    /// Same DPI scale, new bounds
    pub fn with_rect(self, rect: Rect) -> Self {
        Self {
            x: rect.x,
            y: rect.y,
            width: rect.width,
            height: rect.height,
            dpi_scale: self.dpi_scale,
        }
    }

    /// Check the size minimums without correcting anything
    pub fn validate(&self) -> Result<(), ChromeError> {
        if self.width < limits::MIN_WIDTH || self.height < limits::MIN_HEIGHT {
            return Err(ChromeError::GeometryOutOfBounds(format!(
                "{}x{} is below the {}x{} minimum",
                self.width,
                self.height,
                limits::MIN_WIDTH,
                limits::MIN_HEIGHT
            )));
        }
        if !self.dpi_scale.is_finite() || self.dpi_scale <= 0.0 {
            return Err(ChromeError::GeometryOutOfBounds(format!(
                "invalid DPI scale {}",
                self.dpi_scale
            )));
        }
        Ok(())
    }
}

/// Fixed width/height ratio enforced while resizing
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AspectLock {
    pub enabled: bool,
    /// Width divided by height. `None` until first captured.
    #[serde(default)]
    pub ratio: Option<f64>,
}

/// Bring a ratio into the accepted range. `None` if it is not a usable number.
pub fn clamp_aspect_ratio(ratio: f64) -> Option<f64> {
    if !ratio.is_finite() || ratio <= 0.0 {
        return None;
    }
    Some(ratio.clamp(limits::MIN_ASPECT_RATIO, limits::MAX_ASPECT_RATIO))
}

impl AspectLock {
    /// Ratio to enforce, if the lock is on and the ratio is usable
    pub fn active_ratio(&self) -> Option<f64> {
        if self.enabled {
            self.ratio.filter(|r| r.is_finite() && *r > 0.0)
        } else {
            None
        }
    }
}

/// Window opacity, always within `[opacity::MIN, opacity::MAX]`
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(from = "f32", into = "f32")]
pub struct Opacity(f32);

impl Opacity {
    pub fn new(value: f32) -> Self {
        if !value.is_finite() {
            return Self::default();
        }
        Self(value.clamp(opacity::MIN, opacity::MAX))
    }

    pub fn value(self) -> f32 {
        self.0
    }

    pub fn is_opaque(self) -> bool {
        self.0 >= opacity::MAX
    }
}

impl Default for Opacity {
    fn default() -> Self {
        Self(opacity::DEFAULT)
    }
}

impl From<f32> for Opacity {
    fn from(value: f32) -> Self {
        let opacity = Self::new(value);
        if opacity.0 != value {
            warn!(opacity = value, using = opacity.0, "opacity out of range, clamping");
        }
        opacity
    }
}

impl From<Opacity> for f32 {
    fn from(value: Opacity) -> Self {
        value.0
    }
}

/// Which dimension is authoritative when the aspect lock recomputes the other
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriveAxis {
    Width,
    Height,
}

/// Edges that stay put when a proposal's size gets corrected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Anchor {
    pub right: bool,
    pub bottom: bool,
}

/// A candidate geometry submitted to [`GeometryModel::propose`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Proposal {
    pub rect: Rect,
    pub drive: DriveAxis,
    pub anchor: Anchor,
}

impl Proposal {
    /// Position-only change
    pub fn moved(rect: Rect) -> Self {
        Self {
            rect,
            drive: DriveAxis::Width,
            anchor: Anchor::default(),
        }
    }

    pub fn resized(rect: Rect, drive: DriveAxis, anchor: Anchor) -> Self {
        Self { rect, drive, anchor }
    }
}

pub struct GeometryModel {
    geometry: WindowGeometry,
    aspect: AspectLock,
    opacity: Opacity,
    work_areas: Vec<Rect>,
    /// Geometry to return to when leaving the maximized state
    restore_to: Option<WindowGeometry>,
}

impl GeometryModel {
    pub fn new(geometry: WindowGeometry, aspect: AspectLock, opacity: Opacity) -> Self {
        Self {
            geometry,
            aspect,
            opacity,
            work_areas: Vec::new(),
            restore_to: None,
        }
    }

    pub fn geometry(&self) -> WindowGeometry {
        self.geometry
    }

    pub fn aspect_lock(&self) -> AspectLock {
        self.aspect
    }

    pub fn opacity(&self) -> Opacity {
        self.opacity
    }

    pub fn work_areas(&self) -> &[Rect] {
        &self.work_areas
    }

    pub fn set_work_areas(&mut self, areas: Vec<Rect>) {
        self.work_areas = areas.into_iter().filter(|a| !a.is_empty()).collect();
    }

    pub fn set_dpi_scale(&mut self, scale: f32) {
        if scale.is_finite() && scale > 0.0 {
            self.geometry.dpi_scale = scale;
        }
    }

    pub fn set_opacity(&mut self, value: f32) -> Opacity {
        self.opacity = Opacity::new(value);
        debug!(opacity = self.opacity.value(), "Opacity changed");
        self.opacity
    }

    /// Work area the rectangle's centre sits on, or the nearest one
    pub fn work_area_for(&self, rect: &Rect) -> Option<Rect> {
        let center = rect.center();
        self.work_areas
            .iter()
            .find(|area| area.contains(center))
            .or_else(|| self.work_areas.iter().min_by_key(|area| area.distance_sq(center)))
            .copied()
    }

    /// Clamp, apply the aspect lock and commit. Returns the accepted geometry.
    pub fn propose(&mut self, proposal: Proposal) -> WindowGeometry {
        let rect = proposal.rect;
        let (width, height) = self.resolve_size(&proposal);

        let x = if proposal.anchor.right {
            rect.right() - width
        } else {
            rect.x
        };
        let y = if proposal.anchor.bottom {
            rect.bottom() - height
        } else {
            rect.y
        };

        if width != rect.width || height != rect.height {
            trace!(
                proposed_width = rect.width,
                proposed_height = rect.height,
                width,
                height,
                "Clamped proposed size"
            );
        }

        self.geometry = self.geometry.with_rect(Rect::new(x, y, width, height));
        self.geometry
    }

    fn resolve_size(&self, proposal: &Proposal) -> (i32, i32) {
        let (max_width, max_height) = match self.work_area_for(&proposal.rect) {
            Some(area) => (
                area.width.max(limits::MIN_WIDTH),
                area.height.max(limits::MIN_HEIGHT),
            ),
            None => (i32::MAX, i32::MAX),
        };

        let Some(ratio) = self.aspect.active_ratio() else {
            return (
                proposal.rect.width.clamp(limits::MIN_WIDTH, max_width),
                proposal.rect.height.clamp(limits::MIN_HEIGHT, max_height),
            );
        };

        // Feasible widths under the lock; the minimums win if the work area is too small
        let lower =
            f64::from(limits::MIN_WIDTH).max((f64::from(limits::MIN_HEIGHT) * ratio).ceil());
        let upper = f64::from(max_width)
            .min((f64::from(max_height) * ratio).floor())
            .max(lower);

        let target = match proposal.drive {
            DriveAxis::Width => f64::from(proposal.rect.width),
            DriveAxis::Height => f64::from(proposal.rect.height) * ratio,
        };
        let width = target.round().clamp(lower, upper);
        let height = (width / ratio)
            .round()
            .clamp(f64::from(limits::MIN_HEIGHT), f64::from(max_height));
        (width as i32, height as i32)
    }

    /// Turn the aspect lock on or off. Enabling captures the current shape
    /// unless a ratio was already recorded.
    pub fn set_aspect_lock(&mut self, enabled: bool) -> WindowGeometry {
        self.aspect.enabled = enabled;
        if !enabled {
            info!("Aspect lock disabled");
            return self.geometry;
        }

        if self.aspect.active_ratio().is_none() {
            self.capture_aspect_ratio();
        }
        info!(ratio = ?self.aspect.ratio, "Aspect lock enabled");
        self.propose(Proposal::resized(
            self.geometry.rect(),
            DriveAxis::Width,
            Anchor::default(),
        ))
    }

    /// Record the current width/height as the locked ratio
    pub fn capture_aspect_ratio(&mut self) {
        let ratio = f64::from(self.geometry.width) / f64::from(self.geometry.height);
        self.aspect.ratio = clamp_aspect_ratio(ratio);
        debug!(ratio = ?self.aspect.ratio, "Captured aspect ratio from current geometry");
    }

    /// Startup placement: clamp the saved geometry and pull it back on screen
    /// if it no longer overlaps any work area.
    pub fn restore(&mut self) -> WindowGeometry {
        let mut rect = self.geometry.rect();
        if let Err(err) = self.geometry.validate() {
            warn!(error = %err, "Saved geometry needs correction");
        }

        if let Some(primary) = self.work_areas.first().copied()
            && !self.work_areas.iter().any(|area| area.intersects(&rect))
        {
            rect.x = primary.x + (primary.width - rect.width).max(0) / 2;
            rect.y = primary.y + (primary.height - rect.height).max(0) / 2;
            warn!(x = rect.x, y = rect.y, "Saved position is off screen, recentring");
        }

        self.propose(Proposal::resized(rect, DriveAxis::Width, Anchor::default()))
    }

    pub fn is_maximized(&self) -> bool {
        self.restore_to.is_some()
    }

    /// Forget the pre-maximize geometry; the user took over sizing manually
    pub fn clear_maximized(&mut self) {
        self.restore_to = None;
    }

    /// Fill the current work area, or go back to the geometry from before
    pub fn toggle_maximize(&mut self) -> WindowGeometry {
        if let Some(previous) = self.restore_to.take() {
            info!("Restoring from maximized");
            return self.propose(Proposal::resized(
                previous.rect(),
                DriveAxis::Width,
                Anchor::default(),
            ));
        }

        let Some(area) = self.work_area_for(&self.geometry.rect()) else {
            warn!("No work area known, cannot maximize");
            return self.geometry;
        };

        info!(?area, "Maximizing");
        self.restore_to = Some(self.geometry);
        self.propose(Proposal::resized(area, DriveAxis::Width, Anchor::default()))
    }
}
