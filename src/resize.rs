//! Live resize from a border or corner zone
//!
//! `Idle -> Resizing(zone, anchor) -> Idle`. Every pointer move is computed
//! relative to the geometry captured at pointer-down, so dropped motion events
//! never accumulate error.

use tracing::{debug, info};

use crate::geometry::{Anchor, DriveAxis, GeometryModel, Proposal, WindowGeometry};
use crate::hit_test::Zone;
use crate::snapping::{SnapContext, SnapMode};
use crate::types::{Position, Rect};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResizeState {
    Idle,
    Resizing {
        zone: Zone,
        anchor: WindowGeometry,
        origin: Position,
    },
}

#[derive(Debug)]
pub struct ResizeController {
    state: ResizeState,
}

impl Default for ResizeController {
    fn default() -> Self {
        Self::new()
    }
}

impl ResizeController {
    pub fn new() -> Self {
        Self {
            state: ResizeState::Idle,
        }
    }

    pub fn state(&self) -> ResizeState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, ResizeState::Resizing { .. })
    }

    /// Start resizing. Returns false (and stays idle) for non-border zones.
    pub fn begin(&mut self, zone: Zone, pointer: Position, anchor: WindowGeometry) -> bool {
        if !zone.is_resize() {
            return false;
        }
        info!(?zone, x = pointer.x, y = pointer.y, "Resize started");
        self.state = ResizeState::Resizing {
            zone,
            anchor,
            origin: pointer,
        };
        true
    }

    /// Apply the current pointer position. Returns the accepted geometry.
    pub fn update(
        &mut self,
        pointer: Position,
        model: &mut GeometryModel,
        snap: &SnapContext<'_>,
    ) -> Option<WindowGeometry> {
        let ResizeState::Resizing { zone, anchor, origin } = self.state else {
            return None;
        };
        let (dx, dy) = pointer.delta_from(origin);
        Some(model.propose(resize_proposal(zone, anchor.rect(), dx, dy, snap)))
    }

    /// Pointer released: commit and go idle. The caller schedules a save.
    pub fn finish(
        &mut self,
        pointer: Option<Position>,
        model: &mut GeometryModel,
        snap: &SnapContext<'_>,
    ) -> Option<WindowGeometry> {
        if !self.is_active() {
            return None;
        }
        if let Some(pointer) = pointer {
            self.update(pointer, model, snap);
        }
        self.state = ResizeState::Idle;
        let geometry = model.geometry();
        info!(
            x = geometry.x,
            y = geometry.y,
            width = geometry.width,
            height = geometry.height,
            "Resize finished"
        );
        Some(geometry)
    }

    /// Focus or capture lost: go idle keeping the last accepted geometry
    pub fn cancel(&mut self, model: &GeometryModel) -> Option<WindowGeometry> {
        if !self.is_active() {
            return None;
        }
        self.state = ResizeState::Idle;
        debug!("Resize cancelled");
        Some(model.geometry())
    }
}

fn resize_proposal(zone: Zone, anchor: Rect, dx: i32, dy: i32, snap: &SnapContext<'_>) -> Proposal {
    let edges = zone.edges();
    let left = anchor.left() + if edges.left { dx } else { 0 };
    let right = anchor.right() + if edges.right { dx } else { 0 };
    let top = anchor.top() + if edges.top { dy } else { 0 };
    let bottom = anchor.bottom() + if edges.bottom { dy } else { 0 };

    let snapped = snap.adjust(
        Rect::from_edges(left, top, right, bottom),
        SnapMode::Resize(edges),
    );

    // Corners follow the dominant drag direction; width wins ties
    let drive = if zone.is_corner() {
        if dy.abs() > dx.abs() {
            DriveAxis::Height
        } else {
            DriveAxis::Width
        }
    } else if edges.horizontal() {
        DriveAxis::Width
    } else {
        DriveAxis::Height
    };

    Proposal::resized(
        snapped,
        drive,
        Anchor {
            right: edges.left,
            bottom: edges.top,
        },
    )
}
