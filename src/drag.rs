//! Title-bar drag to move the window

use tracing::{debug, info};

use crate::geometry::{GeometryModel, Proposal, WindowGeometry};
use crate::snapping::{SnapContext, SnapMode};
use crate::types::{Position, Rect};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MoveState {
    Idle,
    Moving {
        origin: Position,
        anchor: WindowGeometry,
    },
}

#[derive(Debug)]
pub struct MoveController {
    state: MoveState,
}

impl Default for MoveController {
    fn default() -> Self {
        Self::new()
    }
}

impl MoveController {
    pub fn new() -> Self {
        Self {
            state: MoveState::Idle,
        }
    }

    pub fn state(&self) -> MoveState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, MoveState::Moving { .. })
    }

    pub fn begin(&mut self, pointer: Position, anchor: WindowGeometry) {
        debug!(x = pointer.x, y = pointer.y, "Move started");
        self.state = MoveState::Moving {
            origin: pointer,
            anchor,
        };
    }

    pub fn update(
        &mut self,
        pointer: Position,
        model: &mut GeometryModel,
        snap: &SnapContext<'_>,
    ) -> Option<WindowGeometry> {
        let MoveState::Moving { origin, anchor } = self.state else {
            return None;
        };
        let (dx, dy) = pointer.delta_from(origin);
        let proposed = Rect {
            x: anchor.x + dx,
            y: anchor.y + dy,
            ..anchor.rect()
        };
        let snapped = snap.adjust(proposed, SnapMode::Move);
        Some(model.propose(Proposal::moved(snapped)))
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
        self.state = MoveState::Idle;
        let geometry = model.geometry();
        info!(x = geometry.x, y = geometry.y, "Move finished");
        Some(geometry)
    }

    pub fn cancel(&mut self, model: &GeometryModel) -> Option<WindowGeometry> {
        if !self.is_active() {
            return None;
        }
        self.state = MoveState::Idle;
        debug!("Move cancelled");
        Some(model.geometry())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{AspectLock, Opacity};
    use crate::snapping::SnapConfig;

    fn model(geometry: WindowGeometry) -> GeometryModel {
        GeometryModel::new(geometry, AspectLock::default(), Opacity::default())
    }

    #[test]
    fn test_move_translates_by_delta() {
        let cfg = SnapConfig::default();
        let snap = SnapContext { screens: &[], others: &[], config: &cfg };
        let mut model = model(WindowGeometry::new(100, 100, 500, 720));
        let mut mover = MoveController::new();
        mover.begin(Position::new(150, 110), model.geometry());
        let g = mover.update(Position::new(190, 60), &mut model, &snap).unwrap();
        assert_eq!((g.x, g.y, g.width, g.height), (140, 50, 500, 720));
    }

    #[test]
    fn test_move_near_right_screen_edge_snaps() {
        let cfg = SnapConfig::default();
        let screens = [Rect::new(0, 0, 1920, 1040)];
        let snap = SnapContext { screens: &screens, others: &[], config: &cfg };
        let mut model = model(WindowGeometry::new(100, 100, 500, 720));
        let mut mover = MoveController::new();
        mover.begin(Position::new(300, 110), model.geometry());
        // Drop the window 5px short of the right edge
        let end = Position::new(300 + (1920 - 500 - 5 - 100), 110);
        let g = mover.finish(Some(end), &mut model, &snap).unwrap();
        assert_eq!(g.x + g.width, 1920);
        assert!(!mover.is_active());
    }

    #[test]
    fn test_cancel_returns_to_idle() {
        let model = model(WindowGeometry::default());
        let mut mover = MoveController::new();
        assert_eq!(mover.cancel(&model), None);
        mover.begin(Position::new(0, 0), model.geometry());
        assert_eq!(mover.cancel(&model), Some(model.geometry()));
        assert_eq!(mover.state(), MoveState::Idle);
    }
}
