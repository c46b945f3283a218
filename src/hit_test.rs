//! Pointer classification against the window chrome

use crate::types::{Position, Rect};

/// Region of the window under the pointer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Zone {
    TitleBar,
    Client,
    N,
    S,
    E,
    W,
    NE,
    NW,
    SE,
    SW,
    None,
}

/// Which edges of the window a zone moves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Edges {
    pub left: bool,
    pub right: bool,
    pub top: bool,
    pub bottom: bool,
}

impl Edges {
    pub const ALL: Edges = Edges {
        left: true,
        right: true,
        top: true,
        bottom: true,
    };

    pub fn horizontal(&self) -> bool {
        self.left || self.right
    }

    pub fn vertical(&self) -> bool {
        self.top || self.bottom
    }
}

impl Zone {
    pub fn is_resize(self) -> bool {
        self.edges() != Edges::default()
    }

    pub fn is_corner(self) -> bool {
        matches!(self, Zone::NE | Zone::NW | Zone::SE | Zone::SW)
    }

    /// Edges that follow the pointer during a resize from this zone
    pub fn edges(self) -> Edges {
        let (left, right, top, bottom) = match self {
            Zone::N => (false, false, true, false),
            Zone::S => (false, false, false, true),
            Zone::E => (false, true, false, false),
            Zone::W => (true, false, false, false),
            Zone::NE => (false, true, true, false),
            Zone::NW => (true, false, true, false),
            Zone::SE => (false, true, false, true),
            Zone::SW => (true, false, false, true),
            Zone::TitleBar | Zone::Client | Zone::None => (false, false, false, false),
        };
        Edges {
            left,
            right,
            top,
            bottom,
        }
    }
}

/// Classify `pointer` against the window.
///
/// Borders take priority over the title bar so the top edge stays grabbable.
/// Within a `2 * border` square at each corner the border band resolves to
/// the corner zone.
pub fn classify(pointer: Position, window: Rect, title_bar: Rect, border: i32) -> Zone {
    if !window.contains(pointer) {
        return Zone::None;
    }

    let border = border.max(0);
    let (px, py) = (pointer.x, pointer.y);

    let on_left = px < window.left() + border;
    let on_right = px >= window.right() - border;
    let on_top = py < window.top() + border;
    let on_bottom = py >= window.bottom() - border;

    if on_left || on_right || on_top || on_bottom {
        let corner = border * 2;
        let near_left = px < window.left() + corner;
        let near_right = px >= window.right() - corner;
        let near_top = py < window.top() + corner;
        let near_bottom = py >= window.bottom() - corner;

        return if near_top && near_left {
            Zone::NW
        } else if near_top && near_right {
            Zone::NE
        } else if near_bottom && near_left {
            Zone::SW
        } else if near_bottom && near_right {
            Zone::SE
        } else if on_left {
            Zone::W
        } else if on_right {
            Zone::E
        } else if on_top {
            Zone::N
        } else {
            Zone::S
        };
    }

    if title_bar.contains(pointer) {
        Zone::TitleBar
    } else {
        Zone::Client
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Rect = Rect {
        x: 100,
        y: 100,
        width: 800,
        height: 600,
    };
    const TITLE: Rect = Rect {
        x: 100,
        y: 100,
        width: 800,
        height: 32,
    };

    fn at(x: i32, y: i32) -> Zone {
        classify(Position::new(x, y), WINDOW, TITLE, 6)
    }

    #[test]
    fn test_outside_is_none() {
        assert_eq!(at(99, 300), Zone::None);
        assert_eq!(at(900, 300), Zone::None);
        assert_eq!(at(500, 700), Zone::None);
    }

    #[test]
    fn test_edges() {
        assert_eq!(at(100, 400), Zone::W);
        assert_eq!(at(899, 400), Zone::E);
        assert_eq!(at(500, 100), Zone::N);
        assert_eq!(at(500, 699), Zone::S);
    }

    #[test]
    fn test_corners_cover_double_border_square() {
        assert_eq!(at(100, 100), Zone::NW);
        // On the top band but 11px in from the left: still inside the 12px corner square
        assert_eq!(at(111, 101), Zone::NW);
        assert_eq!(at(112, 101), Zone::N);
        assert_eq!(at(899, 100), Zone::NE);
        assert_eq!(at(101, 689), Zone::SW);
        assert_eq!(at(898, 695), Zone::SE);
    }

    #[test]
    fn test_corner_square_interior_is_not_border() {
        // Inside the corner square but off the border band
        assert_eq!(at(108, 108), Zone::TitleBar);
        assert_eq!(at(108, 690), Zone::Client);
    }

    #[test]
    fn test_title_bar_below_border() {
        assert_eq!(at(500, 110), Zone::TitleBar);
        assert_eq!(at(500, 131), Zone::TitleBar);
        assert_eq!(at(500, 132), Zone::Client);
    }

    #[test]
    fn test_classify_is_total() {
        for y in (WINDOW.top()..WINDOW.bottom()).step_by(3) {
            for x in (WINDOW.left()..WINDOW.right()).step_by(3) {
                assert_ne!(at(x, y), Zone::None, "({x}, {y}) inside but unclassified");
            }
        }
    }

    #[test]
    fn test_zone_edges() {
        assert!(Zone::SE.edges().right && Zone::SE.edges().bottom);
        assert!(!Zone::E.edges().vertical());
        assert!(!Zone::TitleBar.is_resize());
        assert!(Zone::NW.is_corner());
    }
}
