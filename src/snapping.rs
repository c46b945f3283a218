use serde::{Deserialize, Serialize};

use crate::constants::geometry::{MIN_HEIGHT, MIN_WIDTH};
use crate::constants::snapping::DEFAULT_THRESHOLD;
use crate::hit_test::Edges;
use crate::types::Rect;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapConfig {
    #[serde(default = "default_true")]
    pub screen_edges: bool,
    #[serde(default)]
    pub other_windows: bool,
    #[serde(default = "default_threshold")]
    pub threshold_px: i32,
}

fn default_true() -> bool {
    true
}

fn default_threshold() -> i32 {
    DEFAULT_THRESHOLD
}

impl Default for SnapConfig {
    fn default() -> Self {
        Self {
            screen_edges: true,
            other_windows: false,
            threshold_px: DEFAULT_THRESHOLD,
        }
    }
}

/// How the snapped rectangle may change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapMode {
    /// Translate only, size preserved
    Move,
    /// Only the given edges move, independently
    Resize(Edges),
}

/// Where a target edge came from. Ordered so screens win exact ties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum SnapSource {
    Screen,
    Window,
}

#[derive(Debug, Clone, Copy)]
struct SnapCandidate {
    offset: i32,
    distance: i32,
    source: SnapSource,
}

impl SnapCandidate {
    fn beats(&self, other: &SnapCandidate) -> bool {
        (self.distance, self.source) < (other.distance, other.source)
    }
}

type Target = (i32, SnapSource);

/// Target edge coordinates for each side of the window
#[derive(Debug, Default)]
struct Targets {
    left: Vec<Target>,
    right: Vec<Target>,
    top: Vec<Target>,
    bottom: Vec<Target>,
}

/// Candidate edges gathered at the start of a drag gesture
#[derive(Debug, Clone, Copy)]
pub struct SnapContext<'a> {
    pub screens: &'a [Rect],
    pub others: &'a [Rect],
    pub config: &'a SnapConfig,
}

impl SnapContext<'_> {
    pub fn adjust(&self, proposed: Rect, mode: SnapMode) -> Rect {
        adjust(proposed, mode, self.screens, self.others, self.config)
    }
}

/// Upper bound on re-snapping passes in [`adjust`]
const MAX_PASSES: usize = 4;

/// Snap `proposed` to screen work-area edges and other windows' edges.
///
/// The closest candidate on each axis wins; at equal distance a screen edge
/// beats a window edge, whichever side of the window it sits on. A snap on one
/// axis can change which windows overlap on the other, so passes repeat until
/// the result is stable.
pub fn adjust(
    proposed: Rect,
    mode: SnapMode,
    screens: &[Rect],
    others: &[Rect],
    config: &SnapConfig,
) -> Rect {
    if config.threshold_px <= 0 {
        return proposed; // Snapping disabled
    }

    let mut current = proposed;
    for _ in 0..MAX_PASSES {
        let next = adjust_once(current, mode, screens, others, config);
        if next == current {
            break;
        }
        current = next;
    }
    current
}

fn adjust_once(
    proposed: Rect,
    mode: SnapMode,
    screens: &[Rect],
    others: &[Rect],
    config: &SnapConfig,
) -> Rect {
    let threshold = config.threshold_px;
    let targets = collect_targets(proposed, screens, others, config);

    match mode {
        SnapMode::Move => {
            let mut best_x: Option<SnapCandidate> = None;
            let mut best_y: Option<SnapCandidate> = None;
            for &target in &targets.left {
                check_snap(&mut best_x, proposed.left(), target, threshold);
            }
            for &target in &targets.right {
                check_snap(&mut best_x, proposed.right(), target, threshold);
            }
            for &target in &targets.top {
                check_snap(&mut best_y, proposed.top(), target, threshold);
            }
            for &target in &targets.bottom {
                check_snap(&mut best_y, proposed.bottom(), target, threshold);
            }

            Rect {
                x: proposed.x + best_x.map_or(0, |s| s.offset),
                y: proposed.y + best_y.map_or(0, |s| s.offset),
                ..proposed
            }
        }
        SnapMode::Resize(edges) => {
            let pick = |active: bool, edge: i32, targets: &[Target]| {
                let mut best = None;
                if active {
                    for &target in targets {
                        check_snap(&mut best, edge, target, threshold);
                    }
                }
                best
            };

            let (left, right) = keep_feasible(
                pick(edges.left, proposed.left(), &targets.left),
                pick(edges.right, proposed.right(), &targets.right),
                proposed.width,
                MIN_WIDTH,
            );
            let (top, bottom) = keep_feasible(
                pick(edges.top, proposed.top(), &targets.top),
                pick(edges.bottom, proposed.bottom(), &targets.bottom),
                proposed.height,
                MIN_HEIGHT,
            );

            Rect::from_edges(
                proposed.left() + left.map_or(0, |s| s.offset),
                proposed.top() + top.map_or(0, |s| s.offset),
                proposed.right() + right.map_or(0, |s| s.offset),
                proposed.bottom() + bottom.map_or(0, |s| s.offset),
            )
        }
    }
}

/// Drop one of two opposite snaps if applying both would take the span
/// below `min`. The closer snap survives.
fn keep_feasible(
    low: Option<SnapCandidate>,
    high: Option<SnapCandidate>,
    span: i32,
    min: i32,
) -> (Option<SnapCandidate>, Option<SnapCandidate>) {
    match (low, high) {
        (Some(l), Some(h)) if span - l.offset + h.offset < min => {
            if l.distance <= h.distance {
                (Some(l), None)
            } else {
                (None, Some(h))
            }
        }
        pair => pair,
    }
}

fn collect_targets(
    proposed: Rect,
    screens: &[Rect],
    others: &[Rect],
    config: &SnapConfig,
) -> Targets {
    let mut targets = Targets::default();
    let threshold = config.threshold_px;

    if config.screen_edges {
        for screen in screens {
            // Keep the window inside the work area
            targets.left.push((screen.left(), SnapSource::Screen));
            targets.right.push((screen.right(), SnapSource::Screen));
            targets.top.push((screen.top(), SnapSource::Screen));
            targets.bottom.push((screen.bottom(), SnapSource::Screen));
        }
    }

    if config.other_windows {
        for other in others {
            // Only windows we could actually sit beside on that axis
            let beside_y = (proposed.top(), proposed.bottom(), other.top(), other.bottom());
            if spans_overlap(beside_y, threshold) {
                // Snap left edge to right edge of other, or align left edges
                targets.left.extend(window_edges(other.right(), other.left()));
                // Snap right edge to left edge of other, or align right edges
                targets.right.extend(window_edges(other.left(), other.right()));
            }
            let beside_x = (proposed.left(), proposed.right(), other.left(), other.right());
            if spans_overlap(beside_x, threshold) {
                targets.top.extend(window_edges(other.bottom(), other.top()));
                targets.bottom.extend(window_edges(other.top(), other.bottom()));
            }
        }
    }

    targets
}

fn window_edges(beside: i32, aligned: i32) -> [Target; 2] {
    [(beside, SnapSource::Window), (aligned, SnapSource::Window)]
}

/// `(a_start, a_end, b_start, b_end)` overlap, allowing `slack` on either side
fn spans_overlap((a_start, a_end, b_start, b_end): (i32, i32, i32, i32), slack: i32) -> bool {
    a_start < b_end + slack && b_start - slack < a_end
}

fn check_snap(best: &mut Option<SnapCandidate>, edge: i32, target: Target, threshold: i32) {
    let (target, source) = target;
    let distance = (edge - target).abs();
    if distance <= threshold {
        let candidate = SnapCandidate {
            offset: target - edge,
            distance,
            source,
        };

        if best.as_ref().is_none_or(|b| candidate.beats(b)) {
            *best = Some(candidate);
        }
    }
}
