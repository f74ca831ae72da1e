//! Pure geometric classification of a pointer over a live block.
//!
//! One function serves both the drag-over preview and the drag-end commit,
//! so the highlight a user sees and the edit that lands can never diverge.

use serde::{Deserialize, Serialize};

use crate::geometry::TargetRect;

/// Fraction of the target's height that counts as an edge band.
const EDGE_FRACTION: f64 = 0.3;
/// Edge bands never grow past this, even on tall containers.
const EDGE_MAX_PX: f64 = 30.0;

/// How a drop relates to the candidate target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Placement {
    /// Insert as a sibling before the target.
    Before,
    /// Insert as a sibling after the target.
    After,
    /// Nest as the target's last child.
    Inside,
}

impl Placement {
    /// Rectangle to highlight while hovering: a line at the crossed edge for
    /// sibling placements, the whole target for nesting.
    pub fn indicator(self, rect: TargetRect) -> TargetRect {
        match self {
            Placement::Before => TargetRect::new(rect.top, rect.top),
            Placement::After => TargetRect::new(rect.bottom, rect.bottom),
            Placement::Inside => rect,
        }
    }
}

pub fn edge_threshold(height: f64) -> f64 {
    (EDGE_FRACTION * height).min(EDGE_MAX_PX)
}

/// Classify a pointer position against a live block's rectangle.
///
/// Targets that cannot nest fall back to whichever edge is nearer instead of
/// `Inside`.
pub fn classify_drop(pointer_y: f64, rect: TargetRect, can_nest: bool) -> Placement {
    let threshold = edge_threshold(rect.height());
    let dist_top = (pointer_y - rect.top).abs();
    let dist_bottom = (pointer_y - rect.bottom).abs();

    if dist_top < threshold {
        Placement::Before
    } else if dist_bottom < threshold {
        Placement::After
    } else if can_nest {
        Placement::Inside
    } else if dist_top <= dist_bottom {
        Placement::Before
    } else {
        Placement::After
    }
}
