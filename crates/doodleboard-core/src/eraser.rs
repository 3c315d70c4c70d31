//! Eraser engine.
//!
//! Shapes are atomic: touching any control point removes the whole shape.
//! Freehand strokes lose only the points under the eraser. The surviving
//! points stay connected in their original order, so erasing an interior
//! chunk bridges the gap with a straight segment instead of splitting the
//! stroke in two.

use crate::geometry::distance;
use crate::path::{MIN_PATH_POINTS, Path, PathId, PathKind};
use kurbo::Point;

/// Outcome of one eraser pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EraseReport {
    /// Paths that lost points but survived.
    pub trimmed: Vec<PathId>,
    /// Paths removed entirely.
    pub removed: Vec<PathId>,
}

impl EraseReport {
    /// Whether the pass changed anything.
    pub fn is_empty(&self) -> bool {
        self.trimmed.is_empty() && self.removed.is_empty()
    }
}

/// Eraser radius for a brush width.
pub fn eraser_radius(stroke_width: f64, multiplier: f64) -> f64 {
    stroke_width * multiplier
}

/// Whether an eraser pass at `point` would change anything.
pub fn touches(paths: &[Path], point: Point, radius: f64) -> bool {
    paths
        .iter()
        .any(|path| path.points.iter().any(|p| distance(*p, point) < radius))
}

/// Erase everything within `radius` of `point`.
pub fn erase_near(paths: &mut Vec<Path>, point: Point, radius: f64) -> EraseReport {
    let mut report = EraseReport::default();
    let within = |p: &Point| distance(*p, point) < radius;

    paths.retain_mut(|path| match path.kind {
        PathKind::Freehand => {
            if !path.points.iter().any(within) {
                return true;
            }
            let kept: Vec<Point> = path.points.iter().copied().filter(|p| !within(p)).collect();
            if kept.len() >= MIN_PATH_POINTS {
                path.set_points(kept);
                report.trimmed.push(path.id);
                true
            } else {
                report.removed.push(path.id);
                false
            }
        }
        PathKind::Line | PathKind::Rectangle | PathKind::Ellipse | PathKind::Triangle => {
            if path.points.iter().any(within) {
                report.removed.push(path.id);
                false
            } else {
                true
            }
        }
    });

    if !report.is_empty() {
        log::debug!(
            "Eraser at ({:.1}, {:.1}) r={:.1}: {} trimmed, {} removed",
            point.x,
            point.y,
            radius,
            report.trimmed.len(),
            report.removed.len()
        );
    }
    report
}
