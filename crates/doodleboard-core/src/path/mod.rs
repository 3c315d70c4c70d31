//! Path model: one committed stroke or shape.

mod color;

pub use color::{ColorParseError, SerializableColor};

use crate::geometry::bounding_rect;
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for committed paths.
pub type PathId = Uuid;

/// Minimum number of points a committed path carries.
pub const MIN_PATH_POINTS: usize = 2;

/// Rectangles, ellipses and triangles narrower or flatter than this are
/// neither committed nor drawn.
pub const MIN_EXTENT: f64 = 1.0;

/// How a path's points are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PathKind {
    /// Full polyline through every point.
    Freehand,
    /// Segment between the two control points.
    Line,
    /// Outline of the control points' bounding box.
    Rectangle,
    /// Ellipse inscribed in the control points' bounding box.
    Ellipse,
    /// Right triangle inside the control points' bounding box.
    Triangle,
}

impl PathKind {
    /// Shapes are defined by exactly two control points.
    pub fn is_shape(self) -> bool {
        !matches!(self, PathKind::Freehand)
    }

    /// Shapes drawn inside their control points' bounding box.
    pub fn is_bounded(self) -> bool {
        matches!(self, PathKind::Rectangle | PathKind::Ellipse | PathKind::Triangle)
    }
}

/// A committed stroke or shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Path {
    pub(crate) id: PathId,
    pub(crate) kind: PathKind,
    pub(crate) points: Vec<Point>,
    pub(crate) color: SerializableColor,
    pub(crate) stroke_width: f64,
}

impl Path {
    /// Build a path with a fresh id.
    ///
    /// Returns `None` when the points cannot form a valid path: fewer than
    /// two points, a shape without exactly two control points, or a
    /// non-positive width.
    pub fn new(
        kind: PathKind,
        points: Vec<Point>,
        color: SerializableColor,
        stroke_width: f64,
    ) -> Option<Self> {
        let path = Self {
            id: Uuid::new_v4(),
            kind,
            points,
            color,
            stroke_width,
        };
        path.is_valid().then_some(path)
    }

    pub fn id(&self) -> PathId {
        self.id
    }

    pub fn kind(&self) -> PathKind {
        self.kind
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn color(&self) -> SerializableColor {
        self.color
    }

    pub fn stroke_width(&self) -> f64 {
        self.stroke_width
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false for a valid path; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Structural validity of a committed path.
    pub fn is_valid(&self) -> bool {
        let points_ok = match self.kind {
            PathKind::Freehand => self.points.len() >= MIN_PATH_POINTS,
            _ => self.points.len() == MIN_PATH_POINTS,
        };
        points_ok
            && self.stroke_width.is_finite()
            && self.stroke_width > 0.0
            && self.points.iter().all(|p| p.x.is_finite() && p.y.is_finite())
    }

    /// Bounding box of the points (not inflated by stroke width).
    pub fn bounds(&self) -> Rect {
        let Some(first) = self.points.first() else {
            return Rect::ZERO;
        };
        self.points
            .iter()
            .skip(1)
            .fold(bounding_rect(*first, *first), |acc, p| acc.union_pt(*p))
    }

    /// Replace the points of a freehand path.
    ///
    /// The caller guarantees the new set keeps at least two points.
    pub(crate) fn set_points(&mut self, points: Vec<Point>) {
        debug_assert!(points.len() >= MIN_PATH_POINTS);
        self.points = points;
    }
}

/// Total number of points across paths.
pub fn point_count<'a>(paths: impl IntoIterator<Item = &'a Path>) -> usize {
    paths.into_iter().map(Path::len).sum()
}
