//! Geometry and stroke smoothing helpers.
//!
//! Everything here is a pure function over canvas-local coordinates.

use crate::config::{MAX_SUBDIVISION_STEPS, SamplingProfile};
use kurbo::{Point, Rect};

/// Euclidean distance between two points.
pub fn distance(a: Point, b: Point) -> f64 {
    ((b.x - a.x).powi(2) + (b.y - a.y).powi(2)).sqrt()
}

/// Linear interpolation from `a` to `b`. `t` is clamped to `[0, 1]`.
pub fn lerp(a: Point, b: Point, t: f64) -> Point {
    let t = t.clamp(0.0, 1.0);
    Point::new(a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t)
}

/// Angle of the vector `a -> b` in degrees, in y-down canvas space.
///
/// `0` points right, `90` points down.
pub fn angle_degrees(a: Point, b: Point) -> f64 {
    (b.y - a.y).atan2(b.x - a.x).to_degrees()
}

/// Fill the gap between two consecutive raw samples.
///
/// Returns the points to append after `p1`. Near-stationary input (closer
/// than `min_sample_distance`) yields just `p2`. Otherwise up to
/// `max_subdivision_steps` evenly spaced interior points are emitted,
/// followed by `p2`, which is always the exact last element. The step count
/// never exceeds [`MAX_SUBDIVISION_STEPS`], whatever the profile says.
pub fn subdivide(p1: Point, p2: Point, profile: &SamplingProfile) -> Vec<Point> {
    let dist = distance(p1, p2);
    if dist < profile.min_sample_distance || !(profile.step_size > 0.0) {
        return vec![p2];
    }

    let steps = ((dist / profile.step_size).floor() as usize)
        .min(profile.max_subdivision_steps)
        .min(MAX_SUBDIVISION_STEPS);
    let mut points = Vec::with_capacity(steps.saturating_add(1));
    for i in 1..=steps {
        let t = i as f64 / steps.saturating_add(1) as f64;
        points.push(lerp(p1, p2, t));
    }
    points.push(p2);
    points
}

/// Axis-aligned box spanned by two control points.
pub fn bounding_rect(a: Point, b: Point) -> Rect {
    Rect::from_points(a, b)
}
