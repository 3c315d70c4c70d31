//! Path model to drawing primitives, and the renderer trait.

use doodleboard_core::canvas::{Canvas, SurfaceSnapshot};
use doodleboard_core::config::EngineConfig;
use doodleboard_core::geometry::{angle_degrees, bounding_rect, distance};
use doodleboard_core::path::{Path, PathKind, SerializableColor};
use doodleboard_core::tools::InProgress;
use kurbo::{Affine, Point, Rect, Size};
use peniko::Color;
use thiserror::Error;

/// Segments shorter than this are not drawn.
pub const MIN_SEGMENT_LENGTH: f64 = 0.01;

pub use doodleboard_core::path::MIN_EXTENT;

/// Color of the live eraser trail.
pub const ERASER_TRAIL_COLOR: SerializableColor = SerializableColor::new(128, 128, 128, 96);

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RendererError {
    #[error("Surface error: {0}")]
    Surface(String),
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RendererError>;

/// A straight stroke piece: a rectangle anchored at `origin`, rotated so its
/// centerline runs from `origin` to the segment's end point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub origin: Point,
    pub length: f64,
    pub thickness: f64,
    /// Clockwise on screen (y grows downward).
    pub rotation_degrees: f64,
    pub color: SerializableColor,
}

impl Segment {
    /// Build the segment from `a` to `b`, or `None` if it is too short to see.
    pub fn between(a: Point, b: Point, thickness: f64, color: SerializableColor) -> Option<Self> {
        let length = distance(a, b);
        if length < MIN_SEGMENT_LENGTH {
            return None;
        }
        Some(Self {
            origin: a,
            length,
            thickness,
            rotation_degrees: angle_degrees(a, b),
            color,
        })
    }

    /// Local-to-canvas transform. Local x runs along the centerline.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.origin.to_vec2()) * Affine::rotate(self.rotation_degrees.to_radians())
    }

    /// Far end of the centerline.
    pub fn end(&self) -> Point {
        self.transform() * Point::new(self.length, 0.0)
    }

    /// Rectangle corners in canvas space, in winding order.
    pub fn corners(&self) -> [Point; 4] {
        let half = self.thickness / 2.0;
        let t = self.transform();
        [
            t * Point::new(0.0, -half),
            t * Point::new(self.length, -half),
            t * Point::new(self.length, half),
            t * Point::new(0.0, half),
        ]
    }
}

/// One visual primitive.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Segment(Segment),
    /// Unfilled axis-aligned rectangle.
    RectOutline {
        rect: Rect,
        stroke_width: f64,
        color: SerializableColor,
    },
    /// Unfilled ellipse inscribed in `rect`.
    EllipseOutline {
        rect: Rect,
        stroke_width: f64,
        color: SerializableColor,
    },
}

/// Build the primitives for the committed paths followed by the in-progress
/// buffer. Output order is draw order.
pub fn render(paths: &[Path], in_progress: Option<InProgress<'_>>) -> Vec<Primitive> {
    let mut out = Vec::new();
    for path in paths {
        push_path(&mut out, path.kind(), path.points(), path.stroke_width(), path.color());
    }

    if let Some(live) = in_progress {
        match live.tool.path_kind() {
            Some(kind) => push_path(&mut out, kind, live.points, live.stroke_width, live.color),
            None => push_path(
                &mut out,
                PathKind::Freehand,
                live.points,
                live.stroke_width,
                ERASER_TRAIL_COLOR,
            ),
        }
    }
    out
}

fn push_path(
    out: &mut Vec<Primitive>,
    kind: PathKind,
    points: &[Point],
    stroke_width: f64,
    color: SerializableColor,
) {
    if kind == PathKind::Freehand {
        out.extend(
            points
                .windows(2)
                .filter_map(|pair| Segment::between(pair[0], pair[1], stroke_width, color))
                .map(Primitive::Segment),
        );
        return;
    }

    let [a, .., b] = points else {
        return;
    };
    let (a, b) = (*a, *b);

    if kind == PathKind::Line {
        out.extend(Segment::between(a, b, stroke_width, color).map(Primitive::Segment));
        return;
    }

    let rect = bounding_rect(a, b);
    if rect.width() < MIN_EXTENT || rect.height() < MIN_EXTENT {
        return;
    }

    match kind {
        PathKind::Rectangle => out.push(Primitive::RectOutline {
            rect,
            stroke_width,
            color,
        }),
        PathKind::Ellipse => out.push(Primitive::EllipseOutline {
            rect,
            stroke_width,
            color,
        }),
        PathKind::Triangle => {
            let bottom_left = Point::new(rect.x0, rect.y1);
            let bottom_right = Point::new(rect.x1, rect.y1);
            let top_left = Point::new(rect.x0, rect.y0);
            let edges = [
                (bottom_left, bottom_right),
                (bottom_right, top_left),
                (top_left, bottom_left),
            ];
            out.extend(
                edges
                    .into_iter()
                    .filter_map(|(p, q)| Segment::between(p, q, stroke_width, color))
                    .map(Primitive::Segment),
            );
        }
        PathKind::Freehand | PathKind::Line => {}
    }
}

/// Context for a single render frame.
pub struct RenderContext<'a> {
    /// Committed paths in draw order.
    pub paths: &'a [Path],
    /// Live gesture buffer, drawn on top.
    pub in_progress: Option<InProgress<'a>>,
    /// Output size in pixels.
    pub viewport_size: Size,
    /// Canvas-to-viewport transform (display zoom and offset).
    pub view: Affine,
    /// Background color.
    pub background_color: Color,
}

impl<'a> RenderContext<'a> {
    /// Live frame of a canvas at 1:1, including the in-progress buffer.
    pub fn new(canvas: &'a Canvas) -> Self {
        Self {
            paths: canvas.surface.paths(),
            in_progress: canvas.in_progress(),
            viewport_size: canvas.size(),
            view: Affine::IDENTITY,
            background_color: canvas.config().background.into(),
        }
    }

    /// Export frame: committed paths only, canvas size, no view transform.
    pub fn for_export(snapshot: &'a SurfaceSnapshot, config: &EngineConfig) -> Self {
        Self {
            paths: &snapshot.paths,
            in_progress: None,
            viewport_size: config.canvas_size,
            view: Affine::IDENTITY,
            background_color: config.background.into(),
        }
    }

    /// Set the display transform and the viewport it maps into.
    pub fn with_view(mut self, view: Affine, viewport_size: Size) -> Self {
        self.view = view;
        self.viewport_size = viewport_size;
        self
    }

    /// Primitives for this frame.
    pub fn primitives(&self) -> Vec<Primitive> {
        render(self.paths, self.in_progress)
    }
}

/// Trait for rendering backends.
pub trait Renderer {
    /// What a finished frame looks like for this backend.
    type Frame;

    /// Draw one frame.
    fn draw(&mut self, ctx: &RenderContext<'_>) -> RenderResult<Self::Frame>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use doodleboard_core::canvas::Canvas;
    use doodleboard_core::tools::{GestureEvent, ToolKind};

    fn path(kind: PathKind, points: Vec<Point>) -> Path {
        Path::new(kind, points, SerializableColor::black(), 4.0).unwrap()
    }

    fn approx(a: Point, b: Point) -> bool {
        (a - b).hypot() < 1e-9
    }

    #[test]
    fn test_segment_centerline_passes_through_endpoints() {
        let a = Point::new(10.0, 10.0);
        let b = Point::new(13.0, 14.0);
        let seg = Segment::between(a, b, 4.0, SerializableColor::black()).unwrap();

        assert!((seg.length - 5.0).abs() < f64::EPSILON);
        assert!(approx(seg.end(), b));

        let [c0, _, _, c3] = seg.corners();
        assert!(approx(c0.midpoint(c3), a));
        assert!(((c0 - c3).hypot() - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_short_segments_skipped() {
        let p = Point::new(5.0, 5.0);
        assert!(Segment::between(p, p, 2.0, SerializableColor::black()).is_none());

        let stroke = path(
            PathKind::Freehand,
            vec![Point::new(0.0, 0.0), Point::new(0.0, 0.0), Point::new(10.0, 0.0)],
        );
        assert_eq!(render(&[stroke], None).len(), 1);
    }

    #[test]
    fn test_freehand_segment_count() {
        let stroke = path(
            PathKind::Freehand,
            vec![
                Point::new(0.0, 0.0),
                Point::new(5.0, 0.0),
                Point::new(10.0, 5.0),
                Point::new(10.0, 15.0),
            ],
        );
        let prims = render(&[stroke], None);
        assert_eq!(prims.len(), 3);
        assert!(prims.iter().all(|p| matches!(p, Primitive::Segment(_))));
    }

    #[test]
    fn test_triangle_construction() {
        let tri = path(PathKind::Triangle, vec![Point::new(40.0, 10.0), Point::new(0.0, 30.0)]);
        let prims = render(&[tri], None);

        let segments: Vec<Segment> = prims
            .into_iter()
            .map(|p| match p {
                Primitive::Segment(s) => s,
                other => panic!("unexpected primitive {:?}", other),
            })
            .collect();
        assert_eq!(segments.len(), 3);

        let bottom_left = Point::new(0.0, 30.0);
        let bottom_right = Point::new(40.0, 30.0);
        let top_left = Point::new(0.0, 10.0);
        assert!(approx(segments[0].origin, bottom_left));
        assert!(approx(segments[0].end(), bottom_right));
        assert!(approx(segments[1].end(), top_left));
        assert!(approx(segments[2].end(), bottom_left));
    }

    #[test]
    fn test_shapes_use_bounding_box() {
        let a = Point::new(50.0, 60.0);
        let b = Point::new(10.0, 20.0);
        let prims = render(
            &[path(PathKind::Rectangle, vec![a, b]), path(PathKind::Ellipse, vec![a, b])],
            None,
        );
        let expected = Rect::new(10.0, 20.0, 50.0, 60.0);
        assert!(matches!(prims[0], Primitive::RectOutline { rect, .. } if rect == expected));
        assert!(matches!(prims[1], Primitive::EllipseOutline { rect, .. } if rect == expected));
    }

    #[test]
    fn test_degenerate_shapes_skipped() {
        let flat = path(PathKind::Rectangle, vec![Point::new(0.0, 10.0), Point::new(80.0, 10.5)]);
        let thin = path(PathKind::Triangle, vec![Point::new(3.0, 0.0), Point::new(3.0, 90.0)]);
        let line = path(PathKind::Line, vec![Point::new(0.0, 10.0), Point::new(80.0, 10.0)]);

        let prims = render(&[flat, thin, line], None);
        assert_eq!(prims.len(), 1);
        assert!(matches!(prims[0], Primitive::Segment(_)));
    }

    #[test]
    fn test_render_is_idempotent() {
        let paths = vec![
            path(PathKind::Freehand, vec![Point::new(0.0, 0.0), Point::new(9.0, 3.0)]),
            path(PathKind::Ellipse, vec![Point::new(5.0, 5.0), Point::new(25.0, 45.0)]),
        ];
        assert_eq!(render(&paths, None), render(&paths, None));
    }

    #[test]
    fn test_in_progress_drawn_last() {
        let mut canvas = Canvas::new(EngineConfig::with_canvas_size(200.0, 200.0));
        canvas.handle_gesture(GestureEvent::Start { x: 10.0, y: 10.0 });
        canvas.handle_gesture(GestureEvent::Move { x: 60.0, y: 10.0, timestamp_ms: 0 });
        canvas.handle_gesture(GestureEvent::End);

        canvas.tools.set_tool(ToolKind::Rectangle);
        canvas.handle_gesture(GestureEvent::Start { x: 20.0, y: 20.0 });
        canvas.handle_gesture(GestureEvent::Move { x: 80.0, y: 90.0, timestamp_ms: 100 });

        let prims = RenderContext::new(&canvas).primitives();
        assert!(matches!(prims.first(), Some(Primitive::Segment(_))));
        assert!(matches!(prims.last(), Some(Primitive::RectOutline { .. })));
    }

    #[test]
    fn test_eraser_trail_is_translucent() {
        let mut canvas = Canvas::new(EngineConfig::with_canvas_size(200.0, 200.0));
        canvas.tools.set_tool(ToolKind::Eraser);
        canvas.handle_gesture(GestureEvent::Start { x: 10.0, y: 10.0 });
        canvas.handle_gesture(GestureEvent::Move { x: 40.0, y: 10.0, timestamp_ms: 0 });

        let prims = RenderContext::new(&canvas).primitives();
        assert_eq!(prims.len(), 1);
        match &prims[0] {
            Primitive::Segment(seg) => assert_eq!(seg.color, ERASER_TRAIL_COLOR),
            other => panic!("unexpected primitive {:?}", other),
        }
        assert!(ERASER_TRAIL_COLOR.a < 255);
    }
}
