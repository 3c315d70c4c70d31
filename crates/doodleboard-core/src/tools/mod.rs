//! Tool selection and the pointer state machine.
//!
//! [`ToolManager`] turns gesture events into [`ToolAction`]s. It owns the
//! in-progress buffer exclusively; the canvas applies the actions to the
//! drawing surface.

use crate::config::EngineConfig;
use crate::eraser::eraser_radius;
use crate::geometry::{bounding_rect, subdivide};
use crate::path::{MIN_EXTENT, Path, PathKind, SerializableColor};
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Palette offered by the color picker. The last two entries are the theme's
/// primary and accent colors.
pub const PALETTE: [SerializableColor; 9] = [
    SerializableColor::rgb(0x00, 0x00, 0x00),
    SerializableColor::rgb(0xFF, 0x00, 0x00),
    SerializableColor::rgb(0x00, 0x00, 0xFF),
    SerializableColor::rgb(0x00, 0xFF, 0x00),
    SerializableColor::rgb(0xFF, 0xFF, 0x00),
    SerializableColor::rgb(0xFF, 0xA5, 0x00),
    SerializableColor::rgb(0x80, 0x00, 0x80),
    SerializableColor::rgb(0x6C, 0x5C, 0xE7),
    SerializableColor::rgb(0xFD, 0x79, 0xA8),
];

/// Brush widths offered by the size picker.
pub const BRUSH_SIZES: [f64; 5] = [2.0, 5.0, 10.0, 15.0, 20.0];

/// Default brush width.
pub const DEFAULT_STROKE_WIDTH: f64 = 5.0;

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
    #[default]
    Pen,
    Line,
    Rectangle,
    Ellipse,
    Triangle,
    Eraser,
}

impl ToolKind {
    /// The kind of path this tool commits, if any.
    pub fn path_kind(self) -> Option<PathKind> {
        match self {
            ToolKind::Pen => Some(PathKind::Freehand),
            ToolKind::Line => Some(PathKind::Line),
            ToolKind::Rectangle => Some(PathKind::Rectangle),
            ToolKind::Ellipse => Some(PathKind::Ellipse),
            ToolKind::Triangle => Some(PathKind::Triangle),
            ToolKind::Eraser => None,
        }
    }
}

/// Current tool, color and width.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ToolSelection {
    pub tool: ToolKind,
    pub color: SerializableColor,
    pub stroke_width: f64,
}

impl Default for ToolSelection {
    fn default() -> Self {
        Self {
            tool: ToolKind::default(),
            color: SerializableColor::black(),
            stroke_width: DEFAULT_STROKE_WIDTH,
        }
    }
}

/// Gesture signals from the platform, in canvas-local coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GestureEvent {
    Start { x: f64, y: f64 },
    Move { x: f64, y: f64, timestamp_ms: u64 },
    End,
    Cancel,
}

/// What the canvas should do in response to a gesture event.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolAction {
    /// Nothing to apply to the surface.
    None,
    /// Run one eraser pass.
    Erase { at: Point, radius: f64 },
    /// Append a finished path.
    Commit(Path),
}

/// A gesture in progress.
#[derive(Debug, Clone)]
struct Gesture {
    /// Selection captured at gesture start.
    selection: ToolSelection,
    /// First point of the gesture.
    origin: Point,
    /// Last accepted point.
    anchor: Point,
    /// Points collected so far.
    buffer: Vec<Point>,
    /// Timestamp of the last accepted move.
    last_move_ms: Option<u64>,
}

/// State of the pointer state machine.
#[derive(Debug, Clone, Default)]
enum ToolState {
    #[default]
    Idle,
    Drawing(Gesture),
}

/// Read-only view of the in-progress buffer, for live rendering.
#[derive(Debug, Clone, Copy)]
pub struct InProgress<'a> {
    pub tool: ToolKind,
    pub color: SerializableColor,
    pub stroke_width: f64,
    pub points: &'a [Point],
}

/// Manages the current tool selection and the active gesture.
#[derive(Debug, Clone, Default)]
pub struct ToolManager {
    /// Selection applied to the next gesture.
    pub selection: ToolSelection,
    state: ToolState,
}

impl ToolManager {
    /// Create a new tool manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the current tool. An active gesture keeps the tool it started with.
    pub fn set_tool(&mut self, tool: ToolKind) {
        self.selection.tool = tool;
    }

    /// Set the current color.
    pub fn set_color(&mut self, color: SerializableColor) {
        self.selection.color = color;
    }

    /// Select a [`PALETTE`] entry. Returns false for an index past the end.
    pub fn pick_color(&mut self, index: usize) -> bool {
        let Some(color) = PALETTE.get(index) else {
            return false;
        };
        self.selection.color = *color;
        true
    }

    /// Select a [`BRUSH_SIZES`] entry. Returns false for an index past the end.
    pub fn pick_brush_size(&mut self, index: usize) -> bool {
        let Some(width) = BRUSH_SIZES.get(index) else {
            return false;
        };
        self.selection.stroke_width = *width;
        true
    }

    /// Set the brush width. Non-positive or non-finite widths are ignored.
    pub fn set_stroke_width(&mut self, width: f64) -> bool {
        if width.is_finite() && width > 0.0 {
            self.selection.stroke_width = width;
            true
        } else {
            false
        }
    }

    /// Check if a gesture is active.
    pub fn is_active(&self) -> bool {
        matches!(self.state, ToolState::Drawing(_))
    }

    /// The in-progress buffer, if a gesture is active.
    pub fn in_progress(&self) -> Option<InProgress<'_>> {
        match &self.state {
            ToolState::Drawing(g) => Some(InProgress {
                tool: g.selection.tool,
                color: g.selection.color,
                stroke_width: g.selection.stroke_width,
                points: &g.buffer,
            }),
            ToolState::Idle => None,
        }
    }

    /// Feed one gesture event through the state machine.
    pub fn handle(&mut self, event: GestureEvent, config: &EngineConfig) -> ToolAction {
        match event {
            GestureEvent::Start { x, y } => self.begin(Point::new(x, y), config),
            GestureEvent::Move { x, y, timestamp_ms } => {
                self.update(Point::new(x, y), timestamp_ms, config)
            }
            GestureEvent::End => self.end(),
            GestureEvent::Cancel => {
                self.cancel();
                ToolAction::None
            }
        }
    }

    /// `Idle -> Drawing`.
    pub fn begin(&mut self, point: Point, config: &EngineConfig) -> ToolAction {
        if self.is_active() || !in_bounds(point, config) {
            return ToolAction::None;
        }

        let selection = self.selection;
        self.state = ToolState::Drawing(Gesture {
            selection,
            origin: point,
            anchor: point,
            buffer: vec![point],
            last_move_ms: None,
        });

        match selection.tool {
            ToolKind::Eraser => ToolAction::Erase {
                at: point,
                radius: eraser_radius(selection.stroke_width, config.eraser_radius_multiplier),
            },
            _ => ToolAction::None,
        }
    }

    /// `Drawing -> Drawing` on an accepted move.
    pub fn update(&mut self, point: Point, timestamp_ms: u64, config: &EngineConfig) -> ToolAction {
        if !in_bounds(point, config) {
            return ToolAction::None;
        }
        let ToolState::Drawing(gesture) = &mut self.state else {
            return ToolAction::None;
        };

        let throttle = config.sampling.move_throttle_ms;
        if let Some(last) = gesture.last_move_ms {
            if timestamp_ms.saturating_sub(last) < throttle {
                return ToolAction::None;
            }
        }
        gesture.last_move_ms = Some(timestamp_ms);

        match gesture.selection.tool {
            ToolKind::Eraser => {
                gesture.buffer.push(point);
                gesture.anchor = point;
                ToolAction::Erase {
                    at: point,
                    radius: eraser_radius(
                        gesture.selection.stroke_width,
                        config.eraser_radius_multiplier,
                    ),
                }
            }
            ToolKind::Pen => {
                let filled = subdivide(gesture.anchor, point, &config.sampling);
                gesture.buffer.extend(filled);
                gesture.anchor = point;
                ToolAction::None
            }
            ToolKind::Line | ToolKind::Rectangle | ToolKind::Ellipse | ToolKind::Triangle => {
                gesture.buffer.clear();
                gesture.buffer.push(gesture.origin);
                gesture.buffer.push(point);
                ToolAction::None
            }
        }
    }

    /// `Drawing -> Idle`, committing the buffer when it forms a valid path.
    pub fn end(&mut self) -> ToolAction {
        let ToolState::Drawing(gesture) = std::mem::take(&mut self.state) else {
            return ToolAction::None;
        };

        let Some(kind) = gesture.selection.tool.path_kind() else {
            return ToolAction::None;
        };

        if is_degenerate(kind, &gesture) {
            log::debug!(
                "Discarding degenerate {:?} gesture ({} points)",
                kind,
                gesture.buffer.len()
            );
            return ToolAction::None;
        }

        match Path::new(
            kind,
            gesture.buffer,
            gesture.selection.color,
            gesture.selection.stroke_width,
        ) {
            Some(path) => ToolAction::Commit(path),
            None => ToolAction::None,
        }
    }

    /// `Drawing -> Idle` without committing.
    pub fn cancel(&mut self) {
        if self.is_active() {
            log::debug!("Gesture cancelled");
        }
        self.state = ToolState::Idle;
    }
}

fn in_bounds(point: Point, config: &EngineConfig) -> bool {
    point.x.is_finite()
        && point.y.is_finite()
        && point.x >= 0.0
        && point.y >= 0.0
        && point.x <= config.canvas_size.width
        && point.y <= config.canvas_size.height
}

/// Too few points, all points coincident, a freehand stroke anchored at the
/// origin sentinel, or a bounded shape with a zero-size box.
fn is_degenerate(kind: PathKind, gesture: &Gesture) -> bool {
    let &[first, .., last] = gesture.buffer.as_slice() else {
        return true;
    };
    if kind == PathKind::Freehand && gesture.origin == Point::ZERO {
        return true;
    }
    if kind.is_bounded() {
        let rect = bounding_rect(first, last);
        return rect.width() < MIN_EXTENT || rect.height() < MIN_EXTENT;
    }
    gesture
        .buffer
        .iter()
        .all(|p| (p.x - first.x).abs() < f64::EPSILON && (p.y - first.y).abs() < f64::EPSILON)
}
