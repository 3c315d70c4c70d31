//! Drawing surface and canvas state management.

use crate::config::EngineConfig;
use crate::eraser::{self, EraseReport};
use crate::path::{Path, PathId, point_count};
use crate::tools::{GestureEvent, InProgress, ToolAction, ToolManager};
use kurbo::{Point, Rect, Size};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum number of undo states to keep.
const MAX_UNDO_HISTORY: usize = 50;

/// An owned copy of the committed paths at one instant.
///
/// Used for undo and as the input of exports, which must not observe
/// mutations made after they were requested.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SurfaceSnapshot {
    /// Committed paths in draw order.
    pub paths: Vec<Path>,
}

impl SurfaceSnapshot {
    /// Check if the snapshot has no paths.
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

/// The ordered set of committed paths (back to front).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrawingSurface {
    /// Unique surface identifier.
    pub id: String,
    /// Committed paths; later entries are drawn on top.
    paths: Vec<Path>,
    /// Undo history stack.
    #[serde(skip)]
    undo_stack: Vec<SurfaceSnapshot>,
    /// Redo history stack.
    #[serde(skip)]
    redo_stack: Vec<SurfaceSnapshot>,
}

impl Default for DrawingSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl DrawingSurface {
    /// Create a new empty surface.
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            paths: Vec::new(),
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
        }
    }

    /// Copy the committed paths.
    pub fn snapshot(&self) -> SurfaceSnapshot {
        SurfaceSnapshot {
            paths: self.paths.clone(),
        }
    }

    /// Push current state to undo stack (call before making changes).
    pub fn push_undo(&mut self) {
        let snapshot = self.snapshot();
        self.undo_stack.push(snapshot);

        // New changes invalidate anything that was undone.
        self.redo_stack.clear();

        if self.undo_stack.len() > MAX_UNDO_HISTORY {
            self.undo_stack.remove(0);
        }
    }

    /// Undo the last change.
    /// Returns true if undo was performed, false if nothing to undo.
    pub fn undo(&mut self) -> bool {
        match self.undo_stack.pop() {
            Some(snapshot) => {
                let current = self.snapshot();
                self.redo_stack.push(current);
                self.paths = snapshot.paths;
                true
            }
            None => false,
        }
    }

    /// Redo the last undone change.
    /// Returns true if redo was performed, false if nothing to redo.
    pub fn redo(&mut self) -> bool {
        match self.redo_stack.pop() {
            Some(snapshot) => {
                let current = self.snapshot();
                self.undo_stack.push(current);
                self.paths = snapshot.paths;
                true
            }
            None => false,
        }
    }

    /// Check if undo is available.
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Check if redo is available.
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Append a path on top of the others.
    pub fn add_path(&mut self, path: Path) {
        self.paths.push(path);
    }

    /// Remove a path by id.
    pub fn remove_path(&mut self, id: PathId) -> Option<Path> {
        let index = self.paths.iter().position(|p| p.id() == id)?;
        Some(self.paths.remove(index))
    }

    /// Remove all paths.
    pub fn clear(&mut self) {
        self.paths.clear();
    }

    /// Get a path by id.
    pub fn get_path(&self, id: PathId) -> Option<&Path> {
        self.paths.iter().find(|p| p.id() == id)
    }

    /// Paths in draw order (back to front).
    pub fn paths(&self) -> &[Path] {
        &self.paths
    }

    /// Run one eraser pass.
    pub fn erase_near(&mut self, point: Point, radius: f64) -> EraseReport {
        eraser::erase_near(&mut self.paths, point, radius)
    }

    /// Whether an eraser pass at `point` would change anything.
    pub fn touches(&self, point: Point, radius: f64) -> bool {
        eraser::touches(&self.paths, point, radius)
    }

    /// Bounding box of all paths.
    pub fn bounds(&self) -> Option<Rect> {
        self.paths
            .iter()
            .map(Path::bounds)
            .reduce(|acc, b| acc.union(b))
    }

    /// Check if the surface is empty.
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Get the number of paths.
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Total number of points across all paths.
    pub fn point_count(&self) -> usize {
        point_count(&self.paths)
    }

    /// Serialize the surface to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize a surface from JSON.
    ///
    /// Paths that break the model invariants are dropped.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut surface: Self = serde_json::from_str(json)?;
        let before = surface.paths.len();
        surface.paths.retain(Path::is_valid);
        if surface.paths.len() != before {
            log::warn!(
                "Dropped {} invalid paths while loading surface {}",
                before - surface.paths.len(),
                surface.id
            );
        }
        Ok(surface)
    }
}

/// What a gesture event did to the surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceChange {
    /// The surface is unchanged.
    None,
    /// A new path was committed.
    Committed(PathId),
    /// An eraser pass trimmed or removed paths.
    Erased(EraseReport),
}

/// The main canvas state: surface, tools and configuration.
#[derive(Debug, Clone)]
pub struct Canvas {
    /// Committed paths.
    pub surface: DrawingSurface,
    /// Tool selection and active gesture.
    pub tools: ToolManager,
    /// Engine configuration.
    config: EngineConfig,
    /// Whether the current eraser gesture already recorded an undo step.
    erase_checkpointed: bool,
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl Canvas {
    /// Create a canvas with an empty surface.
    pub fn new(config: EngineConfig) -> Self {
        Self::with_surface(config, DrawingSurface::new())
    }

    /// Create a canvas around an existing surface.
    pub fn with_surface(config: EngineConfig, surface: DrawingSurface) -> Self {
        Self {
            surface,
            tools: ToolManager::new(),
            config,
            erase_checkpointed: false,
        }
    }

    /// Engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Canvas size in pixels.
    pub fn size(&self) -> Size {
        self.config.canvas_size
    }

    /// Feed one gesture event and apply the result to the surface.
    pub fn handle_gesture(&mut self, event: GestureEvent) -> SurfaceChange {
        if matches!(event, GestureEvent::Start { .. }) && !self.tools.is_active() {
            self.erase_checkpointed = false;
        }

        match self.tools.handle(event, &self.config) {
            ToolAction::None => SurfaceChange::None,
            ToolAction::Erase { at, radius } => {
                if !self.surface.touches(at, radius) {
                    return SurfaceChange::None;
                }
                // One undo step per eraser gesture.
                if !self.erase_checkpointed {
                    self.surface.push_undo();
                    self.erase_checkpointed = true;
                }
                SurfaceChange::Erased(self.surface.erase_near(at, radius))
            }
            ToolAction::Commit(path) => {
                let id = path.id();
                log::debug!(
                    "Committed {:?} path {} with {} points",
                    path.kind(),
                    id,
                    path.len()
                );
                self.surface.push_undo();
                self.surface.add_path(path);
                SurfaceChange::Committed(id)
            }
        }
    }

    /// The in-progress buffer, if a gesture is active.
    pub fn in_progress(&self) -> Option<InProgress<'_>> {
        self.tools.in_progress()
    }

    /// Undo the last change.
    pub fn undo(&mut self) -> bool {
        self.surface.undo()
    }

    /// Redo the last undone change.
    pub fn redo(&mut self) -> bool {
        self.surface.redo()
    }

    /// Remove every path (undoable). An active gesture is unaffected.
    pub fn clear(&mut self) {
        if self.surface.is_empty() {
            return;
        }
        self.surface.push_undo();
        self.surface.clear();
        log::info!("Canvas cleared");
    }

    /// Copy the committed paths for export.
    pub fn snapshot(&self) -> SurfaceSnapshot {
        self.surface.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::{PathKind, SerializableColor};
    use crate::tools::ToolKind;

    fn start(x: f64, y: f64) -> GestureEvent {
        GestureEvent::Start { x, y }
    }

    fn mv(x: f64, y: f64, timestamp_ms: u64) -> GestureEvent {
        GestureEvent::Move { x, y, timestamp_ms }
    }

    fn draw(canvas: &mut Canvas, from: (f64, f64), to: (f64, f64)) -> SurfaceChange {
        canvas.handle_gesture(start(from.0, from.1));
        canvas.handle_gesture(mv(to.0, to.1, 100));
        canvas.handle_gesture(GestureEvent::End)
    }

    fn freehand(raw: &[(f64, f64)]) -> Path {
        let points = raw.iter().map(|&(x, y)| Point::new(x, y)).collect();
        Path::new(PathKind::Freehand, points, SerializableColor::black(), 2.0).unwrap()
    }

    #[test]
    fn test_surface_creation() {
        let surface = DrawingSurface::new();
        assert!(surface.is_empty());
        assert!(surface.bounds().is_none());
    }

    #[test]
    fn test_add_and_remove_path() {
        let mut surface = DrawingSurface::new();
        let path = freehand(&[(0.0, 0.0), (10.0, 10.0)]);
        let id = path.id();

        surface.add_path(path);
        assert_eq!(surface.len(), 1);
        assert!(surface.get_path(id).is_some());

        assert!(surface.remove_path(id).is_some());
        assert!(surface.is_empty());
        assert!(surface.remove_path(id).is_none());
    }

    #[test]
    fn test_draw_order_is_insertion_order() {
        let mut surface = DrawingSurface::new();
        let a = freehand(&[(0.0, 0.0), (1.0, 1.0)]);
        let b = freehand(&[(2.0, 2.0), (3.0, 3.0)]);
        let (ida, idb) = (a.id(), b.id());
        surface.add_path(a);
        surface.add_path(b);

        let ids: Vec<_> = surface.paths().iter().map(Path::id).collect();
        assert_eq!(ids, vec![ida, idb]);
    }

    #[test]
    fn test_pen_scenario() {
        let mut canvas = Canvas::default();
        canvas.tools.set_color(SerializableColor::from_hex("#000000").unwrap());
        canvas.tools.set_stroke_width(5.0);

        let change = draw(&mut canvas, (10.0, 10.0), (15.0, 12.0));
        assert!(matches!(change, SurfaceChange::Committed(_)));
        assert_eq!(canvas.surface.len(), 1);

        let path = &canvas.surface.paths()[0];
        assert_eq!(path.kind(), PathKind::Freehand);
        assert_eq!(path.points()[0], Point::new(10.0, 10.0));
        assert_eq!(*path.points().last().unwrap(), Point::new(15.0, 12.0));
    }

    #[test]
    fn test_rectangle_scenario() {
        let mut canvas = Canvas::default();
        canvas.tools.set_tool(ToolKind::Rectangle);

        draw(&mut canvas, (0.0, 0.0), (50.0, 50.0));
        let path = &canvas.surface.paths()[0];
        assert_eq!(path.kind(), PathKind::Rectangle);
        assert_eq!(path.points(), &[Point::new(0.0, 0.0), Point::new(50.0, 50.0)]);
    }

    #[test]
    fn test_cancel_scenario() {
        let mut canvas = Canvas::default();
        canvas.handle_gesture(start(10.0, 10.0));
        assert_eq!(canvas.handle_gesture(GestureEvent::Cancel), SurfaceChange::None);
        assert!(canvas.surface.is_empty());
        assert!(!canvas.surface.can_undo());
    }

    #[test]
    fn test_commit_invariant() {
        let mut canvas = Canvas::default();
        let gestures: Vec<Vec<GestureEvent>> = vec![
            vec![start(10.0, 10.0), GestureEvent::End],
            vec![start(10.0, 10.0), mv(40.0, 40.0, 16), GestureEvent::End],
            vec![start(10.0, 10.0), mv(40.0, 40.0, 16), GestureEvent::Cancel],
            vec![start(5.0, 5.0), mv(5.0, 5.0, 16), GestureEvent::End],
            vec![start(5.0, 5.0), mv(9.0, 5.0, 16), mv(12.0, 6.0, 40), GestureEvent::End],
        ];

        for gesture in gestures {
            let before = canvas.surface.len();
            for event in gesture {
                canvas.handle_gesture(event);
            }
            let after = canvas.surface.len();
            assert!(after == before || after == before + 1);
            assert!(canvas.surface.paths().iter().all(|p| p.len() >= 2));
        }
        assert_eq!(canvas.surface.len(), 2);
    }

    #[test]
    fn test_eraser_gesture_is_one_undo_step() {
        let mut canvas = Canvas::default();
        draw(&mut canvas, (10.0, 10.0), (100.0, 10.0));
        canvas.tools.set_tool(ToolKind::Rectangle);
        draw(&mut canvas, (200.0, 200.0), (300.0, 300.0));
        let points_before = canvas.surface.point_count();

        canvas.tools.set_tool(ToolKind::Eraser);
        canvas.tools.set_stroke_width(2.0);
        canvas.handle_gesture(start(50.0, 10.0));
        canvas.handle_gesture(mv(60.0, 10.0, 16));
        let change = canvas.handle_gesture(mv(200.0, 200.0, 32));
        assert!(matches!(change, SurfaceChange::Erased(ref r) if r.removed.len() == 1));
        canvas.handle_gesture(GestureEvent::End);

        assert_eq!(canvas.surface.len(), 1);
        assert!(canvas.surface.point_count() < points_before);

        assert!(canvas.undo());
        assert_eq!(canvas.surface.len(), 2);
        assert_eq!(canvas.surface.point_count(), points_before);
    }

    #[test]
    fn test_eraser_miss_records_nothing() {
        let mut canvas = Canvas::default();
        draw(&mut canvas, (10.0, 10.0), (100.0, 10.0));

        canvas.tools.set_tool(ToolKind::Eraser);
        assert_eq!(canvas.handle_gesture(start(500.0, 500.0)), SurfaceChange::None);
        canvas.handle_gesture(mv(520.0, 500.0, 16));
        canvas.handle_gesture(GestureEvent::End);

        // Only the commit is on the undo stack.
        assert!(canvas.undo());
        assert!(canvas.surface.is_empty());
        assert!(!canvas.surface.can_undo());
    }

    #[test]
    fn test_undo_redo_commit() {
        let mut canvas = Canvas::default();
        draw(&mut canvas, (10.0, 10.0), (40.0, 40.0));
        assert!(canvas.surface.can_undo());

        assert!(canvas.undo());
        assert!(canvas.surface.is_empty());
        assert!(canvas.surface.can_redo());

        assert!(canvas.redo());
        assert_eq!(canvas.surface.len(), 1);
    }

    #[test]
    fn test_undo_clears_redo() {
        let mut canvas = Canvas::default();
        draw(&mut canvas, (10.0, 10.0), (40.0, 40.0));
        canvas.undo();
        assert!(canvas.surface.can_redo());

        draw(&mut canvas, (20.0, 20.0), (60.0, 60.0));
        assert!(!canvas.surface.can_redo());
    }

    #[test]
    fn test_undo_empty_stack() {
        let mut canvas = Canvas::default();
        assert!(!canvas.undo());
        assert!(!canvas.redo());
    }

    #[test]
    fn test_undo_history_is_capped() {
        let mut surface = DrawingSurface::new();
        for _ in 0..(MAX_UNDO_HISTORY + 10) {
            surface.push_undo();
        }
        let mut undone = 0;
        while surface.undo() {
            undone += 1;
        }
        assert_eq!(undone, MAX_UNDO_HISTORY);
    }

    #[test]
    fn test_clear_is_undoable() {
        let mut canvas = Canvas::default();
        draw(&mut canvas, (10.0, 10.0), (40.0, 40.0));
        draw(&mut canvas, (20.0, 20.0), (60.0, 60.0));

        canvas.clear();
        assert!(canvas.surface.is_empty());
        assert!(canvas.undo());
        assert_eq!(canvas.surface.len(), 2);
    }

    #[test]
    fn test_snapshot_is_independent() {
        let mut canvas = Canvas::default();
        draw(&mut canvas, (10.0, 10.0), (40.0, 40.0));

        let snapshot = canvas.snapshot();
        draw(&mut canvas, (20.0, 20.0), (60.0, 60.0));
        canvas.clear();

        assert_eq!(snapshot.paths.len(), 1);
    }

    #[test]
    fn test_json_roundtrip_drops_invalid_paths() {
        let mut surface = DrawingSurface::new();
        surface.add_path(freehand(&[(1.0, 1.0), (2.0, 2.0), (3.0, 3.0)]));
        let json = surface.to_json().unwrap();

        let loaded = DrawingSurface::from_json(&json).unwrap();
        assert_eq!(loaded.id, surface.id);
        assert_eq!(loaded.paths(), surface.paths());

        let mut value: serde_json::Value = serde_json::from_str(&json).unwrap();
        value["paths"][0]["points"] = serde_json::json!([{ "x": 1.0, "y": 1.0 }]);
        let loaded = DrawingSurface::from_json(&value.to_string()).unwrap();
        assert!(loaded.is_empty());
    }
}
