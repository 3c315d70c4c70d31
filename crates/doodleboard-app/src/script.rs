//! Gesture scripts: recorded input replayed against a canvas.
//!
//! A script is a JSON document of steps:
//!
//! ```json
//! { "steps": [
//!     { "op": "tool", "tool": "rectangle" },
//!     { "op": "color", "color": "#FF0000" },
//!     { "op": "start", "x": 10, "y": 10 },
//!     { "op": "move", "x": 80, "y": 60 },
//!     { "op": "end" }
//! ] }
//! ```

use doodleboard_core::canvas::{Canvas, SurfaceChange};
use doodleboard_core::path::{ColorParseError, SerializableColor};
use doodleboard_core::tools::{GestureEvent, ToolKind};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Script loading and replay errors.
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Invalid script: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Step {step}: invalid color: {source}")]
    Color {
        step: usize,
        #[source]
        source: ColorParseError,
    },
    #[error("Step {step}: invalid brush width {width}")]
    Width { step: usize, width: f64 },
    #[error("Step {step}: no {preset} preset at index {index}")]
    Preset {
        step: usize,
        preset: &'static str,
        index: usize,
    },
}

/// One scripted input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ScriptStep {
    Tool { tool: ToolKind },
    Color { color: String },
    Width { width: f64 },
    /// Pick a palette entry by index.
    Palette { index: usize },
    /// Pick a preset brush size by index.
    Brush { index: usize },
    Start { x: f64, y: f64 },
    /// Without a timestamp the player advances its clock by one throttle interval.
    Move {
        x: f64,
        y: f64,
        #[serde(default)]
        timestamp_ms: Option<u64>,
    },
    End,
    Cancel,
    Undo,
    Redo,
    Clear,
}

/// A recorded session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GestureScript {
    pub steps: Vec<ScriptStep>,
}

impl GestureScript {
    pub fn from_json(json: &str) -> Result<Self, ScriptError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Counters reported after a replay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplayStats {
    pub committed: usize,
    pub erase_passes: usize,
    pub paths_removed: usize,
    pub undone: usize,
    pub redone: usize,
}

/// Replay a script onto `canvas`.
///
/// Gesture steps go through the same state machine as live input, so
/// invalid samples and degenerate gestures are dropped the same way.
pub fn replay(canvas: &mut Canvas, script: &GestureScript) -> Result<ReplayStats, ScriptError> {
    let mut stats = ReplayStats::default();
    let throttle = canvas.config().sampling.move_throttle_ms;
    let mut clock: u64 = 0;

    for (step, item) in script.steps.iter().enumerate() {
        let event = match item {
            ScriptStep::Tool { tool } => {
                canvas.tools.set_tool(*tool);
                None
            }
            ScriptStep::Color { color } => {
                let color = SerializableColor::from_hex(color)
                    .map_err(|source| ScriptError::Color { step, source })?;
                canvas.tools.set_color(color);
                None
            }
            ScriptStep::Width { width } => {
                if !canvas.tools.set_stroke_width(*width) {
                    return Err(ScriptError::Width { step, width: *width });
                }
                None
            }
            ScriptStep::Palette { index } => {
                if !canvas.tools.pick_color(*index) {
                    return Err(ScriptError::Preset {
                        step,
                        preset: "palette",
                        index: *index,
                    });
                }
                None
            }
            ScriptStep::Brush { index } => {
                if !canvas.tools.pick_brush_size(*index) {
                    return Err(ScriptError::Preset {
                        step,
                        preset: "brush",
                        index: *index,
                    });
                }
                None
            }
            ScriptStep::Start { x, y } => Some(GestureEvent::Start { x: *x, y: *y }),
            ScriptStep::Move { x, y, timestamp_ms } => {
                clock = timestamp_ms.unwrap_or_else(|| clock.saturating_add(throttle));
                Some(GestureEvent::Move {
                    x: *x,
                    y: *y,
                    timestamp_ms: clock,
                })
            }
            ScriptStep::End => Some(GestureEvent::End),
            ScriptStep::Cancel => Some(GestureEvent::Cancel),
            ScriptStep::Undo => {
                stats.undone += usize::from(canvas.undo());
                None
            }
            ScriptStep::Redo => {
                stats.redone += usize::from(canvas.redo());
                None
            }
            ScriptStep::Clear => {
                canvas.clear();
                None
            }
        };

        let Some(event) = event else {
            continue;
        };
        match canvas.handle_gesture(event) {
            SurfaceChange::None => {}
            SurfaceChange::Committed(_) => stats.committed += 1,
            SurfaceChange::Erased(report) => {
                stats.erase_passes += 1;
                stats.paths_removed += report.removed.len();
            }
        }
    }

    log::info!(
        "Replayed {} steps: {} committed, {} erase passes, {} paths removed",
        script.steps.len(),
        stats.committed,
        stats.erase_passes,
        stats.paths_removed
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use doodleboard_core::config::EngineConfig;
    use doodleboard_core::path::PathKind;
    use doodleboard_core::tools::{BRUSH_SIZES, PALETTE};

    fn canvas() -> Canvas {
        Canvas::new(EngineConfig::with_canvas_size(200.0, 200.0))
    }

    #[test]
    fn test_parse_script() {
        let script = GestureScript::from_json(
            r#"{ "steps": [
                { "op": "tool", "tool": "ellipse" },
                { "op": "start", "x": 1, "y": 2 },
                { "op": "move", "x": 3, "y": 4, "timestamp_ms": 40 },
                { "op": "end" }
            ] }"#,
        )
        .unwrap();

        assert_eq!(script.steps.len(), 4);
        assert_eq!(script.steps[0], ScriptStep::Tool { tool: ToolKind::Ellipse });
        assert_eq!(
            script.steps[2],
            ScriptStep::Move {
                x: 3.0,
                y: 4.0,
                timestamp_ms: Some(40)
            }
        );
    }

    #[test]
    fn test_replay_draws_shapes() {
        let script = GestureScript::from_json(
            r##"{ "steps": [
                { "op": "color", "color": "#FF0000" },
                { "op": "width", "width": 10 },
                { "op": "start", "x": 10, "y": 10 },
                { "op": "move", "x": 40, "y": 12 },
                { "op": "move", "x": 80, "y": 30 },
                { "op": "end" },
                { "op": "tool", "tool": "triangle" },
                { "op": "start", "x": 20, "y": 20 },
                { "op": "move", "x": 90, "y": 120 },
                { "op": "end" }
            ] }"##,
        )
        .unwrap();
        let mut canvas = canvas();
        let stats = replay(&mut canvas, &script).unwrap();

        assert_eq!(stats.committed, 2);
        let paths = canvas.surface.paths();
        assert_eq!(paths[0].kind(), PathKind::Freehand);
        assert_eq!(paths[0].color(), SerializableColor::rgb(255, 0, 0));
        assert!((paths[0].stroke_width() - 10.0).abs() < f64::EPSILON);
        assert_eq!(paths[1].kind(), PathKind::Triangle);
    }

    #[test]
    fn test_replay_auto_clock_passes_throttle() {
        let mut script = GestureScript::default();
        script.steps.push(ScriptStep::Start { x: 10.0, y: 10.0 });
        for i in 1..=5 {
            script.steps.push(ScriptStep::Move {
                x: 10.0 + i as f64 * 10.0,
                y: 10.0,
                timestamp_ms: None,
            });
        }
        script.steps.push(ScriptStep::End);

        let mut canvas = canvas();
        replay(&mut canvas, &script).unwrap();

        let last = *canvas.surface.paths()[0].points().last().unwrap();
        assert!((last.x - 60.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_replay_eraser_and_undo() {
        let script = GestureScript {
            steps: vec![
                ScriptStep::Tool { tool: ToolKind::Rectangle },
                ScriptStep::Start { x: 10.0, y: 10.0 },
                ScriptStep::Move { x: 50.0, y: 50.0, timestamp_ms: Some(0) },
                ScriptStep::End,
                ScriptStep::Tool { tool: ToolKind::Eraser },
                ScriptStep::Start { x: 50.0, y: 50.0 },
                ScriptStep::End,
                ScriptStep::Undo,
            ],
        };
        let mut canvas = canvas();
        let stats = replay(&mut canvas, &script).unwrap();

        assert_eq!(stats.erase_passes, 1);
        assert_eq!(stats.paths_removed, 1);
        assert_eq!(stats.undone, 1);
        assert_eq!(canvas.surface.len(), 1);
    }

    #[test]
    fn test_replay_rejects_bad_color() {
        let script = GestureScript {
            steps: vec![ScriptStep::Color { color: "red".to_string() }],
        };
        let result = replay(&mut canvas(), &script);
        assert!(matches!(result, Err(ScriptError::Color { step: 0, .. })));

        let script = GestureScript {
            steps: vec![ScriptStep::Width { width: -1.0 }],
        };
        let result = replay(&mut canvas(), &script);
        assert!(matches!(result, Err(ScriptError::Width { step: 0, .. })));
    }

    #[test]
    fn test_replay_presets() {
        let script = GestureScript::from_json(
            r#"{ "steps": [
                { "op": "palette", "index": 2 },
                { "op": "brush", "index": 3 },
                { "op": "tool", "tool": "line" },
                { "op": "start", "x": 10, "y": 10 },
                { "op": "move", "x": 60, "y": 10 },
                { "op": "end" }
            ] }"#,
        )
        .unwrap();
        let mut canvas = canvas();
        replay(&mut canvas, &script).unwrap();

        let path = &canvas.surface.paths()[0];
        assert_eq!(path.color(), PALETTE[2]);
        assert!((path.stroke_width() - BRUSH_SIZES[3]).abs() < f64::EPSILON);

        let script = GestureScript {
            steps: vec![ScriptStep::Tool { tool: ToolKind::Pen }, ScriptStep::Brush { index: 9 }],
        };
        let result = replay(&mut canvas, &script);
        assert!(matches!(
            result,
            Err(ScriptError::Preset { step: 1, preset: "brush", index: 9 })
        ));
    }
}
