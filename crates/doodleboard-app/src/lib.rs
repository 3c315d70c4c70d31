//! DoodleBoard Application
//!
//! Headless shell around the drawing engine: replays recorded gestures,
//! exports the canvas and manages the local gallery.

mod app;
pub mod script;

pub use app::{
    AppError, ReplayOptions, ReplayOutcome, SaveTarget, import_generated, list_gallery, load_config, run_replay,
};
pub use script::{GestureScript, ReplayStats, ScriptError, ScriptStep, replay};
