//! DoodleBoard Core Library
//!
//! Platform-agnostic vector model, pointer state machine and eraser for the
//! DoodleBoard drawing surface.

pub mod artifact;
pub mod canvas;
pub mod config;
pub mod eraser;
pub mod geometry;
pub mod path;
pub mod prompt;
pub mod storage;
pub mod tools;

pub use artifact::{Artifact, ArtifactError, ArtifactFormat, ArtifactSource};
pub use canvas::{Canvas, DrawingSurface, SurfaceChange, SurfaceSnapshot};
pub use config::{ConfigError, EngineConfig, SamplingProfile};
pub use eraser::EraseReport;
pub use path::{Path, PathId, PathKind, SerializableColor};
pub use prompt::{GenerateError, GenerationHistory, ImageGenerator, PromptSession, prompt_url};
pub use storage::{ArtifactId, ArtifactRecord, FileGallery, Gallery, GalleryError, MemoryGallery};
pub use tools::{GestureEvent, InProgress, ToolAction, ToolKind, ToolManager, ToolSelection};
