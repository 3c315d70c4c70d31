//! DoodleBoard Render Library
//!
//! Turns the path model into drawing primitives, rasterizes them on the CPU
//! with tiny-skia, and encodes exports as PNG.

mod export;
mod raster;
mod renderer;

pub use export::{ExportError, ExportResult, SaveError, export_artifact, export_later, export_png, save_drawing};
pub use raster::{PixmapRenderer, encode_png};
pub use renderer::{
    ERASER_TRAIL_COLOR, MIN_EXTENT, MIN_SEGMENT_LENGTH, Primitive, RenderContext, RenderResult, Renderer,
    RendererError, Segment, render,
};
