//! PNG export and the save pipeline.
//!
//! Exports always render the committed paths at the configured canvas size,
//! 1:1, regardless of any display transform. The asynchronous entry points
//! copy the surface before their future is created, so the canvas stays free
//! for gesture handling while the export is pending.

use crate::raster::{PixmapRenderer, encode_png};
use crate::renderer::{RenderContext, Renderer, RendererError};
use doodleboard_core::artifact::Artifact;
use doodleboard_core::canvas::{Canvas, SurfaceSnapshot};
use doodleboard_core::config::EngineConfig;
use doodleboard_core::storage::{ArtifactId, Gallery, GalleryError};
use std::future::Future;
use thiserror::Error;

/// Export errors.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Canvas size {width}x{height} cannot be exported")]
    InvalidSize { width: f64, height: f64 },
    #[error(transparent)]
    Render(#[from] RendererError),
    #[error("PNG encoding failed: {0}")]
    Encode(#[from] png::EncodingError),
}

/// Result type for export operations.
pub type ExportResult<T> = Result<T, ExportError>;

/// Save pipeline errors. The canvas is untouched whichever step fails.
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("Export failed: {0}")]
    Export(#[from] ExportError),
    #[error("Save failed: {0}")]
    Gallery(#[from] GalleryError),
}

/// Render a snapshot and encode it as PNG.
pub fn export_png(snapshot: &SurfaceSnapshot, config: &EngineConfig) -> ExportResult<Vec<u8>> {
    let size = config.canvas_size;
    if !(size.width >= 1.0 && size.height >= 1.0) {
        return Err(ExportError::InvalidSize {
            width: size.width,
            height: size.height,
        });
    }

    let ctx = RenderContext::for_export(snapshot, config);
    let pixmap = PixmapRenderer::new().draw(&ctx)?;
    let png_data = encode_png(&pixmap)?;

    log::debug!(
        "Exported {} paths as {}x{} PNG ({} bytes)",
        snapshot.paths.len(),
        pixmap.width(),
        pixmap.height(),
        png_data.len()
    );
    Ok(png_data)
}

/// Export a snapshot as a drawn [`Artifact`].
pub fn export_artifact(snapshot: &SurfaceSnapshot, config: &EngineConfig) -> ExportResult<Artifact> {
    let bytes = export_png(snapshot, config)?;
    let size = config.canvas_size;
    Ok(Artifact::drawn(bytes, size.width.round() as u32, size.height.round() as u32))
}

/// Snapshot the canvas now and export it when polled.
///
/// The returned future borrows nothing from the canvas.
pub fn export_later(canvas: &Canvas) -> impl Future<Output = ExportResult<Artifact>> + Send + 'static {
    let snapshot = canvas.snapshot();
    let config = canvas.config().clone();
    async move { export_artifact(&snapshot, &config) }
}

/// Export the canvas and store the result in `gallery`.
///
/// The gallery is called exactly once, and only after a successful export.
pub fn save_drawing<'a, G>(
    canvas: &Canvas,
    gallery: &'a G,
    user_id: &'a str,
    title: &'a str,
) -> impl Future<Output = Result<ArtifactId, SaveError>> + 'a
where
    G: Gallery + ?Sized,
{
    let pending = export_later(canvas);
    async move {
        let artifact = pending.await.inspect_err(|e| log::warn!("Export failed: {}", e))?;
        let id = gallery
            .save_artifact(user_id, &artifact, title)
            .await
            .inspect_err(|e| log::warn!("Gallery rejected artifact: {}", e))?;
        log::info!("Saved drawing '{}' as {}", title, id);
        Ok(id)
    }
}
