//! Headless application: replays gesture scripts, exports and saves drawings.

use crate::script::{GestureScript, ReplayStats, ScriptError, replay};
use doodleboard_core::artifact::{Artifact, ArtifactError};
use doodleboard_core::canvas::Canvas;
use doodleboard_core::config::{ConfigError, EngineConfig, SamplingProfile};
use doodleboard_core::prompt::GenerateError;
use doodleboard_core::storage::{ArtifactId, ArtifactRecord, FileGallery, Gallery, GalleryError};
use doodleboard_render::{ExportError, SaveError, export_later, save_drawing};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Application errors.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Failed to read {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("Failed to write {}: {source}", .path.display())]
    Write { path: PathBuf, source: io::Error },
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Script(#[from] ScriptError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error(transparent)]
    Save(#[from] SaveError),
    #[error(transparent)]
    Gallery(#[from] GalleryError),
    #[error(transparent)]
    Generate(#[from] GenerateError),
    #[error(transparent)]
    Artifact(#[from] ArtifactError),
    #[error("Vector serialization failed: {0}")]
    Vector(#[from] serde_json::Error),
}

fn read_to_string(path: &Path) -> Result<String, AppError> {
    fs::read_to_string(path).map_err(|source| AppError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn write(path: &Path, data: &[u8]) -> Result<(), AppError> {
    fs::write(path, data).map_err(|source| AppError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Build the engine configuration from an optional JSON file and an optional
/// sampling preset name. The preset wins over the file's sampling section.
pub fn load_config(path: Option<&Path>, sampling: Option<&str>) -> Result<EngineConfig, AppError> {
    let mut config = match path {
        Some(path) => EngineConfig::from_json(&read_to_string(path)?)?,
        None => EngineConfig::default(),
    };
    if let Some(name) = sampling {
        config = config.with_sampling(SamplingProfile::by_name(name)?);
    }
    config.validate()?;
    Ok(config)
}

/// Gallery owner and title for saved drawings.
#[derive(Debug, Clone)]
pub struct SaveTarget {
    pub gallery: PathBuf,
    pub user_id: String,
    pub title: String,
}

/// What to do with a replayed canvas.
#[derive(Debug, Clone, Default)]
pub struct ReplayOptions {
    /// Write the exported PNG here.
    pub png: Option<PathBuf>,
    /// Write the vector surface JSON here.
    pub vector: Option<PathBuf>,
    /// Save the export to a file gallery.
    pub save: Option<SaveTarget>,
}

/// Result of a replay run.
#[derive(Debug, Clone)]
pub struct ReplayOutcome {
    pub stats: ReplayStats,
    pub paths: usize,
    pub artifact_id: Option<ArtifactId>,
}

/// Replay a script file and export the result.
pub fn run_replay(
    config: EngineConfig,
    script_path: &Path,
    options: &ReplayOptions,
) -> Result<ReplayOutcome, AppError> {
    let script = GestureScript::from_json(&read_to_string(script_path)?)?;
    let mut canvas = Canvas::new(config);
    let stats = replay(&mut canvas, &script)?;

    if let Some(path) = &options.vector {
        write(path, canvas.surface.to_json()?.as_bytes())?;
        log::info!("Wrote vector surface to {}", path.display());
    }

    if let Some(path) = &options.png {
        let artifact = pollster::block_on(export_later(&canvas))?;
        write(path, &artifact.bytes)?;
        log::info!(
            "Wrote {}x{} PNG to {} ({} bytes)",
            artifact.width,
            artifact.height,
            path.display(),
            artifact.len()
        );
    }

    let artifact_id = match &options.save {
        Some(target) => {
            let gallery = FileGallery::new(target.gallery.clone())?;
            let id = pollster::block_on(save_drawing(
                &canvas,
                &gallery,
                &target.user_id,
                &target.title,
            ))?;
            Some(id)
        }
        None => None,
    };

    Ok(ReplayOutcome {
        stats,
        paths: canvas.surface.len(),
        artifact_id,
    })
}

/// Save a generated image file to the gallery under its prompt.
pub fn import_generated(image: &Path, prompt: &str, target: &SaveTarget) -> Result<ArtifactId, AppError> {
    let bytes = fs::read(image).map_err(|source| AppError::Read {
        path: image.to_path_buf(),
        source,
    })?;
    let artifact = Artifact::from_generated(bytes, prompt)?;
    let gallery = FileGallery::new(target.gallery.clone())?;
    let id = pollster::block_on(gallery.save_artifact(&target.user_id, &artifact, &target.title))?;
    log::info!("Imported generated image '{}' as {}", prompt, id);
    Ok(id)
}

/// List a user's saved artifacts.
pub fn list_gallery(gallery: &Path, user_id: &str) -> Result<Vec<ArtifactRecord>, AppError> {
    let gallery = FileGallery::new(gallery.to_path_buf())?;
    Ok(pollster::block_on(gallery.list_artifacts(user_id))?)
}
