//! File-based gallery for native platforms.

use super::{ArtifactId, ArtifactRecord, BoxFuture, Gallery, GalleryError, GalleryResult, validate};
use crate::artifact::Artifact;
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// File-based gallery.
///
/// Each user gets a directory; each artifact is stored as `<id>.<ext>`, the
/// extension following its format, with an `<id>.json` metadata sidecar.
pub struct FileGallery {
    /// Base directory for all users.
    base_path: PathBuf,
}

impl FileGallery {
    /// Create a gallery rooted at the given directory.
    ///
    /// Creates the directory if it doesn't exist.
    pub fn new(base_path: PathBuf) -> GalleryResult<Self> {
        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(|e| {
                GalleryError::Io(format!("Failed to create gallery directory: {}", e))
            })?;
        }
        Ok(Self { base_path })
    }

    /// Get the base path.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn user_dir(&self, user_id: &str) -> PathBuf {
        // Sanitize ID to be safe for directory names
        let safe_id: String = user_id
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.base_path.join(safe_id)
    }

    /// Find the sidecar for an id in any user directory.
    fn find_record(&self, id: ArtifactId) -> GalleryResult<Option<PathBuf>> {
        let entries = fs::read_dir(&self.base_path)
            .map_err(|e| GalleryError::Io(format!("Failed to read gallery directory: {}", e)))?;
        let name = format!("{}.json", id);
        Ok(entries
            .flatten()
            .map(|entry| entry.path().join(&name))
            .find(|candidate| candidate.is_file()))
    }
}

fn read_record(path: &Path) -> GalleryResult<ArtifactRecord> {
    let json = fs::read_to_string(path)
        .map_err(|e| GalleryError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
    serde_json::from_str(&json).map_err(|e| {
        GalleryError::Serialization(format!("Failed to parse {}: {}", path.display(), e))
    })
}

impl Gallery for FileGallery {
    fn save_artifact<'a>(
        &'a self,
        user_id: &'a str,
        artifact: &'a Artifact,
        title: &'a str,
    ) -> BoxFuture<'a, GalleryResult<ArtifactId>> {
        Box::pin(async move {
            validate(user_id, artifact)?;
            let dir = self.user_dir(user_id);
            fs::create_dir_all(&dir).map_err(|e| {
                GalleryError::Io(format!("Failed to create {}: {}", dir.display(), e))
            })?;

            let id = Uuid::new_v4();
            let record = ArtifactRecord::new(id, user_id, title, artifact);
            let json = serde_json::to_string_pretty(&record)
                .map_err(|e| GalleryError::Serialization(e.to_string()))?;

            let image_path = dir.join(format!("{}.{}", id, artifact.format.extension()));
            let record_path = dir.join(format!("{}.json", id));
            fs::write(&image_path, &artifact.bytes).map_err(|e| {
                GalleryError::Io(format!("Failed to write {}: {}", image_path.display(), e))
            })?;
            // The sidecar is written last; an artifact without one is not listed.
            if let Err(e) = fs::write(&record_path, json) {
                let _ = fs::remove_file(&image_path);
                return Err(GalleryError::Io(format!(
                    "Failed to write {}: {}",
                    record_path.display(),
                    e
                )));
            }

            log::info!("Saved artifact {} for {} ({} bytes)", id, user_id, artifact.len());
            Ok(id)
        })
    }

    fn load_artifact(&self, id: ArtifactId) -> BoxFuture<'_, GalleryResult<(ArtifactRecord, Vec<u8>)>> {
        Box::pin(async move {
            let record_path = self.find_record(id)?.ok_or(GalleryError::NotFound(id))?;
            let record = read_record(&record_path)?;
            let image_path = record_path.with_extension(record.format.extension());
            let bytes = fs::read(&image_path).map_err(|e| {
                GalleryError::Io(format!("Failed to read {}: {}", image_path.display(), e))
            })?;
            Ok((record, bytes))
        })
    }

    fn list_artifacts<'a>(&'a self, user_id: &'a str) -> BoxFuture<'a, GalleryResult<Vec<ArtifactRecord>>> {
        let dir = self.user_dir(user_id);
        Box::pin(async move {
            if !dir.exists() {
                return Ok(vec![]);
            }

            let entries = fs::read_dir(&dir)
                .map_err(|e| GalleryError::Io(format!("Failed to read directory: {}", e)))?;

            let mut records = Vec::new();
            for entry in entries.flatten() {
                let path = entry.path();
                if path.extension().map(|e| e == "json").unwrap_or(false) {
                    records.push(read_record(&path)?);
                }
            }
            Ok(records)
        })
    }
}
