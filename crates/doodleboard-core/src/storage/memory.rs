//! In-memory gallery implementation.

use super::{ArtifactId, ArtifactRecord, BoxFuture, Gallery, GalleryError, GalleryResult, validate};
use crate::artifact::Artifact;
use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

/// In-memory gallery for testing and ephemeral use.
#[derive(Default)]
pub struct MemoryGallery {
    artifacts: RwLock<HashMap<ArtifactId, (ArtifactRecord, Vec<u8>)>>,
}

impl MemoryGallery {
    /// Create a new empty gallery.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored artifacts.
    pub fn len(&self) -> usize {
        self.artifacts.read().map(|a| a.len()).unwrap_or(0)
    }

    /// Check if nothing has been stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Gallery for MemoryGallery {
    fn save_artifact<'a>(
        &'a self,
        user_id: &'a str,
        artifact: &'a Artifact,
        title: &'a str,
    ) -> BoxFuture<'a, GalleryResult<ArtifactId>> {
        Box::pin(async move {
            validate(user_id, artifact)?;
            let id = Uuid::new_v4();
            let record = ArtifactRecord::new(id, user_id, title, artifact);
            let mut artifacts = self
                .artifacts
                .write()
                .map_err(|e| GalleryError::Other(format!("Lock error: {}", e)))?;
            artifacts.insert(id, (record, artifact.bytes.clone()));
            Ok(id)
        })
    }

    fn load_artifact(&self, id: ArtifactId) -> BoxFuture<'_, GalleryResult<(ArtifactRecord, Vec<u8>)>> {
        Box::pin(async move {
            let artifacts = self
                .artifacts
                .read()
                .map_err(|e| GalleryError::Other(format!("Lock error: {}", e)))?;
            artifacts.get(&id).cloned().ok_or(GalleryError::NotFound(id))
        })
    }

    fn list_artifacts<'a>(&'a self, user_id: &'a str) -> BoxFuture<'a, GalleryResult<Vec<ArtifactRecord>>> {
        Box::pin(async move {
            let artifacts = self
                .artifacts
                .read()
                .map_err(|e| GalleryError::Other(format!("Lock error: {}", e)))?;
            Ok(artifacts
                .values()
                .filter(|(record, _)| record.user_id == user_id)
                .map(|(record, _)| record.clone())
                .collect())
        })
    }
}
