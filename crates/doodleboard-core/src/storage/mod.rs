//! Gallery abstraction for persisting saved artifacts.
//!
//! The drawing engine only ever hands finished rasters to a gallery; it
//! never stores its vector model there.

mod file;
mod memory;

pub use file::FileGallery;
pub use memory::MemoryGallery;

use crate::artifact::{Artifact, ArtifactFormat, ArtifactSource};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;
use uuid::Uuid;

/// Identifier assigned by the gallery to a saved artifact.
pub type ArtifactId = Uuid;

/// Gallery errors.
#[derive(Debug, Error)]
pub enum GalleryError {
    #[error("Artifact not found: {0}")]
    NotFound(ArtifactId),
    #[error("Invalid artifact: {0}")]
    Invalid(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Gallery error: {0}")]
    Other(String),
}

/// Result type for gallery operations.
pub type GalleryResult<T> = Result<T, GalleryError>;

/// Boxed future for async operations.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Metadata stored next to each artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactRecord {
    pub id: ArtifactId,
    pub user_id: String,
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Sidecars written before formats were recorded hold PNGs.
    #[serde(default)]
    pub format: ArtifactFormat,
    pub source: ArtifactSource,
}

impl ArtifactRecord {
    fn new(id: ArtifactId, user_id: &str, title: &str, artifact: &Artifact) -> Self {
        Self {
            id,
            user_id: user_id.to_string(),
            title: title.to_string(),
            width: artifact.width,
            height: artifact.height,
            format: artifact.format,
            source: artifact.source.clone(),
        }
    }
}

/// Per-user artifact store.
///
/// `save_artifact` must be safe to retry after a failure: a failed call
/// leaves nothing behind that a retry would conflict with.
pub trait Gallery: Send + Sync {
    /// Store an artifact and return its new id.
    fn save_artifact<'a>(
        &'a self,
        user_id: &'a str,
        artifact: &'a Artifact,
        title: &'a str,
    ) -> BoxFuture<'a, GalleryResult<ArtifactId>>;

    /// Load an artifact's metadata and bytes.
    fn load_artifact(&self, id: ArtifactId) -> BoxFuture<'_, GalleryResult<(ArtifactRecord, Vec<u8>)>>;

    /// List a user's artifacts.
    fn list_artifacts<'a>(&'a self, user_id: &'a str) -> BoxFuture<'a, GalleryResult<Vec<ArtifactRecord>>>;
}

/// Reject artifacts no gallery should accept.
fn validate(user_id: &str, artifact: &Artifact) -> GalleryResult<()> {
    if user_id.trim().is_empty() {
        return Err(GalleryError::Invalid("user id is empty".to_string()));
    }
    if artifact.is_empty() {
        return Err(GalleryError::Invalid("artifact has no data".to_string()));
    }
    Ok(())
}
