//! Raster artifacts handed to the gallery.
//!
//! Hand-drawn exports and prompt-generated images converge here: both end up
//! as encoded image bytes with known dimensions.

use image::ImageFormat;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Artifact construction errors.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("Artifact is empty")]
    Empty,
    #[error("Unsupported image format: {0}")]
    Unsupported(String),
    #[error("Could not decode image: {0}")]
    Decode(#[from] image::ImageError),
}

/// Encoding of an artifact's bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactFormat {
    #[default]
    Png,
    Jpeg,
    Webp,
}

impl ArtifactFormat {
    /// Sniff the format from the leading bytes.
    pub fn guess(bytes: &[u8]) -> Result<Self, ArtifactError> {
        match image::guess_format(bytes)? {
            ImageFormat::Png => Ok(Self::Png),
            ImageFormat::Jpeg => Ok(Self::Jpeg),
            ImageFormat::WebP => Ok(Self::Webp),
            other => Err(ArtifactError::Unsupported(format!("{:?}", other))),
        }
    }

    /// File extension, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Webp => "webp",
        }
    }

    fn image_format(self) -> ImageFormat {
        match self {
            Self::Png => ImageFormat::Png,
            Self::Jpeg => ImageFormat::Jpeg,
            Self::Webp => ImageFormat::WebP,
        }
    }
}

/// Where an artifact came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ArtifactSource {
    /// Exported from the drawing surface.
    Drawn,
    /// Produced by the prompt-to-image service.
    Generated { prompt: String },
}

/// Encoded image bytes plus what the gallery needs to know about them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Encoded image.
    pub bytes: Vec<u8>,
    /// Encoding of `bytes`. Always PNG for drawn artifacts.
    pub format: ArtifactFormat,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Origin of the image.
    pub source: ArtifactSource,
}

impl Artifact {
    /// Wrap a PNG exported from the drawing surface.
    pub fn drawn(bytes: Vec<u8>, width: u32, height: u32) -> Self {
        Self {
            bytes,
            format: ArtifactFormat::Png,
            width,
            height,
            source: ArtifactSource::Drawn,
        }
    }

    /// Wrap an image returned by the prompt-to-image service.
    ///
    /// The format is sniffed from the bytes, which are then decoded once to
    /// validate them and read the dimensions.
    pub fn from_generated(bytes: Vec<u8>, prompt: &str) -> Result<Self, ArtifactError> {
        if bytes.is_empty() {
            return Err(ArtifactError::Empty);
        }
        let format = ArtifactFormat::guess(&bytes)?;
        let decoded = image::load_from_memory_with_format(&bytes, format.image_format())?;
        Ok(Self {
            width: decoded.width(),
            height: decoded.height(),
            bytes,
            format,
            source: ArtifactSource::Generated {
                prompt: prompt.to_string(),
            },
        })
    }

    /// Size of the encoded data.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Check if there is no encoded data.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
