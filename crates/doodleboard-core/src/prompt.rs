//! Prompt-to-image collaborator.
//!
//! Image generation happens on a remote service. This module only builds the
//! request URL, keeps a short history of generations, and turns the returned
//! bytes into an [`Artifact`] for the regular save pathway.

use crate::artifact::{Artifact, ArtifactError};
use crate::storage::BoxFuture;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use thiserror::Error;
use url::Url;

/// Default prompt-to-image endpoint. The prompt is appended as a path segment.
pub const DEFAULT_ENDPOINT: &str = "https://image.pollinations.ai/prompt/";

/// Number of generations kept in the history.
pub const HISTORY_LIMIT: usize = 10;

/// Everything but `A-Z a-z 0-9 - _ . ! ~ * ' ( )` is escaped, the same set a
/// browser's `encodeURIComponent` leaves alone.
const PROMPT_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Prompt generation errors.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("Prompt is empty")]
    EmptyPrompt,
    #[error("Invalid endpoint: {0}")]
    Endpoint(#[from] url::ParseError),
    #[error("Endpoint cannot take path segments: {0}")]
    NotABase(String),
    #[error("Generation request failed: {0}")]
    Request(String),
    #[error(transparent)]
    Artifact(#[from] ArtifactError),
}

/// Result type for generation.
pub type GenerateResult<T> = Result<T, GenerateError>;

/// Build the generation URL for a prompt.
///
/// The trimmed prompt becomes a single percent-encoded path segment, so
/// slashes, commas and spaces in the prompt never alter the URL structure.
pub fn prompt_url(endpoint: &str, prompt: &str) -> GenerateResult<Url> {
    let prompt = prompt.trim();
    if prompt.is_empty() {
        return Err(GenerateError::EmptyPrompt);
    }

    let mut url = Url::parse(endpoint)?;
    if url.cannot_be_a_base() {
        return Err(GenerateError::NotABase(endpoint.to_string()));
    }
    let path = format!(
        "{}/{}",
        url.path().trim_end_matches('/'),
        utf8_percent_encode(prompt, PROMPT_SEGMENT)
    );
    url.set_path(&path);
    Ok(url)
}

/// Remote prompt-to-image service.
pub trait ImageGenerator: Send + Sync {
    /// Fetch the encoded image for a prompt URL.
    fn fetch<'a>(&'a self, url: &'a Url) -> BoxFuture<'a, GenerateResult<Vec<u8>>>;
}

/// One past generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationEntry {
    pub prompt: String,
    pub url: String,
}

/// Most recent generations, newest first.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationHistory {
    entries: VecDeque<GenerationEntry>,
}

impl GenerationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a generation, evicting the oldest past [`HISTORY_LIMIT`].
    pub fn record(&mut self, prompt: &str, url: &Url) {
        self.entries.push_front(GenerationEntry {
            prompt: prompt.trim().to_string(),
            url: url.to_string(),
        });
        self.entries.truncate(HISTORY_LIMIT);
    }

    pub fn entries(&self) -> impl Iterator<Item = &GenerationEntry> {
        self.entries.iter()
    }

    pub fn latest(&self) -> Option<&GenerationEntry> {
        self.entries.front()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Generates images and remembers what was asked for.
pub struct PromptSession<G: ImageGenerator> {
    generator: G,
    endpoint: String,
    history: GenerationHistory,
}

impl<G: ImageGenerator> PromptSession<G> {
    /// Create a session against the default endpoint.
    pub fn new(generator: G) -> Self {
        Self::with_endpoint(generator, DEFAULT_ENDPOINT)
    }

    /// Create a session against a custom endpoint.
    pub fn with_endpoint(generator: G, endpoint: &str) -> Self {
        Self {
            generator,
            endpoint: endpoint.to_string(),
            history: GenerationHistory::new(),
        }
    }

    pub fn history(&self) -> &GenerationHistory {
        &self.history
    }

    /// Generate an image for `prompt` and wrap it as an artifact.
    ///
    /// Only successful generations are recorded in the history.
    pub async fn generate(&mut self, prompt: &str) -> GenerateResult<Artifact> {
        let url = prompt_url(&self.endpoint, prompt)?;
        log::info!("Requesting generated image: {}", url);

        let bytes = self.generator.fetch(&url).await?;
        let artifact = Artifact::from_generated(bytes, prompt.trim())?;
        self.history.record(prompt, &url);
        Ok(artifact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba, RgbaImage};
    use pollster::block_on;
    use std::io::Cursor;

    struct FakeGenerator {
        fail: bool,
    }

    impl FakeGenerator {
        fn new(fail: bool) -> Self {
            Self { fail }
        }
    }

    impl ImageGenerator for FakeGenerator {
        fn fetch<'a>(&'a self, url: &'a Url) -> BoxFuture<'a, GenerateResult<Vec<u8>>> {
            Box::pin(async move {
                assert!(url.as_str().starts_with(DEFAULT_ENDPOINT));
                if self.fail {
                    return Err(GenerateError::Request("service unavailable".to_string()));
                }
                let img = RgbaImage::from_pixel(8, 4, Rgba([0, 128, 255, 255]));
                let mut bytes = Vec::new();
                img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
                    .map_err(|e| GenerateError::Request(e.to_string()))?;
                Ok(bytes)
            })
        }
    }

    #[test]
    fn test_prompt_url_encodes_segment() {
        let url = prompt_url(DEFAULT_ENDPOINT, "  sea view, blue sky/palms ").unwrap();
        assert_eq!(
            url.as_str(),
            "https://image.pollinations.ai/prompt/sea%20view%2C%20blue%20sky%2Fpalms"
        );
    }

    #[test]
    fn test_prompt_url_matches_uri_component_escaping() {
        let url = prompt_url(DEFAULT_ENDPOINT, "cat & dog; 50% off? (it's *big*) ~ok! a=b+c#1").unwrap();
        assert_eq!(
            url.path(),
            "/prompt/cat%20%26%20dog%3B%2050%25%20off%3F%20(it's%20*big*)%20~ok!%20a%3Db%2Bc%231"
        );
        assert!(url.query().is_none());
        assert!(url.fragment().is_none());

        let url = prompt_url("https://example.com/gen", "çay").unwrap();
        assert_eq!(url.as_str(), "https://example.com/gen/%C3%A7ay");
    }

    #[test]
    fn test_prompt_url_rejects_blank() {
        assert!(matches!(prompt_url(DEFAULT_ENDPOINT, "   "), Err(GenerateError::EmptyPrompt)));
        assert!(matches!(prompt_url("not a url", "cat"), Err(GenerateError::Endpoint(_))));
    }

    #[test]
    fn test_history_keeps_newest_ten() {
        let mut history = GenerationHistory::new();
        for i in 0..15 {
            let prompt = format!("prompt {}", i);
            let url = prompt_url(DEFAULT_ENDPOINT, &prompt).unwrap();
            history.record(&prompt, &url);
        }
        assert_eq!(history.len(), HISTORY_LIMIT);
        assert_eq!(history.latest().unwrap().prompt, "prompt 14");
        assert_eq!(history.entries().last().unwrap().prompt, "prompt 5");
    }

    #[test]
    fn test_session_generates_artifact() {
        let mut session = PromptSession::new(FakeGenerator::new(false));
        let artifact = block_on(session.generate("a cat")).unwrap();

        assert_eq!((artifact.width, artifact.height), (8, 4));
        assert_eq!(session.history().len(), 1);
        assert_eq!(session.history().latest().unwrap().prompt, "a cat");
    }

    #[test]
    fn test_session_failure_keeps_history() {
        let mut session = PromptSession::new(FakeGenerator::new(true));
        assert!(matches!(
            block_on(session.generate("a cat")),
            Err(GenerateError::Request(_))
        ));
        assert!(session.history().is_empty());
        assert!(matches!(block_on(session.generate("")), Err(GenerateError::EmptyPrompt)));
    }
}
