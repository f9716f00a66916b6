//! Generative backend abstraction.
//!
//! Provides a unified interface for text and image generation so the
//! conversation layer can be exercised against test doubles as easily as
//! against a real provider.

use crate::error::GenAiError;
use crate::image::{ImageRequest, ImageResponse};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A text generation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextRequest {
    /// The prompt to send.
    pub prompt: String,
    /// System prompt, if any.
    pub system: Option<String>,
    /// Temperature for sampling (0.0 - 1.0).
    pub temperature: Option<f32>,
    /// Maximum tokens to generate.
    pub max_tokens: Option<u32>,
}

impl TextRequest {
    /// Creates a new simple request with just a prompt.
    #[must_use]
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            system: None,
            temperature: None,
            max_tokens: None,
        }
    }

    /// Adds a system prompt.
    #[must_use]
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Sets the temperature.
    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Sets the max tokens.
    #[must_use]
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// A text generation response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextResponse {
    /// The generated content.
    pub content: String,
    /// Model that generated the response.
    pub model: String,
    /// Token usage statistics.
    pub usage: TokenUsage,
}

/// Token usage statistics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Number of input tokens.
    pub input_tokens: u32,
    /// Number of output tokens.
    pub output_tokens: u32,
}

impl TokenUsage {
    /// Returns the total number of tokens.
    #[must_use]
    pub fn total(&self) -> u32 {
        self.input_tokens + self.output_tokens
    }
}

/// Trait for generative backends.
///
/// This trait defines the interface the conversation service depends on.
/// Each turn is stateless from the backend's perspective; no conversation
/// history is supplied.
#[async_trait]
pub trait GenerativeBackend: Send + Sync {
    /// Generates a text completion for the given request.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails or yields no content.
    async fn generate_text(&self, request: &TextRequest) -> Result<TextResponse, GenAiError>;

    /// Generates an image (plus optional accompanying text) for the request.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails. A response with no usable
    /// image part is NOT an error at this layer; callers inspect the parts.
    async fn generate_image(&self, request: &ImageRequest) -> Result<ImageResponse, GenAiError>;

    /// Returns the text model name.
    fn text_model(&self) -> &str;

    /// Returns the image model name.
    fn image_model(&self) -> &str;
}
