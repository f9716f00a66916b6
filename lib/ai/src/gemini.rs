//! Gemini REST client.
//!
//! Implements [`GenerativeBackend`] against the `generateContent` endpoint
//! of the Gemini API. Text and title generation use the text model; image
//! generation uses an image-capable model and requests both TEXT and IMAGE
//! response modalities.

use crate::backend::{GenerativeBackend, TextRequest, TextResponse, TokenUsage};
use crate::error::GenAiError;
use crate::image::{ImagePart, ImageRequest, ImageResponse, InlineImage};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Default text model.
const DEFAULT_TEXT_MODEL: &str = "gemini-1.5-flash";

/// Default image-capable model.
const DEFAULT_IMAGE_MODEL: &str = "gemini-2.0-flash-preview-image-generation";

/// Default API base URL.
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Configuration for the Gemini client.
#[derive(Debug, Clone, Deserialize)]
pub struct GeminiConfig {
    /// API key for the Gemini API.
    pub api_key: String,
    /// Model used for text completions and title generation.
    #[serde(default = "default_text_model")]
    pub text_model: String,
    /// Model used for image generation.
    #[serde(default = "default_image_model")]
    pub image_model: String,
    /// API base URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_text_model() -> String {
    DEFAULT_TEXT_MODEL.to_string()
}

fn default_image_model() -> String {
    DEFAULT_IMAGE_MODEL.to_string()
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl GeminiConfig {
    /// Creates a configuration with default models.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            text_model: default_text_model(),
            image_model: default_image_model(),
            base_url: default_base_url(),
        }
    }

    /// Overrides the text model.
    #[must_use]
    pub fn with_text_model(mut self, model: impl Into<String>) -> Self {
        self.text_model = model.into();
        self
    }

    /// Overrides the image model.
    #[must_use]
    pub fn with_image_model(mut self, model: impl Into<String>) -> Self {
        self.image_model = model.into();
        self
    }
}

/// HTTP client for the Gemini API.
pub struct GeminiClient {
    http: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiClient {
    /// Creates a new client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is empty.
    pub fn new(config: GeminiConfig) -> Result<Self, GenAiError> {
        if config.api_key.is_empty() {
            return Err(GenAiError::InvalidConfig {
                reason: "missing API key".to_string(),
            });
        }

        Ok(Self {
            http: reqwest::Client::new(),
            config,
        })
    }

    /// Returns the client configuration.
    #[must_use]
    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    async fn generate_content(
        &self,
        model: &str,
        request: GenerateContentRequest,
    ) -> Result<GenerateContentResponse, GenAiError> {
        let url = format!("{}/models/{}:generateContent", self.config.base_url, model);

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| GenAiError::RequestFailed {
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenAiError::RequestFailed {
                reason: format!("HTTP {status}: {body}"),
            });
        }

        response
            .json()
            .await
            .map_err(|e| GenAiError::ResponseParseFailed {
                reason: e.to_string(),
            })
    }
}

#[async_trait]
impl GenerativeBackend for GeminiClient {
    async fn generate_text(&self, request: &TextRequest) -> Result<TextResponse, GenAiError> {
        let wire = GenerateContentRequest::from_text_request(request);
        let response = self
            .generate_content(&self.config.text_model, wire)
            .await?;

        let content = response.text();
        if content.is_empty() {
            return Err(GenAiError::EmptyResponse);
        }

        Ok(TextResponse {
            content,
            model: self.config.text_model.clone(),
            usage: response.usage(),
        })
    }

    async fn generate_image(&self, request: &ImageRequest) -> Result<ImageResponse, GenAiError> {
        let wire = GenerateContentRequest::from_image_request(request);
        let response = self
            .generate_content(&self.config.image_model, wire)
            .await?;

        Ok(ImageResponse::new(
            response.image_parts(),
            self.config.image_model.clone(),
        ))
    }

    fn text_model(&self) -> &str {
        &self.config.text_model
    }

    fn image_model(&self) -> &str {
        &self.config.image_model
    }
}

/// Wire request for `generateContent`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

impl GenerateContentRequest {
    fn from_text_request(request: &TextRequest) -> Self {
        let generation_config =
            if request.temperature.is_some() || request.max_tokens.is_some() {
                Some(GenerationConfig {
                    temperature: request.temperature,
                    max_output_tokens: request.max_tokens,
                    response_modalities: None,
                })
            } else {
                None
            };

        Self {
            contents: vec![Content::user_text(&request.prompt)],
            system_instruction: request.system.as_deref().map(Content::system_text),
            generation_config,
        }
    }

    fn from_image_request(request: &ImageRequest) -> Self {
        Self {
            contents: vec![Content::user_text(&request.prompt)],
            system_instruction: None,
            generation_config: Some(GenerationConfig {
                temperature: None,
                max_output_tokens: None,
                response_modalities: Some(vec!["TEXT".to_string(), "IMAGE".to_string()]),
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

impl Content {
    fn user_text(text: &str) -> Self {
        Self {
            role: Some("user".to_string()),
            parts: vec![Part {
                text: Some(text.to_string()),
                inline_data: None,
                file_data: None,
            }],
        }
    }

    fn system_text(text: &str) -> Self {
        Self {
            role: None,
            parts: vec![Part {
                text: Some(text.to_string()),
                inline_data: None,
                file_data: None,
            }],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<WireInlineData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    file_data: Option<WireFileData>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireInlineData {
    #[serde(default)]
    mime_type: String,
    #[serde(default)]
    data: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireFileData {
    #[serde(default)]
    file_uri: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_modalities: Option<Vec<String>>,
}

/// Wire response for `generateContent`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Clone, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate's parts.
    fn text(&self) -> String {
        let Some(content) = self.candidates.first().and_then(|c| c.content.as_ref()) else {
            return String::new();
        };

        content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect()
    }

    /// The first candidate's parts mapped into domain image parts.
    fn image_parts(&self) -> Vec<ImagePart> {
        let Some(content) = self.candidates.first().and_then(|c| c.content.as_ref()) else {
            return Vec::new();
        };

        content
            .parts
            .iter()
            .map(|p| ImagePart {
                text: p.text.clone(),
                inline_data: p.inline_data.as_ref().map(|d| InlineImage {
                    mime_type: d.mime_type.clone(),
                    data: d.data.clone(),
                }),
                file_uri: p.file_data.as_ref().map(|f| f.file_uri.clone()),
            })
            .collect()
    }

    fn usage(&self) -> TokenUsage {
        self.usage_metadata
            .as_ref()
            .map(|u| TokenUsage {
                input_tokens: u.prompt_token_count,
                output_tokens: u.candidates_token_count,
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = GeminiConfig::new("test-key");
        assert_eq!(config.text_model, DEFAULT_TEXT_MODEL);
        assert_eq!(config.image_model, DEFAULT_IMAGE_MODEL);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn client_rejects_empty_api_key() {
        let result = GeminiClient::new(GeminiConfig::new(""));
        assert!(matches!(result, Err(GenAiError::InvalidConfig { .. })));
    }

    #[test]
    fn text_request_wire_shape() {
        let request = TextRequest::new("Hello").with_temperature(0.5);
        let wire = GenerateContentRequest::from_text_request(&request);
        let json = serde_json::to_value(&wire).expect("serialize");

        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(json["contents"][0]["parts"][0]["text"], "Hello");
        assert_eq!(json["generationConfig"]["temperature"], 0.5);
        assert!(json.get("systemInstruction").is_none());
    }

    #[test]
    fn image_request_wire_shape() {
        let request = ImageRequest::new("a red cat");
        let wire = GenerateContentRequest::from_image_request(&request);
        let json = serde_json::to_value(&wire).expect("serialize");

        assert_eq!(
            json["generationConfig"]["responseModalities"],
            serde_json::json!(["TEXT", "IMAGE"])
        );
    }

    #[test]
    fn response_text_concatenates_parts() {
        let response: GenerateContentResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [{"text": "Hi "}, {"text": "there!"}]
                }
            }],
            "usageMetadata": {"promptTokenCount": 3, "candidatesTokenCount": 5}
        }))
        .expect("deserialize");

        assert_eq!(response.text(), "Hi there!");
        assert_eq!(response.usage().total(), 8);
    }

    #[test]
    fn response_image_parts_mapped() {
        let response: GenerateContentResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [
                        {"text": "Here you go"},
                        {"inlineData": {"mimeType": "image/png", "data": "AAAA"}}
                    ]
                }
            }]
        }))
        .expect("deserialize");

        let parts = response.image_parts();
        assert_eq!(parts.len(), 2);
        assert!(!parts[0].has_image());
        assert!(parts[1].has_image());
        assert_eq!(
            parts[1].inline_data.as_ref().map(|d| d.data.as_str()),
            Some("AAAA")
        );
    }

    #[test]
    fn response_without_candidates_is_empty() {
        let response: GenerateContentResponse =
            serde_json::from_value(serde_json::json!({})).expect("deserialize");

        assert_eq!(response.text(), "");
        assert!(response.image_parts().is_empty());
    }
}
