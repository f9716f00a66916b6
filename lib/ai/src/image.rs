//! Image generation request and response types.
//!
//! Responses mirror the part-based shape of the Gemini API: a response
//! carries an ordered list of parts, each of which may hold inline image
//! bytes, a hosted file URI, or accompanying text.

use serde::{Deserialize, Serialize};

/// An image generation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageRequest {
    /// The prompt describing the desired image.
    pub prompt: String,
}

impl ImageRequest {
    /// Creates a new image request.
    #[must_use]
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
        }
    }
}

/// Inline image payload: base64-encoded bytes plus their media type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineImage {
    /// Media type of the encoded bytes (e.g. `image/png`).
    pub mime_type: String,
    /// Base64-encoded image bytes.
    pub data: String,
}

/// One part of an image generation response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImagePart {
    /// Accompanying text, if the model produced any.
    pub text: Option<String>,
    /// Inline base64-encoded image bytes.
    pub inline_data: Option<InlineImage>,
    /// URI of a hosted image file.
    pub file_uri: Option<String>,
}

impl ImagePart {
    /// Creates a part carrying inline image bytes.
    #[must_use]
    pub fn inline(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            text: None,
            inline_data: Some(InlineImage {
                mime_type: mime_type.into(),
                data: data.into(),
            }),
            file_uri: None,
        }
    }

    /// Creates a part carrying a hosted file URI.
    #[must_use]
    pub fn file(uri: impl Into<String>) -> Self {
        Self {
            text: None,
            inline_data: None,
            file_uri: Some(uri.into()),
        }
    }

    /// Creates a text-only part.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            inline_data: None,
            file_uri: None,
        }
    }

    /// Returns true if this part carries a usable image payload.
    #[must_use]
    pub fn has_image(&self) -> bool {
        self.inline_data.as_ref().is_some_and(|d| !d.data.is_empty())
            || self.file_uri.as_ref().is_some_and(|u| !u.is_empty())
    }
}

/// An image generation response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImageResponse {
    /// Response parts in model order.
    pub parts: Vec<ImagePart>,
    /// Model that generated the response.
    pub model: String,
}

impl ImageResponse {
    /// Creates a response from parts.
    #[must_use]
    pub fn new(parts: Vec<ImagePart>, model: impl Into<String>) -> Self {
        Self {
            parts,
            model: model.into(),
        }
    }

    /// Extracts a displayable image URL from the response.
    ///
    /// Scans for the first part carrying an image payload. Inline bytes are
    /// preferred over a hosted file URI and rendered as a data URI; the media
    /// type defaults to `image/png` when the backend omits it. Returns `None`
    /// when no part holds a usable image.
    #[must_use]
    pub fn image_url(&self) -> Option<String> {
        let part = self.parts.iter().find(|p| p.has_image())?;

        if let Some(inline) = part.inline_data.as_ref().filter(|d| !d.data.is_empty()) {
            let mime = if inline.mime_type.is_empty() {
                "image/png"
            } else {
                inline.mime_type.as_str()
            };
            return Some(format!("data:{mime};base64,{}", inline.data));
        }

        part.file_uri.clone().filter(|u| !u.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inline_data_becomes_data_uri() {
        let response = ImageResponse::new(vec![ImagePart::inline("image/png", "AAAA")], "test");
        assert_eq!(
            response.image_url(),
            Some("data:image/png;base64,AAAA".to_string())
        );
    }

    #[test]
    fn missing_mime_type_defaults_to_png() {
        let response = ImageResponse::new(vec![ImagePart::inline("", "QUJD")], "test");
        assert_eq!(
            response.image_url(),
            Some("data:image/png;base64,QUJD".to_string())
        );
    }

    #[test]
    fn file_uri_used_when_no_inline_data() {
        let response = ImageResponse::new(
            vec![ImagePart::file("https://files.example/cat.png")],
            "test",
        );
        assert_eq!(
            response.image_url(),
            Some("https://files.example/cat.png".to_string())
        );
    }

    #[test]
    fn inline_data_preferred_over_file_uri() {
        let part = ImagePart {
            text: None,
            inline_data: Some(InlineImage {
                mime_type: "image/png".to_string(),
                data: "AAAA".to_string(),
            }),
            file_uri: Some("https://files.example/cat.png".to_string()),
        };
        let response = ImageResponse::new(vec![part], "test");
        assert_eq!(
            response.image_url(),
            Some("data:image/png;base64,AAAA".to_string())
        );
    }

    #[test]
    fn text_only_parts_are_skipped() {
        let response = ImageResponse::new(
            vec![
                ImagePart::text("Here is your image:"),
                ImagePart::file("https://files.example/dog.png"),
            ],
            "test",
        );
        assert_eq!(
            response.image_url(),
            Some("https://files.example/dog.png".to_string())
        );
    }

    #[test]
    fn empty_payloads_yield_none() {
        let part = ImagePart {
            text: Some("no image today".to_string()),
            inline_data: Some(InlineImage {
                mime_type: "image/png".to_string(),
                data: String::new(),
            }),
            file_uri: Some(String::new()),
        };
        let response = ImageResponse::new(vec![part], "test");
        assert_eq!(response.image_url(), None);
    }

    #[test]
    fn no_parts_yield_none() {
        let response = ImageResponse::default();
        assert_eq!(response.image_url(), None);
    }
}
