//! Generative backend abstraction for the murmur chat platform.
//!
//! This crate provides:
//!
//! - **Backend trait**: A unified interface for text and image generation
//! - **Request/response types**: Builders for prompts and typed results
//! - **Gemini client**: An HTTP implementation against the Gemini REST API

pub mod backend;
pub mod error;
pub mod gemini;
pub mod image;

pub use backend::{GenerativeBackend, TextRequest, TextResponse, TokenUsage};
pub use error::GenAiError;
pub use gemini::{GeminiClient, GeminiConfig};
pub use image::{ImagePart, ImageRequest, ImageResponse, InlineImage};
