//! Error types for the AI crate.

use std::fmt;

/// Errors from generative backend operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenAiError {
    /// Request to the backend failed.
    RequestFailed { reason: String },
    /// Response parsing failed.
    ResponseParseFailed { reason: String },
    /// The backend returned no usable content.
    EmptyResponse,
    /// Invalid backend configuration.
    InvalidConfig { reason: String },
}

impl fmt::Display for GenAiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RequestFailed { reason } => {
                write!(f, "generative backend request failed: {reason}")
            }
            Self::ResponseParseFailed { reason } => {
                write!(f, "failed to parse generative backend response: {reason}")
            }
            Self::EmptyResponse => write!(f, "generative backend returned no content"),
            Self::InvalidConfig { reason } => {
                write!(f, "invalid generative backend configuration: {reason}")
            }
        }
    }
}

impl std::error::Error for GenAiError {}
