//! Error types for the conversation crate.
//!
//! - `StoreError`: failures from the persistence seam, message passed
//!   through from the underlying store
//! - `ServiceError`: failures surfaced by conversation service operations

use murmur_core::ConversationId;
use std::fmt;

/// Errors from conversation store operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A query or statement failed.
    QueryFailed { reason: String },
    /// A stored row could not be decoded into a domain type.
    InvalidRow { reason: String },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::QueryFailed { reason } => write!(f, "store query failed: {reason}"),
            Self::InvalidRow { reason } => write!(f, "invalid stored row: {reason}"),
        }
    }
}

impl std::error::Error for StoreError {}

/// Errors surfaced by conversation service operations.
///
/// All variants carry a human-readable message and are surfaced directly to
/// the caller; none are retried. The automatic title pass is the one place
/// where failures are swallowed instead of surfaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// No authenticated identity in the calling context.
    Unauthenticated,
    /// Malformed input (empty content, malformed identifier).
    Validation { reason: String },
    /// The conversation does not exist or belongs to another user.
    AccessDenied { conversation_id: ConversationId },
    /// Underlying persistence failure.
    Store { reason: String },
    /// The generative backend failed or returned no usable output.
    GenerationFailed { reason: String },
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unauthenticated => write!(f, "not authenticated"),
            Self::Validation { reason } => write!(f, "invalid input: {reason}"),
            Self::AccessDenied { conversation_id } => {
                write!(f, "access denied to conversation '{conversation_id}'")
            }
            Self::Store { reason } => write!(f, "store error: {reason}"),
            Self::GenerationFailed { reason } => write!(f, "generation failed: {reason}"),
        }
    }
}

impl std::error::Error for ServiceError {}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        Self::Store {
            reason: err.to_string(),
        }
    }
}

impl From<murmur_ai::GenAiError> for ServiceError {
    fn from(err: murmur_ai::GenAiError) -> Self {
        Self::GenerationFailed {
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_error_display() {
        let err = StoreError::QueryFailed {
            reason: "connection reset".to_string(),
        };
        assert!(err.to_string().contains("connection reset"));
    }

    #[test]
    fn service_error_from_store_error() {
        let err: ServiceError = StoreError::QueryFailed {
            reason: "duplicate key".to_string(),
        }
        .into();
        assert!(matches!(err, ServiceError::Store { .. }));
        assert!(err.to_string().contains("duplicate key"));
    }

    #[test]
    fn access_denied_names_conversation() {
        let id = ConversationId::new();
        let err = ServiceError::AccessDenied {
            conversation_id: id,
        };
        assert!(err.to_string().contains(&id.to_string()));
    }
}
