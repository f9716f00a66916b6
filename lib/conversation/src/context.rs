//! Request-scoped call context.
//!
//! The resolved identity of the caller is threaded explicitly into every
//! service operation rather than read from process-global state.

use crate::error::ServiceError;
use murmur_core::UserId;

/// The per-call context carrying the authenticated identity, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallContext {
    user_id: Option<UserId>,
}

impl CallContext {
    /// Creates a context for an authenticated caller.
    #[must_use]
    pub fn authenticated(user_id: UserId) -> Self {
        Self {
            user_id: Some(user_id),
        }
    }

    /// Creates a context with no identity.
    #[must_use]
    pub fn anonymous() -> Self {
        Self { user_id: None }
    }

    /// Returns the caller's identity, if any.
    #[must_use]
    pub fn user_id(&self) -> Option<UserId> {
        self.user_id
    }

    /// Returns the caller's identity or fails with `Unauthenticated`.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Unauthenticated`] when the context carries no
    /// identity.
    pub fn require_user(&self) -> Result<UserId, ServiceError> {
        self.user_id.ok_or(ServiceError::Unauthenticated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authenticated_context_yields_user() {
        let user_id = UserId::new();
        let ctx = CallContext::authenticated(user_id);
        assert_eq!(ctx.require_user().expect("should be present"), user_id);
    }

    #[test]
    fn anonymous_context_fails_require() {
        let ctx = CallContext::anonymous();
        assert_eq!(
            ctx.require_user().unwrap_err(),
            ServiceError::Unauthenticated
        );
    }
}
