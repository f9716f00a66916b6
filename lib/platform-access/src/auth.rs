//! Authenticated-user context.

use crate::session::Session;
use crate::user::User;
use murmur_core::UserId;

/// Represents an authenticated user context extracted from a request.
///
/// Available in handlers after the session cookie has been resolved against
/// the session and user stores.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    /// The current session.
    session: Session,
    /// The user record.
    user: User,
}

impl AuthenticatedUser {
    /// Creates a new authenticated user context.
    #[must_use]
    pub fn new(session: Session, user: User) -> Self {
        Self { session, user }
    }

    /// Returns the authenticated user's ID.
    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.session.user_id()
    }

    /// Returns the current session.
    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Returns the user record.
    #[must_use]
    pub fn user(&self) -> &User {
        &self.user
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionId;
    use chrono::Duration;

    #[test]
    fn user_id_comes_from_session() {
        let user = User::new("auth0|1".to_string());
        let session = Session::new(SessionId::from("sess-1"), user.id(), Duration::minutes(5));
        let auth = AuthenticatedUser::new(session, user.clone());

        assert_eq!(auth.user_id(), user.id());
        assert_eq!(auth.user().subject(), "auth0|1");
    }
}
