//! Shared application state.

use murmur_conversation::ConversationService;
use sqlx::PgPool;

/// State shared across request handlers.
pub struct AppState {
    /// Database connection pool, used by the auth extractor.
    pub db_pool: PgPool,
    /// The conversation service with its injected collaborators.
    pub service: ConversationService,
}

impl AppState {
    /// Creates a new application state.
    #[must_use]
    pub fn new(db_pool: PgPool, service: ConversationService) -> Self {
        Self { db_pool, service }
    }
}
