//! Conversation domain type.

use crate::message::MessageRole;
use chrono::{DateTime, Utc};
use murmur_core::{ConversationId, UserId};
use serde::{Deserialize, Serialize};

/// Placeholder title assigned to conversations created without one.
///
/// Conversations still carrying this title (or an empty one) are eligible
/// for automatic title generation on their next message.
pub const DEFAULT_TITLE: &str = "New chat";

/// A titled, owned thread of messages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    /// Unique conversation identifier.
    pub id: ConversationId,
    /// The user who created the conversation. Immutable.
    pub user_id: UserId,
    /// Human-readable label. Defaults to [`DEFAULT_TITLE`] and may be
    /// overwritten once by automatic summarization.
    pub title: String,
    /// Preview of the most recent message, for list rendering without
    /// fetching full history.
    pub last_message: Option<String>,
    /// Role of the most recent message.
    pub last_message_role: Option<MessageRole>,
    /// When the conversation was created.
    pub created_at: DateTime<Utc>,
    /// Bumped on every new message.
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    /// Creates a new conversation owned by the given user.
    ///
    /// The title falls back to [`DEFAULT_TITLE`] when omitted.
    #[must_use]
    pub fn new(user_id: UserId, title: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: ConversationId::new(),
            user_id,
            title: title.unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            last_message: None,
            last_message_role: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns true if the title is still eligible for automatic generation.
    #[must_use]
    pub fn has_default_title(&self) -> bool {
        self.title.is_empty() || self.title.starts_with(DEFAULT_TITLE)
    }
}
