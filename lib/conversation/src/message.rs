//! Message types for conversations.

use chrono::{DateTime, Utc};
use murmur_core::{ConversationId, MessageId, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The role of a message sender.
///
/// The role tags both the origin of a message and its rendering treatment:
/// `BotImage` messages render their `image_url` rather than their text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    /// User/human message.
    User,
    /// Bot text reply.
    Bot,
    /// Bot-generated image.
    BotImage,
}

impl MessageRole {
    /// Returns the canonical string form used in storage.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Bot => "bot",
            Self::BotImage => "bot_image",
        }
    }
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error returned when parsing a role from a string fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseRoleError {
    /// The value that failed to parse.
    pub value: String,
}

impl fmt::Display for ParseRoleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown message role '{}'", self.value)
    }
}

impl std::error::Error for ParseRoleError {}

impl FromStr for MessageRole {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "bot" => Ok(Self::Bot),
            "bot_image" => Ok(Self::BotImage),
            other => Err(ParseRoleError {
                value: other.to_string(),
            }),
        }
    }
}

/// A message in a conversation.
///
/// Messages are created by the conversation service and never mutated or
/// deleted afterwards. `user_id` is set even for bot-authored messages, for
/// authorization scoping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Unique message identifier.
    pub id: MessageId,
    /// The owning conversation.
    pub conversation_id: ConversationId,
    /// The user whose turn produced this message.
    pub user_id: UserId,
    /// Message role.
    pub role: MessageRole,
    /// Text payload. For `BotImage` messages this carries the prompt.
    pub content: String,
    /// Image URL, present only for `BotImage` messages. Either a data URI
    /// with inline base64-encoded bytes or an externally hosted file URI.
    pub image_url: Option<String>,
    /// When the message was created. Defines ascending display order.
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Creates a new message.
    #[must_use]
    pub fn new(
        conversation_id: ConversationId,
        user_id: UserId,
        role: MessageRole,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: MessageId::new(),
            conversation_id,
            user_id,
            role,
            content: content.into(),
            image_url: None,
            created_at: Utc::now(),
        }
    }

    /// Creates a user message.
    #[must_use]
    pub fn user(
        conversation_id: ConversationId,
        user_id: UserId,
        content: impl Into<String>,
    ) -> Self {
        Self::new(conversation_id, user_id, MessageRole::User, content)
    }

    /// Creates a bot text reply.
    #[must_use]
    pub fn bot(
        conversation_id: ConversationId,
        user_id: UserId,
        content: impl Into<String>,
    ) -> Self {
        Self::new(conversation_id, user_id, MessageRole::Bot, content)
    }

    /// Creates a bot image message carrying the prompt and the image URL.
    #[must_use]
    pub fn bot_image(
        conversation_id: ConversationId,
        user_id: UserId,
        prompt: impl Into<String>,
        image_url: impl Into<String>,
    ) -> Self {
        let mut message = Self::new(conversation_id, user_id, MessageRole::BotImage, prompt);
        message.image_url = Some(image_url.into());
        message
    }
}
