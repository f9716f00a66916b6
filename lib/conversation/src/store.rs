//! Persistence seam for conversations and messages.

use crate::conversation::Conversation;
use crate::error::StoreError;
use crate::message::{Message, MessageRole};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use murmur_core::{ConversationId, UserId};

/// Trait for conversation and message storage.
///
/// Each method maps to a single statement against the underlying store;
/// there is no transaction spanning multiple calls. Implementations must
/// pass the store's own error message through in [`StoreError`].
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Inserts a new conversation.
    async fn insert_conversation(&self, conversation: &Conversation) -> Result<(), StoreError>;

    /// Fetches a conversation by ID.
    async fn get_conversation(
        &self,
        id: ConversationId,
    ) -> Result<Option<Conversation>, StoreError>;

    /// Lists a user's conversations, most recently active first.
    async fn list_conversations(&self, user_id: UserId) -> Result<Vec<Conversation>, StoreError>;

    /// Inserts a new message.
    ///
    /// Fails when the referenced conversation does not exist (foreign-key
    /// constraint in relational implementations).
    async fn insert_message(&self, message: &Message) -> Result<(), StoreError>;

    /// Lists a conversation's messages in ascending `created_at` order.
    async fn list_messages(
        &self,
        conversation_id: ConversationId,
    ) -> Result<Vec<Message>, StoreError>;

    /// Updates a conversation's denormalized preview fields.
    async fn update_preview(
        &self,
        id: ConversationId,
        last_message: &str,
        last_message_role: MessageRole,
        updated_at: DateTime<Utc>,
    ) -> Result<(), StoreError>;

    /// Fetches a conversation's current title, or `None` if it is missing.
    async fn get_title(&self, id: ConversationId) -> Result<Option<String>, StoreError>;

    /// Overwrites a conversation's title.
    async fn update_title(&self, id: ConversationId, title: &str) -> Result<(), StoreError>;
}
