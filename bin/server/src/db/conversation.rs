//! Postgres implementation of the conversation store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use murmur_conversation::{Conversation, ConversationStore, Message, MessageRole, StoreError};
use murmur_core::{ConversationId, MessageId, UserId};
use sqlx::{FromRow, PgPool};
use std::str::FromStr;

/// Row type for conversation queries.
#[derive(FromRow)]
struct ConversationRow {
    id: String,
    user_id: String,
    title: String,
    last_message: Option<String>,
    last_message_role: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ConversationRow {
    fn try_into_conversation(self) -> Result<Conversation, StoreError> {
        let id = parse_id::<ConversationId>("conversation id", &self.id)?;
        let user_id = parse_id::<UserId>("user id", &self.user_id)?;
        let last_message_role = self
            .last_message_role
            .as_deref()
            .map(MessageRole::from_str)
            .transpose()
            .map_err(|e| StoreError::InvalidRow {
                reason: e.to_string(),
            })?;

        Ok(Conversation {
            id,
            user_id,
            title: self.title,
            last_message: self.last_message,
            last_message_role,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Row type for message queries.
#[derive(FromRow)]
struct MessageRow {
    id: String,
    conversation_id: String,
    user_id: String,
    role: String,
    content: String,
    image_url: Option<String>,
    created_at: DateTime<Utc>,
}

impl MessageRow {
    fn try_into_message(self) -> Result<Message, StoreError> {
        let id = parse_id::<MessageId>("message id", &self.id)?;
        let conversation_id = parse_id::<ConversationId>("conversation id", &self.conversation_id)?;
        let user_id = parse_id::<UserId>("user id", &self.user_id)?;
        let role = MessageRole::from_str(&self.role).map_err(|e| StoreError::InvalidRow {
            reason: e.to_string(),
        })?;

        Ok(Message {
            id,
            conversation_id,
            user_id,
            role,
            content: self.content,
            image_url: self.image_url,
            created_at: self.created_at,
        })
    }
}

fn parse_id<T: FromStr>(kind: &str, value: &str) -> Result<T, StoreError>
where
    T::Err: std::fmt::Display,
{
    T::from_str(value).map_err(|e| StoreError::InvalidRow {
        reason: format!("invalid {kind} '{value}': {e}"),
    })
}

fn query_failed(err: sqlx::Error) -> StoreError {
    StoreError::QueryFailed {
        reason: err.to_string(),
    }
}

/// Postgres-backed conversation store.
pub struct PgConversationStore {
    pool: PgPool,
}

impl PgConversationStore {
    /// Creates a new store over the given pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ConversationStore for PgConversationStore {
    async fn insert_conversation(&self, conversation: &Conversation) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO conversations
                (id, user_id, title, last_message, last_message_role, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(conversation.id.to_string())
        .bind(conversation.user_id.to_string())
        .bind(&conversation.title)
        .bind(&conversation.last_message)
        .bind(conversation.last_message_role.map(|r| r.as_str()))
        .bind(conversation.created_at)
        .bind(conversation.updated_at)
        .execute(&self.pool)
        .await
        .map_err(query_failed)?;

        Ok(())
    }

    async fn get_conversation(
        &self,
        id: ConversationId,
    ) -> Result<Option<Conversation>, StoreError> {
        let row: Option<ConversationRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, title, last_message, last_message_role, created_at, updated_at
            FROM conversations
            WHERE id = $1
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(query_failed)?;

        match row {
            Some(r) => Ok(Some(r.try_into_conversation()?)),
            None => Ok(None),
        }
    }

    async fn list_conversations(&self, user_id: UserId) -> Result<Vec<Conversation>, StoreError> {
        let rows: Vec<ConversationRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, title, last_message, last_message_role, created_at, updated_at
            FROM conversations
            WHERE user_id = $1
            ORDER BY updated_at DESC
            "#,
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(query_failed)?;

        rows.into_iter()
            .map(ConversationRow::try_into_conversation)
            .collect()
    }

    async fn insert_message(&self, message: &Message) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO messages
                (id, conversation_id, user_id, role, content, image_url, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(message.id.to_string())
        .bind(message.conversation_id.to_string())
        .bind(message.user_id.to_string())
        .bind(message.role.as_str())
        .bind(&message.content)
        .bind(&message.image_url)
        .bind(message.created_at)
        .execute(&self.pool)
        .await
        .map_err(query_failed)?;

        Ok(())
    }

    async fn list_messages(
        &self,
        conversation_id: ConversationId,
    ) -> Result<Vec<Message>, StoreError> {
        let rows: Vec<MessageRow> = sqlx::query_as(
            r#"
            SELECT id, conversation_id, user_id, role, content, image_url, created_at
            FROM messages
            WHERE conversation_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(conversation_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(query_failed)?;

        rows.into_iter().map(MessageRow::try_into_message).collect()
    }

    async fn update_preview(
        &self,
        id: ConversationId,
        last_message: &str,
        last_message_role: MessageRole,
        updated_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            UPDATE conversations
            SET updated_at = $2, last_message = $3, last_message_role = $4
            WHERE id = $1
            "#,
        )
        .bind(id.to_string())
        .bind(updated_at)
        .bind(last_message)
        .bind(last_message_role.as_str())
        .execute(&self.pool)
        .await
        .map_err(query_failed)?;

        Ok(())
    }

    async fn get_title(&self, id: ConversationId) -> Result<Option<String>, StoreError> {
        sqlx::query_scalar(
            r#"
            SELECT title
            FROM conversations
            WHERE id = $1
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(query_failed)
    }

    async fn update_title(&self, id: ConversationId, title: &str) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            UPDATE conversations
            SET title = $2
            WHERE id = $1
            "#,
        )
        .bind(id.to_string())
        .bind(title)
        .execute(&self.pool)
        .await
        .map_err(query_failed)?;

        Ok(())
    }
}
