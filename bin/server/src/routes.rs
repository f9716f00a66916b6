//! HTTP route handlers for the murmur API.
//!
//! The typed RPC surface the client shell calls: a liveness check plus the
//! conversation operations. Handlers translate between JSON DTOs and the
//! conversation service; all behavior lives in the service.

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use murmur_conversation::{CallContext, Conversation, Message};
use murmur_core::ConversationId;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::auth::RequireAuth;
use crate::error::ApiError;
use crate::state::AppState;

/// Create the API router with all routes.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/ping", get(ping))
        .route(
            "/api/conversations",
            post(create_conversation).get(list_conversations),
        )
        .route(
            "/api/conversations/{id}/messages",
            get(list_messages).post(send_message),
        )
        .route("/api/conversations/{id}/images", post(generate_image))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Liveness check.
async fn ping() -> &'static str {
    "pong"
}

/// Conversation DTO, mirroring the stored row shape.
#[derive(Debug, Serialize)]
pub struct ConversationDto {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub last_message: Option<String>,
    pub last_message_role: Option<&'static str>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Conversation> for ConversationDto {
    fn from(c: Conversation) -> Self {
        Self {
            id: c.id.to_string(),
            user_id: c.user_id.to_string(),
            title: c.title,
            last_message: c.last_message,
            last_message_role: c.last_message_role.map(|r| r.as_str()),
            created_at: c.created_at.to_rfc3339(),
            updated_at: c.updated_at.to_rfc3339(),
        }
    }
}

/// Message DTO, mirroring the stored row shape.
#[derive(Debug, Serialize)]
pub struct MessageDto {
    pub id: String,
    pub conversation_id: String,
    pub user_id: String,
    pub role: &'static str,
    pub content: String,
    pub image_url: Option<String>,
    pub created_at: String,
}

impl From<Message> for MessageDto {
    fn from(m: Message) -> Self {
        Self {
            id: m.id.to_string(),
            conversation_id: m.conversation_id.to_string(),
            user_id: m.user_id.to_string(),
            role: m.role.as_str(),
            content: m.content,
            image_url: m.image_url,
            created_at: m.created_at.to_rfc3339(),
        }
    }
}

/// Create-conversation request body.
#[derive(Debug, Deserialize)]
pub struct CreateConversationRequest {
    /// Optional title; defaults server-side when omitted.
    pub title: Option<String>,
}

/// Handle conversation creation.
async fn create_conversation(
    State(state): State<Arc<AppState>>,
    RequireAuth(auth): RequireAuth,
    Json(request): Json<CreateConversationRequest>,
) -> Result<Json<ConversationDto>, ApiError> {
    let ctx = CallContext::authenticated(auth.user_id());
    let conversation = state
        .service
        .create_conversation(&ctx, request.title)
        .await?;

    Ok(Json(conversation.into()))
}

/// Handle conversation listing.
async fn list_conversations(
    State(state): State<Arc<AppState>>,
    RequireAuth(auth): RequireAuth,
) -> Result<Json<Vec<ConversationDto>>, ApiError> {
    let ctx = CallContext::authenticated(auth.user_id());
    let conversations = state.service.list_conversations(&ctx).await?;

    Ok(Json(
        conversations.into_iter().map(ConversationDto::from).collect(),
    ))
}

/// Handle message listing.
async fn list_messages(
    State(state): State<Arc<AppState>>,
    RequireAuth(auth): RequireAuth,
    Path(id): Path<String>,
) -> Result<Json<Vec<MessageDto>>, ApiError> {
    let conversation_id = parse_conversation_id(&id)?;
    let ctx = CallContext::authenticated(auth.user_id());
    let messages = state.service.list_messages(&ctx, conversation_id).await?;

    Ok(Json(messages.into_iter().map(MessageDto::from).collect()))
}

/// Send-message request body.
#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    /// The user's message.
    pub content: String,
}

/// Send-message response.
#[derive(Debug, Serialize)]
pub struct SendMessageResponse {
    /// The bot's reply.
    pub reply: String,
}

/// Handle a user message turn.
async fn send_message(
    State(state): State<Arc<AppState>>,
    RequireAuth(auth): RequireAuth,
    Path(id): Path<String>,
    Json(request): Json<SendMessageRequest>,
) -> Result<Json<SendMessageResponse>, ApiError> {
    let conversation_id = parse_conversation_id(&id)?;
    let ctx = CallContext::authenticated(auth.user_id());
    let reply = state
        .service
        .send_message(&ctx, conversation_id, &request.content)
        .await?;

    Ok(Json(SendMessageResponse { reply }))
}

/// Generate-image request body.
#[derive(Debug, Deserialize)]
pub struct GenerateImageRequest {
    /// The image prompt.
    pub prompt: String,
}

/// Generate-image response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateImageResponse {
    /// Data URI or hosted file URI of the generated image.
    pub image_url: String,
}

/// Handle an image generation turn.
async fn generate_image(
    State(state): State<Arc<AppState>>,
    RequireAuth(auth): RequireAuth,
    Path(id): Path<String>,
    Json(request): Json<GenerateImageRequest>,
) -> Result<Json<GenerateImageResponse>, ApiError> {
    let conversation_id = parse_conversation_id(&id)?;
    let ctx = CallContext::authenticated(auth.user_id());
    let image_url = state
        .service
        .generate_image(&ctx, conversation_id, &request.prompt)
        .await?;

    Ok(Json(GenerateImageResponse { image_url }))
}

fn parse_conversation_id(id: &str) -> Result<ConversationId, ApiError> {
    ConversationId::from_str(id)
        .map_err(|_| ApiError::validation(format!("malformed conversation id '{id}'")))
}
