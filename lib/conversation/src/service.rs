//! The conversation service.
//!
//! Orchestrates reads and writes against the store and calls into the
//! generative backend. Operations are independent, stateless request/response
//! calls: no locking, no retries, and no transaction spanning the multi-step
//! sequences — each statement is atomic on its own.

use crate::context::CallContext;
use crate::conversation::{Conversation, DEFAULT_TITLE};
use crate::error::ServiceError;
use crate::message::{Message, MessageRole};
use crate::store::ConversationStore;
use chrono::Utc;
use murmur_ai::{GenerativeBackend, ImageRequest, TextRequest};
use murmur_core::ConversationId;
use std::sync::Arc;

/// Preview text stored for image turns.
const IMAGE_PREVIEW: &str = "[Image]";

/// The conversation service.
///
/// Dependencies are injected at construction time so tests can substitute
/// in-memory doubles for both collaborators.
pub struct ConversationService {
    store: Arc<dyn ConversationStore>,
    backend: Arc<dyn GenerativeBackend>,
}

impl ConversationService {
    /// Creates a service over the given store and generative backend.
    #[must_use]
    pub fn new(store: Arc<dyn ConversationStore>, backend: Arc<dyn GenerativeBackend>) -> Self {
        Self { store, backend }
    }

    /// Creates a conversation owned by the caller.
    ///
    /// The title defaults to `"New chat"` when omitted. Returns the persisted
    /// conversation including its generated ID and timestamps.
    ///
    /// # Errors
    ///
    /// Fails with `Unauthenticated` when the context carries no identity, or
    /// `Store` when the insert is rejected.
    pub async fn create_conversation(
        &self,
        ctx: &CallContext,
        title: Option<String>,
    ) -> Result<Conversation, ServiceError> {
        let user_id = ctx.require_user()?;

        let conversation = Conversation::new(user_id, title);
        self.store.insert_conversation(&conversation).await?;

        Ok(conversation)
    }

    /// Lists the caller's conversations, most recently active first.
    ///
    /// # Errors
    ///
    /// Fails with `Unauthenticated` or `Store`.
    pub async fn list_conversations(
        &self,
        ctx: &CallContext,
    ) -> Result<Vec<Conversation>, ServiceError> {
        let user_id = ctx.require_user()?;

        Ok(self.store.list_conversations(user_id).await?)
    }

    /// Lists a conversation's messages in ascending `created_at` order.
    ///
    /// # Errors
    ///
    /// Fails with `Unauthenticated`, `AccessDenied` when the conversation is
    /// missing or owned by another user, or `Store`.
    pub async fn list_messages(
        &self,
        ctx: &CallContext,
        conversation_id: ConversationId,
    ) -> Result<Vec<Message>, ServiceError> {
        let user_id = ctx.require_user()?;

        // Missing and foreign conversations are indistinguishable to the
        // caller; neither leaks existence.
        let conversation = self
            .store
            .get_conversation(conversation_id)
            .await?
            .ok_or(ServiceError::AccessDenied { conversation_id })?;
        if conversation.user_id != user_id {
            return Err(ServiceError::AccessDenied { conversation_id });
        }

        Ok(self.store.list_messages(conversation_id).await?)
    }

    /// Sends a user message and returns the bot's reply.
    ///
    /// Stores the user message, obtains a reply from the generative backend
    /// (each turn is stateless; no history is supplied), stores the reply,
    /// and refreshes the conversation preview. Conversations still carrying
    /// the default title get a best-effort generated title; failures of that
    /// step are logged and swallowed.
    ///
    /// # Errors
    ///
    /// Fails with `Unauthenticated`, `Validation` for empty content, `Store`
    /// when an insert or update is rejected, or `GenerationFailed` when the
    /// backend yields no reply. A failure mid-sequence leaves the prefix of
    /// inserts already committed.
    pub async fn send_message(
        &self,
        ctx: &CallContext,
        conversation_id: ConversationId,
        content: &str,
    ) -> Result<String, ServiceError> {
        let user_id = ctx.require_user()?;

        if content.is_empty() {
            return Err(ServiceError::Validation {
                reason: "message content must not be empty".to_string(),
            });
        }

        self.store
            .insert_message(&Message::user(conversation_id, user_id, content))
            .await?;

        let reply = self
            .backend
            .generate_text(&TextRequest::new(content))
            .await?
            .content;

        self.store
            .insert_message(&Message::bot(conversation_id, user_id, &reply))
            .await?;

        self.store
            .update_preview(conversation_id, &reply, MessageRole::Bot, Utc::now())
            .await?;

        if let Err(e) = self.refresh_title(conversation_id, content).await {
            tracing::warn!(
                error = %e,
                conversation_id = %conversation_id,
                "failed to generate chat title"
            );
        }

        Ok(reply)
    }

    /// Generates an image for the prompt and returns its URL.
    ///
    /// Stores the user prompt, asks the backend for TEXT+IMAGE output, and
    /// stores a `bot_image` message carrying the extracted URL. When the
    /// backend yields no usable image part the already-inserted prompt
    /// message remains without a paired reply; the gap is logged.
    ///
    /// # Errors
    ///
    /// Fails with `Unauthenticated`, `Validation` for an empty prompt,
    /// `Store`, or `GenerationFailed` when no usable image part is returned.
    pub async fn generate_image(
        &self,
        ctx: &CallContext,
        conversation_id: ConversationId,
        prompt: &str,
    ) -> Result<String, ServiceError> {
        let user_id = ctx.require_user()?;

        if prompt.is_empty() {
            return Err(ServiceError::Validation {
                reason: "image prompt must not be empty".to_string(),
            });
        }

        self.store
            .insert_message(&Message::user(conversation_id, user_id, prompt))
            .await?;

        let response = self
            .backend
            .generate_image(&ImageRequest::new(prompt))
            .await?;

        let Some(image_url) = response.image_url() else {
            tracing::warn!(
                conversation_id = %conversation_id,
                "image generation returned no usable image part; prompt message retained"
            );
            return Err(ServiceError::GenerationFailed {
                reason: "Failed to generate image".to_string(),
            });
        };

        self.store
            .insert_message(&Message::bot_image(
                conversation_id,
                user_id,
                prompt,
                &image_url,
            ))
            .await?;

        self.store
            .update_preview(
                conversation_id,
                IMAGE_PREVIEW,
                MessageRole::BotImage,
                Utc::now(),
            )
            .await?;

        Ok(image_url)
    }

    /// Best-effort title generation for conversations still on the default
    /// title. Callers swallow the error; this never fails the enclosing
    /// operation.
    async fn refresh_title(
        &self,
        conversation_id: ConversationId,
        first_message: &str,
    ) -> Result<(), ServiceError> {
        let Some(title) = self.store.get_title(conversation_id).await? else {
            return Ok(());
        };

        if !(title.is_empty() || title.starts_with(DEFAULT_TITLE)) {
            return Ok(());
        }

        let prompt = format!(
            "Generate a concise 3-5 word title for a chat based on this first \
             user message: \"{first_message}\". Respond with title only."
        );
        let response = self.backend.generate_text(&TextRequest::new(prompt)).await?;

        let generated = response.content.replace('"', "");
        let generated = generated.trim();
        if !generated.is_empty() {
            self.store.update_title(conversation_id, generated).await?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use async_trait::async_trait;
    use chrono::{DateTime, Duration, Utc};
    use murmur_ai::{
        GenAiError, ImagePart, ImageResponse, TextResponse, TokenUsage,
    };
    use murmur_core::UserId;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    /// In-memory conversation store for testing.
    #[derive(Default)]
    struct InMemoryStore {
        conversations: Mutex<Vec<Conversation>>,
        messages: Mutex<Vec<Message>>,
        writes: AtomicUsize,
        fail_writes: AtomicBool,
    }

    impl InMemoryStore {
        fn write_count(&self) -> usize {
            self.writes.load(Ordering::SeqCst)
        }

        fn fail_writes(&self) {
            self.fail_writes.store(true, Ordering::SeqCst);
        }

        fn record_write(&self) -> Result<(), StoreError> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(StoreError::QueryFailed {
                    reason: "injected failure".to_string(),
                });
            }
            self.writes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn messages_for(&self, conversation_id: ConversationId) -> Vec<Message> {
            self.messages
                .lock()
                .unwrap()
                .iter()
                .filter(|m| m.conversation_id == conversation_id)
                .cloned()
                .collect()
        }

        fn push_message(&self, message: Message) {
            self.messages.lock().unwrap().push(message);
        }
    }

    #[async_trait]
    impl ConversationStore for InMemoryStore {
        async fn insert_conversation(
            &self,
            conversation: &Conversation,
        ) -> Result<(), StoreError> {
            self.record_write()?;
            self.conversations.lock().unwrap().push(conversation.clone());
            Ok(())
        }

        async fn get_conversation(
            &self,
            id: ConversationId,
        ) -> Result<Option<Conversation>, StoreError> {
            Ok(self
                .conversations
                .lock()
                .unwrap()
                .iter()
                .find(|c| c.id == id)
                .cloned())
        }

        async fn list_conversations(
            &self,
            user_id: UserId,
        ) -> Result<Vec<Conversation>, StoreError> {
            let mut conversations: Vec<Conversation> = self
                .conversations
                .lock()
                .unwrap()
                .iter()
                .filter(|c| c.user_id == user_id)
                .cloned()
                .collect();
            conversations.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
            Ok(conversations)
        }

        async fn insert_message(&self, message: &Message) -> Result<(), StoreError> {
            self.record_write()?;
            self.messages.lock().unwrap().push(message.clone());
            Ok(())
        }

        async fn list_messages(
            &self,
            conversation_id: ConversationId,
        ) -> Result<Vec<Message>, StoreError> {
            let mut messages = self.messages_for(conversation_id);
            messages.sort_by_key(|m| m.created_at);
            Ok(messages)
        }

        async fn update_preview(
            &self,
            id: ConversationId,
            last_message: &str,
            last_message_role: MessageRole,
            updated_at: DateTime<Utc>,
        ) -> Result<(), StoreError> {
            self.record_write()?;
            if let Some(c) = self.conversations.lock().unwrap().iter_mut().find(|c| c.id == id) {
                c.last_message = Some(last_message.to_string());
                c.last_message_role = Some(last_message_role);
                c.updated_at = updated_at;
            }
            Ok(())
        }

        async fn get_title(&self, id: ConversationId) -> Result<Option<String>, StoreError> {
            Ok(self
                .conversations
                .lock()
                .unwrap()
                .iter()
                .find(|c| c.id == id)
                .map(|c| c.title.clone()))
        }

        async fn update_title(&self, id: ConversationId, title: &str) -> Result<(), StoreError> {
            self.record_write()?;
            if let Some(c) = self.conversations.lock().unwrap().iter_mut().find(|c| c.id == id) {
                c.title = title.to_string();
            }
            Ok(())
        }
    }

    /// Scripted generative backend for testing.
    #[derive(Default)]
    struct StubBackend {
        text_replies: Mutex<VecDeque<Result<String, GenAiError>>>,
        image_response: Mutex<Option<Result<ImageResponse, GenAiError>>>,
        text_calls: AtomicUsize,
    }

    impl StubBackend {
        fn queue_text(&self, reply: &str) {
            self.text_replies
                .lock()
                .unwrap()
                .push_back(Ok(reply.to_string()));
        }

        fn queue_text_failure(&self) {
            self.text_replies.lock().unwrap().push_back(Err(
                GenAiError::RequestFailed {
                    reason: "injected failure".to_string(),
                },
            ));
        }

        fn set_image_parts(&self, parts: Vec<ImagePart>) {
            *self.image_response.lock().unwrap() =
                Some(Ok(ImageResponse::new(parts, "stub-image-model")));
        }

        fn text_call_count(&self) -> usize {
            self.text_calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl GenerativeBackend for StubBackend {
        async fn generate_text(
            &self,
            _request: &TextRequest,
        ) -> Result<TextResponse, GenAiError> {
            self.text_calls.fetch_add(1, Ordering::SeqCst);
            let reply = self
                .text_replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(GenAiError::EmptyResponse))?;
            Ok(TextResponse {
                content: reply,
                model: "stub-text-model".to_string(),
                usage: TokenUsage::default(),
            })
        }

        async fn generate_image(
            &self,
            _request: &ImageRequest,
        ) -> Result<ImageResponse, GenAiError> {
            self.image_response
                .lock()
                .unwrap()
                .take()
                .unwrap_or(Err(GenAiError::EmptyResponse))
        }

        fn text_model(&self) -> &str {
            "stub-text-model"
        }

        fn image_model(&self) -> &str {
            "stub-image-model"
        }
    }

    struct Fixture {
        store: Arc<InMemoryStore>,
        backend: Arc<StubBackend>,
        service: ConversationService,
        ctx: CallContext,
        user_id: UserId,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(InMemoryStore::default());
        let backend = Arc::new(StubBackend::default());
        let service = ConversationService::new(store.clone(), backend.clone());
        let user_id = UserId::new();
        Fixture {
            store,
            backend,
            service,
            ctx: CallContext::authenticated(user_id),
            user_id,
        }
    }

    #[tokio::test]
    async fn create_conversation_defaults_title() {
        let f = fixture();

        let conversation = f
            .service
            .create_conversation(&f.ctx, None)
            .await
            .expect("should create");

        assert_eq!(conversation.title, "New chat");
        assert_eq!(conversation.user_id, f.user_id);
    }

    #[tokio::test]
    async fn create_conversation_keeps_explicit_title() {
        let f = fixture();

        let conversation = f
            .service
            .create_conversation(&f.ctx, Some("Trip planning".to_string()))
            .await
            .expect("should create");

        assert_eq!(conversation.title, "Trip planning");
    }

    #[tokio::test]
    async fn list_conversations_most_recent_first() {
        let f = fixture();

        let older = f
            .service
            .create_conversation(&f.ctx, Some("older".to_string()))
            .await
            .expect("create");
        let newer = f
            .service
            .create_conversation(&f.ctx, Some("newer".to_string()))
            .await
            .expect("create");

        // Bump the first conversation's activity past the second's.
        f.store
            .update_preview(
                older.id,
                "ping",
                MessageRole::Bot,
                Utc::now() + Duration::minutes(5),
            )
            .await
            .expect("update");

        let listed = f
            .service
            .list_conversations(&f.ctx)
            .await
            .expect("should list");
        let ids: Vec<_> = listed.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![older.id, newer.id]);
    }

    #[tokio::test]
    async fn list_conversations_scoped_to_caller() {
        let f = fixture();
        let other_ctx = CallContext::authenticated(UserId::new());

        f.service
            .create_conversation(&f.ctx, None)
            .await
            .expect("create");
        f.service
            .create_conversation(&other_ctx, None)
            .await
            .expect("create");

        let mine = f
            .service
            .list_conversations(&f.ctx)
            .await
            .expect("should list");
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].user_id, f.user_id);
    }

    #[tokio::test]
    async fn send_message_stores_user_then_bot_and_returns_reply() {
        let f = fixture();
        let conversation = f
            .service
            .create_conversation(&f.ctx, None)
            .await
            .expect("create");
        f.backend.queue_text("Hi there!");
        f.backend.queue_text("Quick Greeting"); // title pass

        let reply = f
            .service
            .send_message(&f.ctx, conversation.id, "Hello")
            .await
            .expect("should send");

        assert_eq!(reply, "Hi there!");

        let messages = f
            .service
            .list_messages(&f.ctx, conversation.id)
            .await
            .expect("should list");
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, MessageRole::User);
        assert_eq!(messages[0].content, "Hello");
        assert_eq!(messages[1].role, MessageRole::Bot);
        assert_eq!(messages[1].content, "Hi there!");
        assert!(messages[0].created_at <= messages[1].created_at);
    }

    #[tokio::test]
    async fn send_message_updates_preview() {
        let f = fixture();
        let conversation = f
            .service
            .create_conversation(&f.ctx, Some("Weather".to_string()))
            .await
            .expect("create");
        f.backend.queue_text("Sunny all week.");

        f.service
            .send_message(&f.ctx, conversation.id, "Forecast?")
            .await
            .expect("should send");

        let listed = f
            .service
            .list_conversations(&f.ctx)
            .await
            .expect("list");
        assert_eq!(listed[0].last_message.as_deref(), Some("Sunny all week."));
        assert_eq!(listed[0].last_message_role, Some(MessageRole::Bot));
        assert!(listed[0].updated_at > conversation.updated_at);
    }

    #[tokio::test]
    async fn send_message_generates_title_for_default_title() {
        let f = fixture();
        let conversation = f
            .service
            .create_conversation(&f.ctx, None)
            .await
            .expect("create");
        f.backend.queue_text("Hi there!");
        f.backend.queue_text("\"Friendly Greeting\"\n");

        f.service
            .send_message(&f.ctx, conversation.id, "Hello")
            .await
            .expect("should send");

        assert_eq!(f.backend.text_call_count(), 2);
        let title = f
            .store
            .get_title(conversation.id)
            .await
            .expect("get title");
        // Surrounding quotes and whitespace are stripped.
        assert_eq!(title.as_deref(), Some("Friendly Greeting"));
    }

    #[tokio::test]
    async fn send_message_generates_title_for_empty_title() {
        let f = fixture();
        let conversation = f
            .service
            .create_conversation(&f.ctx, Some(String::new()))
            .await
            .expect("create");
        f.backend.queue_text("Hi!");
        f.backend.queue_text("Short Title");

        f.service
            .send_message(&f.ctx, conversation.id, "Hello")
            .await
            .expect("should send");

        assert_eq!(f.backend.text_call_count(), 2);
        let title = f
            .store
            .get_title(conversation.id)
            .await
            .expect("get title");
        assert_eq!(title.as_deref(), Some("Short Title"));
    }

    #[tokio::test]
    async fn send_message_skips_title_for_custom_title() {
        let f = fixture();
        let conversation = f
            .service
            .create_conversation(&f.ctx, Some("Trip planning".to_string()))
            .await
            .expect("create");
        f.backend.queue_text("Pack light.");

        f.service
            .send_message(&f.ctx, conversation.id, "Any tips?")
            .await
            .expect("should send");

        assert_eq!(f.backend.text_call_count(), 1);
        let title = f
            .store
            .get_title(conversation.id)
            .await
            .expect("get title");
        assert_eq!(title.as_deref(), Some("Trip planning"));
    }

    #[tokio::test]
    async fn send_message_title_failure_is_swallowed() {
        let f = fixture();
        let conversation = f
            .service
            .create_conversation(&f.ctx, None)
            .await
            .expect("create");
        f.backend.queue_text("Hi there!");
        f.backend.queue_text_failure(); // title pass fails

        let reply = f
            .service
            .send_message(&f.ctx, conversation.id, "Hello")
            .await
            .expect("operation must not fail");

        assert_eq!(reply, "Hi there!");
        let title = f
            .store
            .get_title(conversation.id)
            .await
            .expect("get title");
        assert_eq!(title.as_deref(), Some("New chat"));
    }

    #[tokio::test]
    async fn send_message_blank_generated_title_not_persisted() {
        let f = fixture();
        let conversation = f
            .service
            .create_conversation(&f.ctx, None)
            .await
            .expect("create");
        f.backend.queue_text("Hi there!");
        f.backend.queue_text("\"\"");

        f.service
            .send_message(&f.ctx, conversation.id, "Hello")
            .await
            .expect("should send");

        let title = f
            .store
            .get_title(conversation.id)
            .await
            .expect("get title");
        assert_eq!(title.as_deref(), Some("New chat"));
    }

    #[tokio::test]
    async fn send_message_rejects_empty_content() {
        let f = fixture();
        let conversation = f
            .service
            .create_conversation(&f.ctx, None)
            .await
            .expect("create");
        let writes_before = f.store.write_count();

        let result = f.service.send_message(&f.ctx, conversation.id, "").await;

        assert!(matches!(result, Err(ServiceError::Validation { .. })));
        assert_eq!(f.store.write_count(), writes_before);
        assert_eq!(f.backend.text_call_count(), 0);
    }

    #[tokio::test]
    async fn send_message_store_failure_aborts_before_backend() {
        let f = fixture();
        let conversation = f
            .service
            .create_conversation(&f.ctx, None)
            .await
            .expect("create");
        f.store.fail_writes();

        let result = f
            .service
            .send_message(&f.ctx, conversation.id, "Hello")
            .await;

        assert!(matches!(result, Err(ServiceError::Store { .. })));
        assert_eq!(f.backend.text_call_count(), 0);
    }

    #[tokio::test]
    async fn send_message_backend_failure_leaves_user_message() {
        let f = fixture();
        let conversation = f
            .service
            .create_conversation(&f.ctx, None)
            .await
            .expect("create");
        f.backend.queue_text_failure();

        let result = f
            .service
            .send_message(&f.ctx, conversation.id, "Hello")
            .await;

        assert!(matches!(result, Err(ServiceError::GenerationFailed { .. })));
        // The user message prefix stays committed; no bot reply, no preview.
        let messages = f.store.messages_for(conversation.id);
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, MessageRole::User);
        let listed = f
            .service
            .list_conversations(&f.ctx)
            .await
            .expect("list");
        assert!(listed[0].last_message.is_none());
    }

    #[tokio::test]
    async fn list_messages_sorted_by_created_at() {
        let f = fixture();
        let conversation = f
            .service
            .create_conversation(&f.ctx, None)
            .await
            .expect("create");

        let mut late = Message::user(conversation.id, f.user_id, "second");
        late.created_at = Utc::now() + Duration::seconds(30);
        let mut early = Message::user(conversation.id, f.user_id, "first");
        early.created_at = Utc::now() - Duration::seconds(30);
        f.store.push_message(late);
        f.store.push_message(early);

        let messages = f
            .service
            .list_messages(&f.ctx, conversation.id)
            .await
            .expect("should list");
        let contents: Vec<_> = messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["first", "second"]);
    }

    #[tokio::test]
    async fn list_messages_rejects_foreign_conversation() {
        let f = fixture();
        let other_ctx = CallContext::authenticated(UserId::new());
        let foreign = f
            .service
            .create_conversation(&other_ctx, None)
            .await
            .expect("create");

        let result = f.service.list_messages(&f.ctx, foreign.id).await;

        assert!(matches!(result, Err(ServiceError::AccessDenied { .. })));
    }

    #[tokio::test]
    async fn list_messages_rejects_unknown_conversation() {
        let f = fixture();

        let result = f
            .service
            .list_messages(&f.ctx, ConversationId::new())
            .await;

        assert!(matches!(result, Err(ServiceError::AccessDenied { .. })));
    }

    #[tokio::test]
    async fn generate_image_with_inline_data() {
        let f = fixture();
        let conversation = f
            .service
            .create_conversation(&f.ctx, None)
            .await
            .expect("create");
        f.backend
            .set_image_parts(vec![ImagePart::inline("image/png", "AAAA")]);

        let image_url = f
            .service
            .generate_image(&f.ctx, conversation.id, "a red cat")
            .await
            .expect("should generate");

        assert_eq!(image_url, "data:image/png;base64,AAAA");

        let messages = f
            .service
            .list_messages(&f.ctx, conversation.id)
            .await
            .expect("list");
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, MessageRole::User);
        assert_eq!(messages[0].content, "a red cat");
        assert_eq!(messages[1].role, MessageRole::BotImage);
        assert_eq!(messages[1].content, "a red cat");
        assert_eq!(
            messages[1].image_url.as_deref(),
            Some("data:image/png;base64,AAAA")
        );

        let listed = f
            .service
            .list_conversations(&f.ctx)
            .await
            .expect("list");
        assert_eq!(listed[0].last_message.as_deref(), Some("[Image]"));
        assert_eq!(listed[0].last_message_role, Some(MessageRole::BotImage));
    }

    #[tokio::test]
    async fn generate_image_with_file_uri() {
        let f = fixture();
        let conversation = f
            .service
            .create_conversation(&f.ctx, None)
            .await
            .expect("create");
        f.backend
            .set_image_parts(vec![ImagePart::file("https://files.example/cat.png")]);

        let image_url = f
            .service
            .generate_image(&f.ctx, conversation.id, "a red cat")
            .await
            .expect("should generate");

        assert_eq!(image_url, "https://files.example/cat.png");
    }

    #[tokio::test]
    async fn generate_image_without_image_part_fails() {
        let f = fixture();
        let conversation = f
            .service
            .create_conversation(&f.ctx, None)
            .await
            .expect("create");
        f.backend
            .set_image_parts(vec![ImagePart::text("no can do")]);

        let result = f
            .service
            .generate_image(&f.ctx, conversation.id, "a red cat")
            .await;

        assert!(matches!(result, Err(ServiceError::GenerationFailed { .. })));
        // The prompt message stays; no bot_image row is ever inserted.
        let messages = f.store.messages_for(conversation.id);
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, MessageRole::User);
    }

    #[tokio::test]
    async fn generate_image_rejects_empty_prompt() {
        let f = fixture();
        let conversation = f
            .service
            .create_conversation(&f.ctx, None)
            .await
            .expect("create");
        let writes_before = f.store.write_count();

        let result = f.service.generate_image(&f.ctx, conversation.id, "").await;

        assert!(matches!(result, Err(ServiceError::Validation { .. })));
        assert_eq!(f.store.write_count(), writes_before);
    }

    #[tokio::test]
    async fn anonymous_caller_performs_no_writes() {
        let f = fixture();
        let ctx = CallContext::anonymous();
        let conversation_id = ConversationId::new();

        assert!(matches!(
            f.service.create_conversation(&ctx, None).await,
            Err(ServiceError::Unauthenticated)
        ));
        assert!(matches!(
            f.service.list_conversations(&ctx).await,
            Err(ServiceError::Unauthenticated)
        ));
        assert!(matches!(
            f.service.list_messages(&ctx, conversation_id).await,
            Err(ServiceError::Unauthenticated)
        ));
        assert!(matches!(
            f.service.send_message(&ctx, conversation_id, "Hello").await,
            Err(ServiceError::Unauthenticated)
        ));
        assert!(matches!(
            f.service
                .generate_image(&ctx, conversation_id, "a red cat")
                .await,
            Err(ServiceError::Unauthenticated)
        ));

        assert_eq!(f.store.write_count(), 0);
        assert_eq!(f.backend.text_call_count(), 0);
    }
}
