use edupeak_core::error::{ChatError, EdupeakError};
use edupeak_core::message::{ImageRef, Message};
use edupeak_core::responder::{ResponseRequest, Responder};
use edupeak_core::session::ChatSession;
use edupeak_storage::ChatSessionStore;
use std::sync::Arc;


/// Shown for an empty session. Display-only; never stored in the transcript.
pub const GREETING: &str = "Hello! I'm Cortex-AI, your personal learning assistant. I can help you \
     with complex topics and provide local examples to make learning easier. How can I help you today?";

/// Appended in place of a reply whenever the responder fails.
pub const FALLBACK_REPLY: &str =
    "I'm sorry, I'm having trouble connecting right now. Please try again in a moment.";

/// Result of one send.
#[derive(Debug, Clone)]
pub struct SendOutcome {
    /// The session after both messages were appended
    pub session: ChatSession,
    pub user_message: Message,
    pub reply: Message,
    /// `true` when `reply` is [`FALLBACK_REPLY`]
    pub fell_back: bool,
}

/// Drives a conversation: store plus reply strategy.
///
/// `send` takes `&mut self`, so a second send cannot start while one is
/// still waiting for its reply.
pub struct ChatService {
    store: ChatSessionStore,
    responder: Arc<dyn Responder>,
}

impl ChatService {
    pub fn new(store: ChatSessionStore, responder: Arc<dyn Responder>) -> Self {
        Self { store, responder }
    }

    pub fn store(&self) -> &ChatSessionStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut ChatSessionStore {
        &mut self.store
    }

    pub fn responder_name(&self) -> &str {
        self.responder.name()
    }

    /// Sends `text` (and optionally an image) in the current session.
    ///
    /// The user message is stored before the responder is asked. A responder
    /// failure never reaches the caller: exactly one [`FALLBACK_REPLY`] is
    /// appended instead.
    pub async fn send(
        &mut self,
        text: &str,
        image: Option<ImageRef>,
    ) -> Result<SendOutcome, EdupeakError> {
        let text = text.trim();
        if text.is_empty() && image.is_none() {
            return Err(ChatError::EmptyMessage.into());
        }

        let session_id = self.store.ensure_current().await.id().to_string();
        let user_message = match image {
            Some(image) => Message::new_user_with_image(text, image),
            None => Message::new_user(text),
        };

        let session = self
            .store
            .append_message(&session_id, user_message.clone())
            .await
            .ok_or_else(|| EdupeakError::SessionNotFound(session_id.clone()))?;
        let request = ResponseRequest::from_session(&session, &user_message);

        let (content, fell_back) = match self.responder.respond(&request).await {
            Ok(content) => (content, false),
            Err(e) => {
                tracing::warn!(
                    responder = self.responder.name(),
                    error = %e,
                    "reply failed, using fallback"
                );
                (FALLBACK_REPLY.to_string(), true)
            }
        };

        let reply = Message::new_assistant(content);
        let session = self
            .store
            .append_message(&session_id, reply.clone())
            .await
            .ok_or_else(|| EdupeakError::SessionNotFound(session_id.clone()))?;

        tracing::debug!(
            session = %session_id,
            messages = session.message_count(),
            fell_back,
            "exchange complete"
        );

        Ok(SendOutcome {
            session,
            user_message,
            reply,
            fell_back,
        })
    }
}
