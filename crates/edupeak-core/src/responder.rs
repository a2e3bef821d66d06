use async_trait::async_trait;

use crate::error::ProviderError;
use crate::message::{ImageRef, Message};
use crate::session::ChatSession;

/// Everything a reply strategy may look at: the latest user message and,
/// for "explain simpler" follow-ups, the assistant message right before it.
/// No wider history is exposed.
#[derive(Debug, Clone, Default)]
pub struct ResponseRequest {
    pub text: String,
    pub image: Option<ImageRef>,
    pub previous_reply: Option<String>,
}

impl ResponseRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    /// Builds a request for `latest`, taking the lookback reply from
    /// `session` as it was before `latest` was appended.
    pub fn from_session(session: &ChatSession, latest: &Message) -> Self {
        Self {
            text: latest.content.clone(),
            image: latest.image.clone(),
            previous_reply: session
                .last_assistant_message()
                .map(|m| m.content.clone()),
        }
    }
}

#[async_trait]
pub trait Responder: Send + Sync {
    async fn respond(&self, request: &ResponseRequest) -> Result<String, ProviderError>;

    /// Short label for logs and the CLI banner.
    fn name(&self) -> &str;
}
