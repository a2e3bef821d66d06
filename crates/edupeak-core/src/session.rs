use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::message::Message;

pub const DEFAULT_TITLE: &str = "New Chat";

/// Titles and previews are cut to this many characters.
pub const TITLE_MAX_CHARS: usize = 30;

const ELLIPSIS: &str = "...";

/// A titled transcript. Messages are only ever appended; the title changes
/// once automatically (on the first user message) and otherwise only through
/// an explicit rename.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSession {
    id: String,
    title: String,
    #[serde(default)]
    messages: Vec<Message>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ChatSession {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::now_v7().to_string(),
            title: DEFAULT_TITLE.into(),
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn has_default_title(&self) -> bool {
        self.title == DEFAULT_TITLE
    }

    /// Short excerpt of the first user message, for session lists.
    pub fn preview(&self) -> Option<String> {
        self.messages
            .iter()
            .find(|m| m.is_user() && !m.content.trim().is_empty())
            .map(|m| truncate_with_ellipsis(m.content.trim(), TITLE_MAX_CHARS))
    }

    pub fn last_assistant_message(&self) -> Option<&Message> {
        self.messages.iter().rev().find(|m| m.is_assistant())
    }

    /// Appends `message`. Returns `true` when this append also derived the
    /// session title.
    pub(crate) fn push(&mut self, message: Message) -> bool {
        let derive_title = is_titling(&message)
            && self.has_default_title()
            && !self.messages.iter().any(is_titling);

        if derive_title {
            self.title = truncate_with_ellipsis(message.content.trim(), TITLE_MAX_CHARS);
        }
        self.updated_at = message.timestamp.max(self.updated_at);
        self.messages.push(message);
        derive_title
    }

    pub(crate) fn rename(&mut self, title: &str) -> bool {
        let title = title.trim();
        if title.is_empty() || title == self.title {
            return false;
        }
        self.title = title.to_string();
        self.updated_at = Utc::now();
        true
    }
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

/// A user message with text; image-only or blank messages never title a session.
fn is_titling(message: &Message) -> bool {
    message.is_user() && !message.content.trim().is_empty()
}

/// Cuts `text` to `max_chars` characters and appends `...` when anything was
/// dropped. Counts `char`s, so multi-byte text is never split mid-character.
pub fn truncate_with_ellipsis(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}{ELLIPSIS}", &text[..byte_idx]),
        None => text.to_string(),
    }
}
