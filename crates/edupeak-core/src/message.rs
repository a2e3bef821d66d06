use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    User,
    Assistant,
}

/// An image the student attached to a message. Only the reference is kept;
/// the bytes never enter the transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRef {
    pub file_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
}

impl ImageRef {
    pub fn new(file_name: impl Into<String>) -> Self {
        let file_name = file_name.into();
        let media_type = guess_media_type(&file_name).map(str::to_string);
        Self {
            file_name,
            media_type,
        }
    }
}

fn guess_media_type(file_name: &str) -> Option<&'static str> {
    let ext = file_name.rsplit_once('.')?.1.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "bmp" => Some("image/bmp"),
        "svg" => Some("image/svg+xml"),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub role: MessageRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageRef>,
}

impl Message {
    pub fn new_user(content: impl Into<String>) -> Self {
        Self::build(MessageRole::User, content.into(), None)
    }

    pub fn new_user_with_image(content: impl Into<String>, image: ImageRef) -> Self {
        Self::build(MessageRole::User, content.into(), Some(image))
    }

    pub fn new_assistant(content: impl Into<String>) -> Self {
        Self::build(MessageRole::Assistant, content.into(), None)
    }

    fn build(role: MessageRole, content: String, image: Option<ImageRef>) -> Self {
        Self {
            id: uuid::Uuid::now_v7().to_string(),
            role,
            content,
            timestamp: Utc::now(),
            image,
        }
    }

    pub fn is_user(&self) -> bool {
        self.role == MessageRole::User
    }

    pub fn is_assistant(&self) -> bool {
        self.role == MessageRole::Assistant
    }
}
