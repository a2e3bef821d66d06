use thiserror::Error;

#[derive(Error, Debug)]
pub enum EdupeakError {
    #[error("Chat error: {0}")]
    Chat(#[from] ChatError),

    #[error("Session not found: {0}")]
    SessionNotFound(String),
}

#[derive(Error, Debug, Clone)]
pub enum ProviderError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Missing API key: {0}")]
    MissingApiKey(String),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Migration error: {0}")]
    Migration(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Persisted state exists but cannot be parsed.
    #[error("Corrupt persisted state: {0}")]
    CorruptState(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file error: {0}")]
    File(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChatError {
    #[error("Nothing to send: message text is empty and no image is attached")]
    EmptyMessage,
}
