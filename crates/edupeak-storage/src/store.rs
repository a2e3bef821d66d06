use edupeak_core::collection::SessionCollection;
use edupeak_core::config::{StorageConfig, DEFAULT_CURRENT_KEY, DEFAULT_SESSIONS_KEY};
use edupeak_core::error::StorageError;
use edupeak_core::message::Message;
use edupeak_core::session::ChatSession;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::kv::KeyValueStore;

const EVENT_CAPACITY: usize = 64;

/// Where the session array and the current id live in the key-value store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageKeys {
    pub sessions: String,
    pub current: String,
}

impl StorageKeys {
    pub fn from_config(config: &StorageConfig) -> Self {
        Self {
            sessions: config.sessions_key.clone(),
            current: config.current_key.clone(),
        }
    }
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self {
            sessions: DEFAULT_SESSIONS_KEY.into(),
            current: DEFAULT_CURRENT_KEY.into(),
        }
    }
}

/// Change notifications for whatever renders the sessions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    SessionCreated { id: String },
    SessionSelected { id: String },
    SessionDeleted { id: String, current: Option<String> },
    SessionRenamed { id: String, title: String },
    MessageAppended { session_id: String, message_id: String },
}

pub fn encode_sessions(sessions: &[ChatSession]) -> Result<String, StorageError> {
    serde_json::to_string(sessions).map_err(|e| StorageError::Serialization(e.to_string()))
}

pub fn decode_sessions(raw: &str) -> Result<Vec<ChatSession>, StorageError> {
    serde_json::from_str(raw).map_err(|e| StorageError::CorruptState(e.to_string()))
}

/// The persisted chat sessions plus an in-memory view of them.
///
/// Reads are served from memory. Every mutation updates memory first and
/// then rewrites the whole collection through the [`KeyValueStore`]; a failed
/// write is logged and the in-memory view stays authoritative. After
/// [`ChatSessionStore::open`] the collection is never empty.
pub struct ChatSessionStore {
    kv: Arc<dyn KeyValueStore>,
    keys: StorageKeys,
    collection: SessionCollection,
    events: broadcast::Sender<StoreEvent>,
}

impl ChatSessionStore {
    /// Loads persisted sessions, starting fresh if they are missing or
    /// unreadable, and creates a default session when there are none.
    pub async fn open(kv: Arc<dyn KeyValueStore>, keys: StorageKeys) -> Self {
        let mut collection = match Self::load_all(kv.as_ref(), &keys).await {
            Ok(collection) => collection,
            Err(e) => {
                warn!(error = %e, key = %keys.sessions, "discarding persisted chat sessions");
                SessionCollection::new()
            }
        };

        let created = collection.ensure_session();
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let store = Self {
            kv,
            keys,
            collection,
            events,
        };

        if let Some(id) = created {
            debug!(session = %id, "created initial chat session");
            store.persist().await;
        }
        debug!(sessions = store.collection.len(), "chat session store ready");
        store
    }

    /// Reads the persisted collection. An absent value yields an empty
    /// collection; an unparsable one yields [`StorageError::CorruptState`].
    pub async fn load_all(
        kv: &dyn KeyValueStore,
        keys: &StorageKeys,
    ) -> Result<SessionCollection, StorageError> {
        let sessions = match kv.get(&keys.sessions).await? {
            Some(raw) => decode_sessions(&raw)?,
            None => return Ok(SessionCollection::new()),
        };

        let current = match kv.get(&keys.current).await {
            Ok(Some(raw)) => serde_json::from_str::<String>(&raw).ok(),
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, "could not read current session id");
                None
            }
        };

        Ok(SessionCollection::from_parts(sessions, current))
    }

    /// Rewrites the full collection. Last write wins.
    pub async fn save_all(&self) -> Result<(), StorageError> {
        let sessions = encode_sessions(self.collection.sessions())?;
        self.kv.set(&self.keys.sessions, &sessions).await?;

        match self.collection.current_id() {
            Some(id) => {
                let current = serde_json::to_string(id)
                    .map_err(|e| StorageError::Serialization(e.to_string()))?;
                self.kv.set(&self.keys.current, &current).await?;
            }
            None => self.kv.remove(&self.keys.current).await?,
        }
        Ok(())
    }

    async fn persist(&self) {
        if let Err(e) = self.save_all().await {
            warn!(error = %e, "failed to persist chat sessions");
        }
    }

    fn emit(&self, event: StoreEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    pub fn sessions(&self) -> &[ChatSession] {
        self.collection.sessions()
    }

    pub fn current(&self) -> Option<&ChatSession> {
        self.collection.current()
    }

    pub fn current_id(&self) -> Option<&str> {
        self.collection.current_id()
    }

    pub fn get(&self, id: &str) -> Option<&ChatSession> {
        self.collection.get(id)
    }

    pub fn find_by_prefix(&self, prefix: &str) -> Option<&ChatSession> {
        self.collection.find_by_prefix(prefix)
    }

    /// Owned copy of the whole collection.
    pub fn snapshot(&self) -> SessionCollection {
        self.collection.clone()
    }

    pub async fn create_session(&mut self) -> ChatSession {
        let session = self.collection.create_session().clone();
        debug!(session = %session.id(), "created chat session");
        self.persist().await;
        self.emit(StoreEvent::SessionCreated {
            id: session.id().to_string(),
        });
        session
    }

    /// Returns `false` (and changes nothing) for unknown ids.
    pub async fn select_session(&mut self, id: &str) -> bool {
        if !self.collection.select(id) {
            debug!(session = %id, "ignoring select of unknown session");
            return false;
        }
        self.persist().await;
        self.emit(StoreEvent::SessionSelected { id: id.to_string() });
        true
    }

    /// Returns `false` (and changes nothing) for unknown ids.
    pub async fn delete_session(&mut self, id: &str) -> bool {
        let Some(deletion) = self.collection.delete(id) else {
            debug!(session = %id, "ignoring delete of unknown session");
            return false;
        };
        debug!(
            session = %id,
            messages = deletion.removed.message_count(),
            "deleted chat session"
        );
        self.persist().await;

        if let Some(replacement) = deletion.replacement {
            self.emit(StoreEvent::SessionCreated { id: replacement });
        }
        self.emit(StoreEvent::SessionDeleted {
            id: id.to_string(),
            current: self.collection.current_id().map(str::to_string),
        });
        true
    }

    /// Appends to `session_id` and returns the updated session, or `None` if
    /// no such session exists.
    pub async fn append_message(
        &mut self,
        session_id: &str,
        message: Message,
    ) -> Option<ChatSession> {
        let Some(title_before) = self.collection.get(session_id).map(|s| s.title().to_string())
        else {
            debug!(session = %session_id, "ignoring append to unknown session");
            return None;
        };
        let message_id = message.id.clone();
        let session = self.collection.append_message(session_id, message)?.clone();
        self.persist().await;

        self.emit(StoreEvent::MessageAppended {
            session_id: session_id.to_string(),
            message_id,
        });
        if session.title() != title_before {
            self.emit(StoreEvent::SessionRenamed {
                id: session_id.to_string(),
                title: session.title().to_string(),
            });
        }
        Some(session)
    }

    pub async fn rename_session(&mut self, id: &str, title: &str) -> Option<ChatSession> {
        let session = self.collection.rename(id, title)?.clone();
        self.persist().await;
        self.emit(StoreEvent::SessionRenamed {
            id: id.to_string(),
            title: session.title().to_string(),
        });
        Some(session)
    }

    /// Guarantees a current session exists, creating one if needed.
    pub async fn ensure_current(&mut self) -> ChatSession {
        match self.collection.current() {
            Some(session) => session.clone(),
            None => self.create_session().await,
        }
    }
}
