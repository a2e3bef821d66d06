use crate::message::Message;
use crate::session::ChatSession;

/// Ordered sessions (newest first) plus the id of the current one.
///
/// Every mutation keeps `current_id` pointing at a member whenever the
/// collection is non-empty. An empty collection only exists before
/// initialization; [`SessionCollection::ensure_session`] fills it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionCollection {
    sessions: Vec<ChatSession>,
    current_id: Option<String>,
}

/// What a successful delete did to the collection.
#[derive(Debug, Clone)]
pub struct Deletion {
    pub removed: ChatSession,
    /// Set when the collection became empty and a fresh session replaced it.
    pub replacement: Option<String>,
    pub current_changed: bool,
}

impl SessionCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a collection from persisted parts. A missing or stale
    /// `current_id` falls back to the first session.
    pub fn from_parts(sessions: Vec<ChatSession>, current_id: Option<String>) -> Self {
        let mut collection = Self {
            sessions,
            current_id,
        };
        let valid = collection
            .current_id
            .as_deref()
            .is_some_and(|id| collection.contains(id));
        if !valid {
            collection.current_id = collection.sessions.first().map(|s| s.id().to_string());
        }
        collection
    }

    pub fn sessions(&self) -> &[ChatSession] {
        &self.sessions
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn current_id(&self) -> Option<&str> {
        self.current_id.as_deref()
    }

    pub fn current(&self) -> Option<&ChatSession> {
        self.current_id.as_deref().and_then(|id| self.get(id))
    }

    pub fn get(&self, id: &str) -> Option<&ChatSession> {
        self.sessions.iter().find(|s| s.id() == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Resolves a full id or an unambiguous id prefix.
    pub fn find_by_prefix(&self, prefix: &str) -> Option<&ChatSession> {
        if prefix.is_empty() {
            return None;
        }
        if let Some(exact) = self.get(prefix) {
            return Some(exact);
        }
        let mut matches = self.sessions.iter().filter(|s| s.id().starts_with(prefix));
        match (matches.next(), matches.next()) {
            (Some(only), None) => Some(only),
            _ => None,
        }
    }

    /// Creates a default session if the collection is empty. Returns the new
    /// session's id when one was created.
    pub fn ensure_session(&mut self) -> Option<String> {
        if self.sessions.is_empty() {
            Some(self.create_session().id().to_string())
        } else {
            None
        }
    }

    /// Inserts a fresh session at the front and makes it current.
    pub fn create_session(&mut self) -> &ChatSession {
        let session = ChatSession::new();
        self.current_id = Some(session.id().to_string());
        self.sessions.insert(0, session);
        &self.sessions[0]
    }

    /// Makes `id` current. Unknown ids leave the collection untouched.
    pub fn select(&mut self, id: &str) -> bool {
        if !self.contains(id) {
            return false;
        }
        self.current_id = Some(id.to_string());
        true
    }

    pub fn delete(&mut self, id: &str) -> Option<Deletion> {
        let idx = self.sessions.iter().position(|s| s.id() == id)?;
        let removed = self.sessions.remove(idx);
        let was_current = self.current_id.as_deref() == Some(id);

        let replacement = self.ensure_session();
        if was_current && replacement.is_none() {
            self.current_id = self.sessions.first().map(|s| s.id().to_string());
        }

        Some(Deletion {
            removed,
            replacement,
            current_changed: was_current,
        })
    }

    pub fn append_message(&mut self, session_id: &str, message: Message) -> Option<&ChatSession> {
        let session = self.sessions.iter_mut().find(|s| s.id() == session_id)?;
        session.push(message);
        Some(&*session)
    }

    /// Renames a session. Returns `None` for unknown ids and for blank or
    /// unchanged titles.
    pub fn rename(&mut self, id: &str, title: &str) -> Option<&ChatSession> {
        let session = self.sessions.iter_mut().find(|s| s.id() == id)?;
        if session.rename(title) {
            Some(&*session)
        } else {
            None
        }
    }
}
