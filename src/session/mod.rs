//! Conversation sessions and their persistence
//!
//! A [`SessionStore`] owns the ordered list of sessions and mirrors it to the
//! key-value store after every mutation. The whole list is re-serialized on
//! each flush; there is no delta persistence and the last writer wins.

use crate::error::{McpbotError, Result};
use crate::providers::{Message, ProviderKind, Role};
use crate::storage::{keys, KvStore};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Title shown until a session has enough messages to derive one
pub const DEFAULT_TITLE: &str = "New Chat";

/// Characters of the first user message kept in a derived title
pub const TITLE_MAX_CHARS: usize = 50;

/// One persisted conversation thread
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Session identifier
    pub id: String,
    /// Display title
    pub title: String,
    /// Messages in append order
    pub messages: Vec<Message>,
    /// When the session was created
    pub created_at: DateTime<Utc>,
    /// When a message was last appended
    pub updated_at: DateTime<Utc>,
}

impl Session {
    fn new(id: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            title: DEFAULT_TITLE.to_string(),
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Append a message, then refresh `title` and `updated_at`
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
        self.title = derive_title(&self.messages);
        self.updated_at = Utc::now();
    }
}

/// Derive a session title from its messages
///
/// With more than one message the title is the first user message cut to
/// [`TITLE_MAX_CHARS`] characters followed by `"..."`; otherwise, or when no
/// user message exists, it is [`DEFAULT_TITLE`].
///
/// # Examples
///
/// ```
/// use mcpbot::providers::Message;
/// use mcpbot::session::derive_title;
///
/// assert_eq!(derive_title(&[Message::user("Hello")]), "New Chat");
/// assert_eq!(
///     derive_title(&[Message::user("Hello"), Message::user("What's the weather?")]),
///     "Hello..."
/// );
/// ```
pub fn derive_title(messages: &[Message]) -> String {
    if messages.len() <= 1 {
        return DEFAULT_TITLE.to_string();
    }

    match messages.iter().find(|m| m.role == Role::User) {
        Some(first) => {
            let truncated: String = first.text.chars().take(TITLE_MAX_CHARS).collect();
            format!("{}...", truncated)
        }
        None => DEFAULT_TITLE.to_string(),
    }
}

/// Text of the assistant message seeded into new welcome sessions
pub fn welcome_text(assistant_name: &str, provider: Option<ProviderKind>) -> String {
    match provider {
        Some(kind) => format!(
            "Hello! I'm {}, your AI assistant powered by {}. How can I help you today?",
            assistant_name,
            kind.display_name()
        ),
        None => format!(
            "Hello! I'm {}, your intelligent AI assistant. Please set your API key to start chatting.",
            assistant_name
        ),
    }
}

/// In-memory session list mirrored to the key-value store
///
/// Mutations are written to storage before they are applied in memory, so a
/// failed write leaves the store unchanged.
pub struct SessionStore {
    store: KvStore,
    sessions: Vec<Session>,
    current: Option<String>,
    last_issued: i64,
}

impl SessionStore {
    /// Load the session list from storage
    ///
    /// The active session is restored from storage when it still exists,
    /// otherwise the first session is selected. An empty store yields an
    /// empty list with no active session.
    ///
    /// # Errors
    ///
    /// Returns `McpbotError::Storage` if the stored JSON cannot be decoded
    pub fn load(store: KvStore) -> Result<Self> {
        let sessions: Vec<Session> = match store.get(keys::SESSIONS)? {
            Some(json) => serde_json::from_str(&json).map_err(|e| {
                McpbotError::Storage(format!("Failed to decode stored sessions: {}", e))
            })?,
            None => Vec::new(),
        };

        let current = store
            .get(keys::CURRENT_SESSION)?
            .filter(|id| sessions.iter().any(|s| &s.id == id))
            .or_else(|| sessions.first().map(|s| s.id.clone()));

        let last_issued = sessions
            .iter()
            .filter_map(|s| s.id.parse::<i64>().ok())
            .max()
            .unwrap_or(0);

        tracing::debug!("Loaded {} sessions", sessions.len());

        Ok(Self {
            store,
            sessions,
            current,
            last_issued,
        })
    }

    /// All sessions, newest first
    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    /// Look up a session by id
    pub fn get(&self, id: &str) -> Option<&Session> {
        self.sessions.iter().find(|s| s.id == id)
    }

    /// The active session
    pub fn current(&self) -> Option<&Session> {
        self.current.as_deref().and_then(|id| self.get(id))
    }

    /// Id of the active session
    pub fn current_id(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Create a session at the front of the list and make it active
    ///
    /// When `welcome` is given the session is seeded with one assistant
    /// message carrying that text.
    pub fn create_session(&mut self, welcome: Option<&str>) -> Result<&Session> {
        let mut session = Session::new(self.next_session_id());
        if let Some(text) = welcome {
            session.push(Message::assistant(text));
        }

        let id = session.id.clone();
        let mut sessions = self.sessions.clone();
        sessions.insert(0, session);
        self.commit(sessions, Some(id.clone()))?;

        tracing::info!("Created session {}", id);
        Ok(&self.sessions[0])
    }

    /// Make `id` the active session
    ///
    /// # Errors
    ///
    /// Returns `McpbotError::SessionNotFound` for unknown ids
    pub fn select_session(&mut self, id: &str) -> Result<()> {
        if self.get(id).is_none() {
            return Err(McpbotError::SessionNotFound(id.to_string()).into());
        }
        self.commit(self.sessions.clone(), Some(id.to_string()))
    }

    /// Delete a session
    ///
    /// If the deleted session was active, the first remaining session becomes
    /// active; when none remain a fresh empty session is created.
    ///
    /// # Errors
    ///
    /// Returns `McpbotError::SessionNotFound` for unknown ids
    pub fn delete_session(&mut self, id: &str) -> Result<()> {
        let index = self
            .sessions
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| McpbotError::SessionNotFound(id.to_string()))?;

        let mut sessions = self.sessions.clone();
        sessions.remove(index);

        let current = if self.current.as_deref() != Some(id) {
            self.current.clone()
        } else if let Some(next) = sessions.first() {
            Some(next.id.clone())
        } else {
            let fresh = Session::new(self.next_session_id());
            let fresh_id = fresh.id.clone();
            sessions.push(fresh);
            tracing::info!("Created session {}", fresh_id);
            Some(fresh_id)
        };

        self.commit(sessions, current)?;
        tracing::info!("Deleted session {}", id);
        Ok(())
    }

    /// Append a message to the active session
    ///
    /// # Errors
    ///
    /// Returns `McpbotError::SessionNotFound` if no session is active
    pub fn append_message(&mut self, message: Message) -> Result<()> {
        let current = self.current.clone().unwrap_or_default();
        let index = self
            .sessions
            .iter()
            .position(|s| s.id == current)
            .ok_or_else(|| McpbotError::SessionNotFound(current.clone()))?;

        let mut sessions = self.sessions.clone();
        sessions[index].push(message);
        self.commit(sessions, self.current.clone())
    }

    /// Serialize the full session list and active id to storage
    pub fn flush(&self) -> Result<()> {
        Self::persist(&self.store, &self.sessions, self.current.as_deref())
    }

    fn commit(&mut self, sessions: Vec<Session>, current: Option<String>) -> Result<()> {
        Self::persist(&self.store, &sessions, current.as_deref())?;
        self.sessions = sessions;
        self.current = current;
        Ok(())
    }

    fn persist(store: &KvStore, sessions: &[Session], current: Option<&str>) -> Result<()> {
        let json = serde_json::to_string(sessions)?;
        store.set(keys::SESSIONS, &json)?;
        match current {
            Some(id) => store.set(keys::CURRENT_SESSION, id)?,
            None => store.remove(keys::CURRENT_SESSION)?,
        }
        tracing::debug!("Flushed {} sessions", sessions.len());
        Ok(())
    }

    /// Timestamp-derived id, strictly greater than any id issued or loaded
    fn next_session_id(&mut self) -> String {
        let id = Utc::now().timestamp_millis().max(self.last_issued + 1);
        self.last_issued = id;
        id.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::assert_error_contains;
    use tempfile::tempdir;

    fn create_test_sessions() -> (SessionStore, KvStore, tempfile::TempDir) {
        let dir = tempdir().expect("failed to create tempdir");
        let store = KvStore::open(dir.path().join("store")).expect("open failed");
        let sessions = SessionStore::load(store.clone()).expect("load failed");
        (sessions, store, dir)
    }

    #[test]
    fn test_load_empty_store() {
        let (sessions, _store, _dir) = create_test_sessions();
        assert!(sessions.sessions().is_empty());
        assert!(sessions.current().is_none());
    }

    #[test]
    fn test_title_unchanged_with_single_message() {
        let (mut sessions, _store, _dir) = create_test_sessions();
        sessions.create_session(None).unwrap();
        sessions.append_message(Message::user("Hello")).unwrap();

        assert_eq!(sessions.current().unwrap().title, "New Chat");
    }

    #[test]
    fn test_title_derived_from_first_user_message() {
        let (mut sessions, _store, _dir) = create_test_sessions();
        sessions.create_session(None).unwrap();
        sessions.append_message(Message::user("Hello")).unwrap();
        sessions
            .append_message(Message::user("What's the weather?"))
            .unwrap();

        assert_eq!(sessions.current().unwrap().title, "Hello...");
    }

    #[test]
    fn test_title_truncated_to_fifty_chars() {
        let long = "a".repeat(80);
        let title = derive_title(&[Message::assistant("welcome"), Message::user(long)]);
        assert_eq!(title, format!("{}...", "a".repeat(50)));
    }

    #[test]
    fn test_title_truncation_respects_char_boundaries() {
        let text = "é".repeat(60);
        let title = derive_title(&[Message::user(text), Message::assistant("ok")]);
        assert_eq!(title.chars().count(), 53);
    }

    #[test]
    fn test_title_placeholder_without_user_message() {
        let title = derive_title(&[Message::assistant("a"), Message::assistant("b")]);
        assert_eq!(title, DEFAULT_TITLE);
    }

    #[test]
    fn test_append_refreshes_updated_at() {
        let (mut sessions, _store, _dir) = create_test_sessions();
        sessions.create_session(None).unwrap();
        let before = sessions.current().unwrap().updated_at;

        std::thread::sleep(std::time::Duration::from_millis(5));
        sessions.append_message(Message::user("hi")).unwrap();

        assert!(sessions.current().unwrap().updated_at > before);
    }

    #[test]
    fn test_create_session_with_welcome() {
        let (mut sessions, _store, _dir) = create_test_sessions();
        let session = sessions.create_session(Some("Welcome!")).unwrap();

        assert_eq!(session.messages.len(), 1);
        assert_eq!(session.messages[0].role, Role::Assistant);
        assert_eq!(session.messages[0].text, "Welcome!");
        assert_eq!(session.title, DEFAULT_TITLE);
    }

    #[test]
    fn test_new_sessions_are_prepended_and_active() {
        let (mut sessions, _store, _dir) = create_test_sessions();
        let first = sessions.create_session(None).unwrap().id.clone();
        let second = sessions.create_session(None).unwrap().id.clone();

        assert_ne!(first, second);
        assert_eq!(sessions.sessions()[0].id, second);
        assert_eq!(sessions.current_id(), Some(second.as_str()));
    }

    #[test]
    fn test_select_unknown_session_fails() {
        let (mut sessions, _store, _dir) = create_test_sessions();
        sessions.create_session(None).unwrap();
        assert_error_contains(sessions.select_session("nope"), "Session not found");
    }

    #[test]
    fn test_delete_only_session_creates_fresh_one() {
        let (mut sessions, _store, _dir) = create_test_sessions();
        let id = sessions.create_session(Some("Welcome!")).unwrap().id.clone();

        sessions.delete_session(&id).unwrap();

        assert_eq!(sessions.sessions().len(), 1);
        let fresh = sessions.current().unwrap();
        assert!(fresh.messages.is_empty());
        assert_eq!(fresh.title, DEFAULT_TITLE);
    }

    #[test]
    fn test_replacement_session_never_reuses_deleted_id() {
        let (mut sessions, _store, _dir) = create_test_sessions();
        let mut id = sessions.create_session(Some("Welcome!")).unwrap().id.clone();

        for _ in 0..200 {
            sessions.delete_session(&id).unwrap();
            let fresh = sessions.current_id().unwrap().to_string();
            assert_ne!(fresh, id);
            id = fresh;
        }
        assert_eq!(sessions.sessions().len(), 1);
    }

    #[test]
    fn test_ids_stay_ahead_of_loaded_sessions() {
        let (_, store, _dir) = create_test_sessions();
        let future = (Utc::now().timestamp_millis() + 60_000).to_string();
        let mut seeded = Session::new(future.clone());
        seeded.push(Message::assistant("Welcome!"));
        store
            .set(keys::SESSIONS, &serde_json::to_string(&[seeded]).unwrap())
            .unwrap();
        let mut sessions = SessionStore::load(store).unwrap();

        let id = sessions.create_session(None).unwrap().id.clone();
        assert!(id.parse::<i64>().unwrap() > future.parse::<i64>().unwrap());
    }

    #[test]
    fn test_failed_write_leaves_sessions_unchanged() {
        let (mut sessions, store, _dir) = create_test_sessions();
        let id = sessions.create_session(Some("Welcome!")).unwrap().id.clone();
        let before = sessions.sessions().to_vec();

        store.set_reject_writes(true);
        assert!(sessions.create_session(None).is_err());
        assert!(sessions.delete_session(&id).is_err());
        assert!(sessions.append_message(Message::user("hi")).is_err());
        store.set_reject_writes(false);

        assert_eq!(sessions.sessions(), before.as_slice());
        assert_eq!(sessions.current_id(), Some(id.as_str()));
        let reloaded = SessionStore::load(store).unwrap();
        assert_eq!(reloaded.sessions(), before.as_slice());
    }

    #[test]
    fn test_delete_active_selects_next_available() {
        let (mut sessions, _store, _dir) = create_test_sessions();
        let older = sessions.create_session(None).unwrap().id.clone();
        let newer = sessions.create_session(None).unwrap().id.clone();

        sessions.delete_session(&newer).unwrap();

        assert_eq!(sessions.current_id(), Some(older.as_str()));
        assert_eq!(sessions.sessions().len(), 1);
    }

    #[test]
    fn test_delete_background_keeps_active() {
        let (mut sessions, _store, _dir) = create_test_sessions();
        let older = sessions.create_session(None).unwrap().id.clone();
        let newer = sessions.create_session(None).unwrap().id.clone();

        sessions.delete_session(&older).unwrap();

        assert_eq!(sessions.current_id(), Some(newer.as_str()));
    }

    #[test]
    fn test_append_without_active_session_fails() {
        let (mut sessions, _store, _dir) = create_test_sessions();
        assert!(sessions.append_message(Message::user("hi")).is_err());
    }

    #[test]
    fn test_roundtrip_through_storage() {
        let (mut sessions, store, _dir) = create_test_sessions();
        sessions.create_session(Some("Welcome!")).unwrap();
        sessions.append_message(Message::user("first")).unwrap();
        sessions.append_message(Message::system("rules")).unwrap();
        sessions.append_message(Message::assistant("reply")).unwrap();
        let background = sessions.create_session(None).unwrap().id.clone();
        let active = sessions.sessions()[1].id.clone();
        sessions.select_session(&active).unwrap();

        let reloaded = SessionStore::load(store).unwrap();

        assert_eq!(reloaded.sessions(), sessions.sessions());
        assert_eq!(reloaded.current_id(), Some(active.as_str()));
        assert!(reloaded.get(&background).is_some());
    }

    #[test]
    fn test_persisted_json_uses_date_strings() {
        let (mut sessions, store, _dir) = create_test_sessions();
        sessions.create_session(Some("Welcome!")).unwrap();

        let raw = store.get(keys::SESSIONS).unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        let created = value[0]["createdAt"].as_str().unwrap();
        assert!(DateTime::parse_from_rfc3339(created).is_ok());
        assert!(value[0]["messages"][0]["timestamp"].is_string());
        assert_eq!(value[0]["messages"][0]["role"], "assistant");
    }

    #[test]
    fn test_load_rejects_corrupt_json() {
        let dir = tempdir().unwrap();
        let store = KvStore::open(dir.path().join("store")).unwrap();
        store.set(keys::SESSIONS, "not json").unwrap();

        assert!(SessionStore::load(store).is_err());
    }

    #[test]
    fn test_welcome_text_depends_on_provider() {
        let configured = welcome_text("MCP Bot", Some(ProviderKind::Gemini));
        let unconfigured = welcome_text("MCP Bot", None);

        assert!(configured.contains("Gemini"));
        assert!(unconfigured.contains("API key"));
        assert_ne!(configured, unconfigured);
    }
}
