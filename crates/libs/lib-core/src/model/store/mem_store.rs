//! # In-Memory Session Store
//!
//! Process-lifetime storage behind a single `tokio::sync::RwLock`.
//! Sessions are indexed both by id and by token, so token lookups do not scan.

use super::{Message, Session, SessionForCreate, SessionForUpdate, SessionStore, StoreError, StoreResult};
use async_trait::async_trait;
use lib_utils::time::{Clock, SystemClock};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct Inner {
    /// session id -> session
    sessions: HashMap<String, Session>,
    /// session token -> session id
    tokens: HashMap<String, String>,
    /// session id -> messages in insertion order
    messages: HashMap<String, Vec<Message>>,
}

/// In-memory [`SessionStore`].
pub struct MemStore {
    inner: RwLock<Inner>,
    clock: Arc<dyn Clock>,
}

impl MemStore {
    /// Create an empty store on the wall clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create an empty store stamping records with `clock`.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
            clock,
        }
    }

    /// Number of sessions ever created.
    pub async fn session_count(&self) -> usize {
        self.inner.read().await.sessions.len()
    }
}

impl Default for MemStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for MemStore {
    async fn get_by_token(&self, token: &str) -> StoreResult<Option<Session>> {
        let inner = self.inner.read().await;
        Ok(inner
            .tokens
            .get(token)
            .and_then(|id| inner.sessions.get(id))
            .cloned())
    }

    async fn create(&self, session: SessionForCreate) -> StoreResult<Session> {
        let mut inner = self.inner.write().await;

        if inner.tokens.contains_key(&session.session_token) {
            return Err(StoreError::DuplicateToken);
        }

        let created = Session {
            id: Uuid::new_v4().to_string(),
            session_token: session.session_token,
            user_id: session.user_id,
            created_at: self.clock.now(),
            is_active: true,
        };

        inner.tokens.insert(created.session_token.clone(), created.id.clone());
        inner.messages.insert(created.id.clone(), Vec::new());
        inner.sessions.insert(created.id.clone(), created.clone());

        Ok(created)
    }

    async fn update(&self, token: &str, update: SessionForUpdate) -> StoreResult<Option<Session>> {
        let mut inner = self.inner.write().await;

        let Some(id) = inner.tokens.get(token).cloned() else {
            return Ok(None);
        };

        Ok(inner.sessions.get_mut(&id).map(|session| {
            update.apply(session);
            session.clone()
        }))
    }

    async fn append_message(&self, session_id: &str, content: &str, is_user: bool) -> StoreResult<Message> {
        let mut inner = self.inner.write().await;

        let messages = inner
            .messages
            .get_mut(session_id)
            .ok_or_else(|| StoreError::UnknownSession(session_id.to_string()))?;

        let message = Message {
            id: Uuid::new_v4().to_string(),
            session_id: session_id.to_string(),
            content: content.to_string(),
            is_user,
            timestamp: self.clock.now(),
        };
        messages.push(message.clone());

        Ok(message)
    }

    async fn list_messages(&self, session_id: &str) -> StoreResult<Vec<Message>> {
        let inner = self.inner.read().await;

        let mut messages = inner.messages.get(session_id).cloned().unwrap_or_default();
        // Stable: equal timestamps keep insertion order.
        messages.sort_by_key(|m| m.timestamp);

        Ok(messages)
    }
}

// region:    --- Tests
#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use lib_utils::time::ManualClock;

    #[tokio::test]
    async fn test_create_and_lookup_by_token() {
        let store = MemStore::new();

        let session = store
            .create(SessionForCreate::new("token-aaaaaaaaaa", Some("user-1".to_string())))
            .await
            .unwrap();

        assert!(session.is_active);
        assert_eq!(session.user_id.as_deref(), Some("user-1"));

        let found = store.get_by_token("token-aaaaaaaaaa").await.unwrap().unwrap();
        assert_eq!(found, session);
        assert!(store.get_by_token("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_token_is_rejected() {
        let store = MemStore::new();
        store.create(SessionForCreate::new("same-token-123", None)).await.unwrap();

        let err = store
            .create(SessionForCreate::new("same-token-123", None))
            .await
            .unwrap_err();

        assert_eq!(err, StoreError::DuplicateToken);
        assert_eq!(store.session_count().await, 1);
    }

    #[tokio::test]
    async fn test_update_merges_fields() {
        let store = MemStore::new();
        let session = store.create(SessionForCreate::new("token-bbbbbbbbbb", None)).await.unwrap();

        let updated = store
            .update("token-bbbbbbbbbb", SessionForUpdate::new().is_active(false))
            .await
            .unwrap()
            .unwrap();

        assert!(!updated.is_active);
        assert_eq!(updated.id, session.id);
        assert_eq!(updated.created_at, session.created_at);
        assert!(store
            .update("unknown", SessionForUpdate::new().is_active(false))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_messages_are_ordered_and_scoped() {
        let clock = Arc::new(ManualClock::default());
        let store = MemStore::with_clock(clock.clone());

        let first = store.create(SessionForCreate::new("token-first-000", None)).await.unwrap();
        let second = store.create(SessionForCreate::new("token-second-00", None)).await.unwrap();

        store.append_message(&first.id, "um", true).await.unwrap();
        clock.advance(Duration::seconds(1));
        store.append_message(&second.id, "outra sessão", true).await.unwrap();
        store.append_message(&first.id, "dois", false).await.unwrap();
        // Same instant as "dois": insertion order decides.
        store.append_message(&first.id, "três", true).await.unwrap();

        let contents: Vec<_> = store
            .list_messages(&first.id)
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.content)
            .collect();

        assert_eq!(contents, ["um", "dois", "três"]);
        assert_eq!(store.list_messages(&second.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_append_to_unknown_session_fails() {
        let store = MemStore::new();
        let err = store.append_message("nope", "hello", true).await.unwrap_err();
        assert_eq!(err, StoreError::UnknownSession("nope".to_string()));
    }
}
// endregion: --- Tests
