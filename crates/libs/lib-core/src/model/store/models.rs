use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use shared::{ChatMessageDto, SessionInfo};

/// Chat session entity, one logical conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    pub session_token: String,
    pub user_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub is_active: bool,
}

impl Session {
    /// Time elapsed since creation.
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now - self.created_at
    }

    /// Whether the session is older than `ttl` at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        self.age(now) > ttl
    }

    /// Active and not expired.
    pub fn is_usable(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        self.is_active && !self.is_expired(now, ttl)
    }
}

impl From<&Session> for SessionInfo {
    fn from(session: &Session) -> Self {
        SessionInfo {
            id: session.id.clone(),
            created_at: session.created_at,
            is_active: session.is_active,
        }
    }
}

/// Data structure for creating a new session.
///
/// The store assigns `id`, `created_at` and `is_active`.
#[derive(Debug, Clone)]
pub struct SessionForCreate {
    pub session_token: String,
    pub user_id: Option<String>,
}

impl SessionForCreate {
    /// Create a new `SessionForCreate` instance.
    pub fn new(session_token: impl Into<String>, user_id: Option<String>) -> Self {
        Self {
            session_token: session_token.into(),
            user_id,
        }
    }
}

/// Data structure for updating an existing session.
///
/// All fields are optional - only provided fields will be updated.
#[derive(Debug, Clone, Default)]
pub struct SessionForUpdate {
    pub is_active: Option<bool>,
}

impl SessionForUpdate {
    /// Create a new empty `SessionForUpdate` instance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the active flag.
    pub fn is_active(mut self, is_active: bool) -> Self {
        self.is_active = Some(is_active);
        self
    }

    pub(crate) fn apply(&self, session: &mut Session) {
        if let Some(is_active) = self.is_active {
            session.is_active = is_active;
        }
    }
}

/// Chat message entity. Immutable once stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub session_id: String,
    pub content: String,
    pub is_user: bool,
    pub timestamp: DateTime<Utc>,
}

impl From<Message> for ChatMessageDto {
    fn from(message: Message) -> Self {
        ChatMessageDto {
            id: message.id,
            session_id: message.session_id,
            content: message.content,
            is_user: message.is_user,
            timestamp: message.timestamp,
        }
    }
}
