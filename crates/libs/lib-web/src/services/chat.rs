//! # Chat Service
//!
//! Session lifecycle and message persistence on top of a [`SessionStore`].
//!
//! ## Overview
//!
//! The service owns the session rules the store knows nothing about:
//!
//! - **Tokens**: every new session gets a fresh UUID v4 token
//! - **Anonymous users**: sessions created without a user id get `anonymous_<millis>_<9 base36>`
//! - **Expiry**: a session older than the TTL is marked inactive the next time it is validated
//! - **Error hiding**: store failures surface as generic [`AppError::Storage`] messages
//!
//! Validity checks and the expiry write run under one async mutex, so two requests
//! carrying the same stale token cannot both observe it as live.
//!
//! ## Usage
//!
//! ```rust
//! use lib_core::MemStore;
//! use lib_utils::time::SystemClock;
//! use lib_web::services::ChatService;
//! use std::sync::Arc;
//!
//! # async fn example() -> lib_core::Result<()> {
//! let service = ChatService::new(Arc::new(MemStore::new()), Arc::new(SystemClock), chrono::Duration::hours(24));
//!
//! let session = service.get_or_create_session(None, None).await?;
//! service.add_message(&session.id, "Quero vender mais", true).await?;
//! assert!(service.validate_session(&session.session_token).await);
//! # Ok(())
//! # }
//! ```

use chrono::Duration;
use lib_core::{AppError, Message, Result, Session, SessionForCreate, SessionForUpdate, SessionStore};
use lib_utils::time::Clock;
use rand::Rng;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

const ANON_SUFFIX_LEN: usize = 9;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Service for chat sessions and messages.
pub struct ChatService {
    store: Arc<dyn SessionStore>,
    clock: Arc<dyn Clock>,
    session_ttl: Duration,
    /// Serialises validity read-check-write.
    session_gate: Mutex<()>,
}

impl ChatService {
    /// Create a new chat service.
    ///
    /// # Arguments
    ///
    /// * `store` - Session and message storage
    /// * `clock` - Time source for expiry checks
    /// * `session_ttl` - Age after which a session expires
    pub fn new(store: Arc<dyn SessionStore>, clock: Arc<dyn Clock>, session_ttl: Duration) -> Self {
        Self {
            store,
            clock,
            session_ttl,
            session_gate: Mutex::new(()),
        }
    }

    /// Create a fresh session with a new token.
    #[instrument(skip(self))]
    pub async fn create_session(&self, user_id: Option<String>) -> Result<Session> {
        let has_user = user_id.is_some();
        let user_id = user_id.unwrap_or_else(|| anonymous_user_id(self.clock.now().timestamp_millis()));
        let token = Uuid::new_v4().to_string();

        let session = self
            .store
            .create(SessionForCreate::new(token, Some(user_id)))
            .await
            .map_err(|e| {
                error!(error = %e, "[CHAT] Failed to create session");
                AppError::Storage("Falha ao criar sessão de chat".to_string())
            })?;

        info!(
            session_id = %session.id,
            anonymous = !has_user,
            "[CHAT] Session created"
        );

        Ok(session)
    }

    /// Resolve `token` to a live session, or create a new one.
    #[instrument(skip(self, token), fields(has_token = token.is_some()))]
    pub async fn get_or_create_session(
        &self,
        token: Option<&str>,
        user_id: Option<String>,
    ) -> Result<Session> {
        let _gate = self.session_gate.lock().await;

        if let Some(token) = token {
            if let Some(session) = self.check_session(token).await {
                debug!(session_id = %session.id, "[CHAT] Reusing session");
                return Ok(session);
            }
        }

        self.create_session(user_id).await
    }

    /// Whether `token` names an active, unexpired session.
    ///
    /// Expired sessions are marked inactive as a side effect. Store failures yield `false`.
    pub async fn validate_session(&self, token: &str) -> bool {
        let _gate = self.session_gate.lock().await;
        self.check_session(token).await.is_some()
    }

    /// Look a session up without validity checks.
    pub async fn find_session(&self, token: &str) -> Result<Option<Session>> {
        self.store.get_by_token(token).await.map_err(|e| {
            error!(error = %e, "[CHAT] Failed to load session");
            AppError::Storage("Falha ao recuperar sessão de chat".to_string())
        })
    }

    /// Persist a message under `session_id`.
    #[instrument(skip(self, content), fields(content_len = content.chars().count()))]
    pub async fn add_message(&self, session_id: &str, content: &str, is_user: bool) -> Result<Message> {
        let message = self
            .store
            .append_message(session_id, content, is_user)
            .await
            .map_err(|e| {
                error!(error = %e, "[CHAT] Failed to add message");
                AppError::Storage("Falha ao salvar mensagem".to_string())
            })?;

        info!(message_id = %message.id, "[CHAT] Message added");
        Ok(message)
    }

    /// Messages of a session, oldest first.
    pub async fn get_messages(&self, session_id: &str) -> Result<Vec<Message>> {
        let messages = self.store.list_messages(session_id).await.map_err(|e| {
            error!(error = %e, session_id, "[CHAT] Failed to get messages");
            AppError::Storage("Falha ao recuperar mensagens".to_string())
        })?;

        debug!(session_id, count = messages.len(), "[CHAT] Retrieved messages");
        Ok(messages)
    }

    /// Caller must hold `session_gate`.
    async fn check_session(&self, token: &str) -> Option<Session> {
        let session = match self.store.get_by_token(token).await {
            Ok(Some(session)) => session,
            Ok(None) => {
                warn!("[CHAT] Session not found");
                return None;
            }
            Err(e) => {
                error!(error = %e, "[CHAT] Failed to validate session");
                return None;
            }
        };

        if !session.is_active {
            warn!(session_id = %session.id, "[CHAT] Session is inactive");
            return None;
        }

        let now = self.clock.now();
        if session.is_expired(now, self.session_ttl) {
            warn!(
                session_id = %session.id,
                age_hours = session.age(now).num_hours(),
                "[CHAT] Session expired"
            );
            if let Err(e) = self
                .store
                .update(token, SessionForUpdate::new().is_active(false))
                .await
            {
                error!(error = %e, "[CHAT] Failed to deactivate expired session");
            }
            return None;
        }

        Some(session)
    }
}

/// `anonymous_<millis>_<9 base36 chars>`
fn anonymous_user_id(millis: i64) -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..ANON_SUFFIX_LEN)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect();
    format!("anonymous_{millis}_{suffix}")
}

// endregion: --- Tests
