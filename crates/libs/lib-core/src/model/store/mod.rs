//! # Session Store
//!
//! The [`SessionStore`] trait and its in-memory implementation.
//!
//! The store is constructed explicitly and injected as `Arc<dyn SessionStore>`,
//! so every test can own an isolated instance.
//!
//! ## Example
//!
//! ```rust
//! use lib_core::model::store::{MemStore, SessionForCreate, SessionStore};
//!
//! # async fn example() -> Result<(), lib_core::StoreError> {
//! let store = MemStore::new();
//! let session = store.create(SessionForCreate::new("token-0123456789", None)).await?;
//!
//! store.append_message(&session.id, "Quero vender mais", true).await?;
//! let messages = store.list_messages(&session.id).await?;
//! assert_eq!(messages.len(), 1);
//! # Ok(())
//! # }
//! ```

// region: --- Modules
pub mod mem_store;
pub mod models;
// endregion: --- Modules

// region: --- Re-exports
pub use mem_store::MemStore;
pub use models::{Message, Session, SessionForCreate, SessionForUpdate};
// endregion: --- Re-exports

// region: --- Types and Traits
use async_trait::async_trait;
use thiserror::Error;

/// Convenience alias for store results.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Failures raised by a [`SessionStore`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Another session already owns this token.
    #[error("session token already in use")]
    DuplicateToken,

    /// Message appended to a session id the store has never seen.
    #[error("unknown session: {0}")]
    UnknownSession(String),

    /// Backing storage cannot serve the request.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Storage for chat sessions and their messages.
///
/// Sessions are never deleted; messages are append-only.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Look a session up by its token.
    async fn get_by_token(&self, token: &str) -> StoreResult<Option<Session>>;

    /// Create an active session stamped with the store's clock.
    async fn create(&self, session: SessionForCreate) -> StoreResult<Session>;

    /// Merge `update` into the session owning `token`.
    async fn update(&self, token: &str, update: SessionForUpdate) -> StoreResult<Option<Session>>;

    /// Append a message to an existing session.
    async fn append_message(&self, session_id: &str, content: &str, is_user: bool) -> StoreResult<Message>;

    /// Messages of a session, oldest first.
    async fn list_messages(&self, session_id: &str) -> StoreResult<Vec<Message>>;
}
// endregion: --- Types and Traits
