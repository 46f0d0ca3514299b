//! Test doubles and router helpers shared by the lib-web test modules.

use crate::chat::AiResponder;
use crate::server::{create_router, AppState};
use crate::services::ChatService;
use async_trait::async_trait;
use axum::{body::Body, http::Request, Router};
use lib_core::model::store::StoreResult;
use lib_core::{Config, MemStore, Message, Session, SessionForCreate, SessionForUpdate, SessionStore, StoreError};
use lib_utils::time::SystemClock;
use serde_json::Value;
use std::sync::Arc;

/// Store whose appends always fail. With `fail_all`, every operation fails.
pub(crate) struct FailingStore {
    inner: MemStore,
    fail_all: bool,
}

impl FailingStore {
    /// Sessions work, message appends fail.
    pub(crate) fn appends_only() -> Self {
        Self {
            inner: MemStore::new(),
            fail_all: false,
        }
    }

    fn unavailable() -> StoreError {
        StoreError::Unavailable("disk on fire".to_string())
    }
}

impl Default for FailingStore {
    fn default() -> Self {
        Self {
            inner: MemStore::new(),
            fail_all: true,
        }
    }
}

#[async_trait]
impl SessionStore for FailingStore {
    async fn get_by_token(&self, token: &str) -> StoreResult<Option<Session>> {
        if self.fail_all {
            return Err(Self::unavailable());
        }
        self.inner.get_by_token(token).await
    }

    async fn create(&self, session: SessionForCreate) -> StoreResult<Session> {
        if self.fail_all {
            return Err(Self::unavailable());
        }
        self.inner.create(session).await
    }

    async fn update(&self, token: &str, update: SessionForUpdate) -> StoreResult<Option<Session>> {
        if self.fail_all {
            return Err(Self::unavailable());
        }
        self.inner.update(token, update).await
    }

    async fn append_message(&self, _: &str, _: &str, _: bool) -> StoreResult<Message> {
        Err(Self::unavailable())
    }

    async fn list_messages(&self, session_id: &str) -> StoreResult<Vec<Message>> {
        if self.fail_all {
            return Err(Self::unavailable());
        }
        self.inner.list_messages(session_id).await
    }
}

/// App state over `store` with local replies only.
pub(crate) fn state_with_store(store: Arc<dyn SessionStore>, config: Config) -> AppState {
    let chat = ChatService::new(store, Arc::new(SystemClock), config.session_ttl());
    AppState::new(&config, Arc::new(chat), Arc::new(AiResponder::local_only()))
}

/// Router over a fresh in-memory store with default config.
pub(crate) fn test_router() -> Router {
    test_router_with(Arc::new(MemStore::new()), Config::default())
}

pub(crate) fn test_router_with(store: Arc<dyn SessionStore>, config: Config) -> Router {
    create_router(state_with_store(store, config), &[])
}

pub(crate) fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .header("x-forwarded-for", "203.0.113.7")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub(crate) fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("x-forwarded-for", "203.0.113.7")
        .body(Body::empty())
        .unwrap()
}

pub(crate) async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
