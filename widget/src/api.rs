//! # Chat API Client
//!
//! The [`ChatApi`] seam the controller talks through, and its HTTP implementation.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use shared::{ChatHistoryResponse, ChatMessageRequest, ChatMessageResponse, ErrorCode, ErrorResponse};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(45);

/// Client-side API failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    /// The server answered with an error body.
    #[error("server error {status}: {message}")]
    Server {
        status: u16,
        code: ErrorCode,
        message: String,
    },

    /// No usable answer: connection refused, timeout, DNS.
    #[error("network error: {0}")]
    Network(String),

    /// 2xx with a body that does not parse.
    #[error("invalid response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Server error code, if the server sent one.
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            ApiError::Server { code, .. } => Some(*code),
            _ => None,
        }
    }
}

/// Chat backend operations.
#[async_trait]
pub trait ChatApi: Send + Sync {
    async fn send_message(&self, request: &ChatMessageRequest) -> Result<ChatMessageResponse, ApiError>;

    async fn fetch_history(&self, session_token: &str) -> Result<ChatHistoryResponse, ApiError>;
}

/// [`ChatApi`] over HTTP.
pub struct HttpChatApi {
    client: Client,
    base_url: String,
}

impl HttpChatApi {
    /// Client for the backend at `base_url`, e.g. `http://127.0.0.1:5000`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl ChatApi for HttpChatApi {
    async fn send_message(&self, request: &ChatMessageRequest) -> Result<ChatMessageResponse, ApiError> {
        let response = self
            .client
            .post(self.url("/api/chat/message"))
            .json(request)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        decode(response).await
    }

    async fn fetch_history(&self, session_token: &str) -> Result<ChatHistoryResponse, ApiError> {
        let response = self
            .client
            .get(self.url(&format!("/api/chat/history/{}", session_token)))
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        decode(response).await
    }
}

async fn decode<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| ApiError::Network(e.to_string()))?;

    if status.is_success() {
        return serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()));
    }

    debug!(status = status.as_u16(), "[API] Error response");
    Err(server_error(status, &body))
}

fn server_error(status: StatusCode, body: &str) -> ApiError {
    match serde_json::from_str::<ErrorResponse>(body) {
        Ok(err) => ApiError::Server {
            status: status.as_u16(),
            code: err.code,
            message: err.error,
        },
        Err(_) => ApiError::Server {
            status: status.as_u16(),
            code: ErrorCode::Unknown,
            message: status
                .canonical_reason()
                .unwrap_or("Erro desconhecido")
                .to_string(),
        },
    }
}

// endregion: --- Tests
