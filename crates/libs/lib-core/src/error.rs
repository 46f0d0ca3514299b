//! # Centralized Error Handling
//!
//! This module defines the application-wide error type [`AppError`] used consistently
//! across the chat service and HTTP handlers. It follows the `thiserror` pattern for
//! ergonomic error handling.
//!
//! ## Error Categories
//!
//! 1. **Client Errors** (4xx) - request or content issues, raised before any side effect
//!    - [`InvalidRequest`](AppError::InvalidRequest) → 400 `INVALID_REQUEST_SCHEMA`
//!    - [`InvalidMessage`](AppError::InvalidMessage) → 400 `INVALID_MESSAGE_CONTENT`
//!    - [`MessageTooSimple`](AppError::MessageTooSimple) → 400 `MESSAGE_TOO_SIMPLE`
//!    - [`InvalidSessionToken`](AppError::InvalidSessionToken) → 400 `INVALID_SESSION_TOKEN`
//!    - [`SessionNotFound`](AppError::SessionNotFound) → 404 `SESSION_NOT_FOUND`
//!
//! 2. **Admission Errors** (429) - rate limiting
//!    - [`RateLimited`](AppError::RateLimited) → `RATE_LIMIT_EXCEEDED`
//!    - [`GeneralRateLimited`](AppError::GeneralRateLimited) → `GENERAL_RATE_LIMIT_EXCEEDED`
//!
//! 3. **Server Errors** (5xx) - never expose details to the client
//!    - [`Storage`](AppError::Storage), [`Config`](AppError::Config),
//!      [`Internal`](AppError::Internal) → 500 `INTERNAL_SERVER_ERROR`
//!
//! ## Usage Example
//!
//! ```rust
//! use lib_core::error::{AppError, Result};
//!
//! fn check_token(token: &str) -> Result<&str> {
//!     if token.len() < 10 {
//!         return Err(AppError::InvalidSessionToken(format!("{} chars", token.len())));
//!     }
//!     Ok(token)
//! }
//! ```
//!
//! ## Response Body
//!
//! `IntoResponse` renders `{ "error": ..., "code": ... }` and stores the rendered
//! [`ErrorResponse`] in the response extensions, so the response-mapping middleware
//! can attach the request id to server errors.

use axum::{http::StatusCode, response::{IntoResponse, Response}, Json};
use lib_utils::validation::ValidationError;
use shared::{ErrorCode, ErrorResponse};
use thiserror::Error;

use crate::model::store::StoreError;

/// Convenience type alias for `Result<T, AppError>`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Application-wide error type covering all error scenarios.
#[derive(Debug, Error)]
pub enum AppError {
    /// Request body could not be parsed or failed the schema.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Message failed length/sanitization rules. Carries the user-facing reason.
    #[error("Invalid message: {0}")]
    InvalidMessage(String),

    /// Message is only a greeting or too short to be business content.
    #[error("Message too simple: {0}")]
    MessageTooSimple(String),

    /// Session token has an impossible shape.
    #[error("Invalid session token: {0}")]
    InvalidSessionToken(String),

    /// Session unknown, inactive, or expired.
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    /// Chat message rate limit hit.
    #[error("Chat rate limit exceeded")]
    RateLimited,

    /// General API rate limit hit.
    #[error("API rate limit exceeded")]
    GeneralRateLimited,

    /// Session store failure, wrapped by the chat service.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Configuration error during startup.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal server error (unexpected failures).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidRequest(_)
            | AppError::InvalidMessage(_)
            | AppError::MessageTooSimple(_)
            | AppError::InvalidSessionToken(_) => StatusCode::BAD_REQUEST,
            AppError::SessionNotFound(_) => StatusCode::NOT_FOUND,
            AppError::RateLimited | AppError::GeneralRateLimited => StatusCode::TOO_MANY_REQUESTS,
            AppError::Storage(_) | AppError::Config(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Get the wire error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::InvalidRequest(_) => ErrorCode::InvalidRequestSchema,
            AppError::InvalidMessage(_) => ErrorCode::InvalidMessageContent,
            AppError::MessageTooSimple(_) => ErrorCode::MessageTooSimple,
            AppError::InvalidSessionToken(_) => ErrorCode::InvalidSessionToken,
            AppError::SessionNotFound(_) => ErrorCode::SessionNotFound,
            AppError::RateLimited => ErrorCode::RateLimitExceeded,
            AppError::GeneralRateLimited => ErrorCode::GeneralRateLimitExceeded,
            AppError::Storage(_) | AppError::Config(_) | AppError::Internal(_) => {
                ErrorCode::InternalServerError
            }
        }
    }

    /// Get a user-friendly error message.
    ///
    /// For server errors, returns a generic message to avoid exposing implementation details.
    pub fn user_message(&self) -> String {
        match self {
            AppError::InvalidRequest(_) => "Dados da requisição inválidos".to_string(),
            AppError::InvalidMessage(msg) | AppError::MessageTooSimple(msg) => msg.clone(),
            AppError::InvalidSessionToken(_) => "Token de sessão inválido".to_string(),
            AppError::SessionNotFound(_) => "Sessão não encontrada ou expirada".to_string(),
            AppError::RateLimited => {
                "Muitas mensagens enviadas. Aguarde um momento antes de tentar novamente.".to_string()
            }
            AppError::GeneralRateLimited => {
                "Muitas requisições. Tente novamente em alguns instantes.".to_string()
            }
            AppError::Storage(_) | AppError::Config(_) | AppError::Internal(_) => {
                "Erro interno do servidor. Tente novamente em alguns instantes.".to_string()
            }
        }
    }

    /// Build the client-facing error body.
    pub fn to_error_response(&self) -> ErrorResponse {
        let mut body = ErrorResponse::new(self.user_message(), self.code());
        if let AppError::InvalidRequest(detail) = self {
            body.details = Some(vec![detail.clone()]);
        }
        body
    }
}

/// Implement Axum's `IntoResponse` for automatic error handling.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Log error details (full error message for server logs)
        if status.is_server_error() {
            tracing::error!(code = %self.code(), "Server error: {}", self);
        } else {
            tracing::debug!(code = %self.code(), "Client error: {}", self);
        }

        let body = self.to_error_response();
        let mut response = (status, Json(body.clone())).into_response();
        response.extensions_mut().insert(body);
        response
    }
}

/// Convert store failures into the generic storage error.
impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::Storage(err.to_string())
    }
}

/// Convert validation failures into a content error.
impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::InvalidMessage(err.to_string())
    }
}

/// Convert `serde_json::Error` to `AppError`.
impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidRequest(format!("JSON error: {}", err))
    }
}
