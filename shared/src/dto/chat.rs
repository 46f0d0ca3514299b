//! # Chat Data Transfer Objects
//!
//! Defines request and response structures for the chat, history and health endpoints,
//! plus the error envelope every failing endpoint returns.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Body of `POST /api/chat/message`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessageRequest {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Client-side send time, informational only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl ChatMessageRequest {
    pub fn new(message: impl Into<String>, session_token: Option<String>) -> Self {
        Self {
            message: message.into(),
            session_token,
            user_id: None,
            timestamp: None,
        }
    }
}

/// Successful reply to a chat message
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessageResponse {
    pub reply: String,
    pub session_token: String,
    pub timestamp: DateTime<Utc>,
}

/// A stored chat message as seen by clients
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessageDto {
    pub id: String,
    pub session_id: String,
    pub content: String,
    pub is_user: bool,
    pub timestamp: DateTime<Utc>,
}

/// Minimal session metadata returned with the history
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub is_active: bool,
}

/// Response of `GET /api/chat/history/{sessionToken}`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChatHistoryResponse {
    pub messages: Vec<ChatMessageDto>,
    pub session_info: SessionInfo,
}

/// Response of `GET /api/health`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

/// Machine-readable error classification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    InvalidRequestSchema,
    InvalidMessageContent,
    MessageTooSimple,
    InvalidSessionToken,
    SessionNotFound,
    RateLimitExceeded,
    GeneralRateLimitExceeded,
    InternalServerError,
    /// Any code this build does not know about
    #[serde(other)]
    Unknown,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InvalidRequestSchema => "INVALID_REQUEST_SCHEMA",
            ErrorCode::InvalidMessageContent => "INVALID_MESSAGE_CONTENT",
            ErrorCode::MessageTooSimple => "MESSAGE_TOO_SIMPLE",
            ErrorCode::InvalidSessionToken => "INVALID_SESSION_TOKEN",
            ErrorCode::SessionNotFound => "SESSION_NOT_FOUND",
            ErrorCode::RateLimitExceeded => "RATE_LIMIT_EXCEEDED",
            ErrorCode::GeneralRateLimitExceeded => "GENERAL_RATE_LIMIT_EXCEEDED",
            ErrorCode::InternalServerError => "INTERNAL_SERVER_ERROR",
            ErrorCode::Unknown => "UNKNOWN",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error envelope
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error: String,
    pub code: ErrorCode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: ErrorCode) -> Self {
        Self {
            error: error.into(),
            code,
            request_id: None,
            details: None,
        }
    }
}
