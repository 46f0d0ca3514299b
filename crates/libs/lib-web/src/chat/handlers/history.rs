//! # Chat History Handler
//!
//! `GET /api/chat/history/{session_token}`

use crate::services::ChatService;
use axum::{
    extract::{Path, State},
    Json,
};
use lib_core::{AppError, Result};
use shared::{ChatHistoryResponse, SessionInfo};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Shorter tokens are rejected without a lookup.
pub const MIN_TOKEN_LENGTH: usize = 10;

/// Return the messages of a live session.
#[instrument(skip_all)]
pub async fn get_history(
    State(chat): State<Arc<ChatService>>,
    Path(session_token): Path<String>,
) -> Result<Json<ChatHistoryResponse>> {
    if session_token.chars().count() < MIN_TOKEN_LENGTH {
        warn!("[HISTORY] Invalid session token format");
        return Err(AppError::InvalidSessionToken(format!(
            "{} chars",
            session_token.chars().count()
        )));
    }

    // Only a prefix is logged.
    let token_prefix: String = session_token.chars().take(8).collect();

    if !chat.validate_session(&session_token).await {
        warn!(token = %token_prefix, "[HISTORY] Session validation failed");
        return Err(AppError::SessionNotFound(format!("{token_prefix}...")));
    }

    let session = chat
        .find_session(&session_token)
        .await?
        .ok_or_else(|| AppError::SessionNotFound(format!("{token_prefix}...")))?;
    let messages = chat.get_messages(&session.id).await?;

    info!(
        session_id = %session.id,
        count = messages.len(),
        "[HISTORY] History retrieved"
    );

    Ok(Json(ChatHistoryResponse {
        session_info: SessionInfo::from(&session),
        messages: messages.into_iter().map(Into::into).collect(),
    }))
}
