//! # Chat Message Handler
//!
//! `POST /api/chat/message`: validate, resolve the session, persist the user
//! message, reply, persist the reply.
//!
//! Writes are not rolled back: if the reply cannot be stored after the user
//! message was, the user message stays.

use crate::chat::responder::{AiResponder, ReplyContext};
use crate::services::ChatService;
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use chrono::Utc;
use lib_core::{AppError, Result};
use lib_utils::validation::{
    validate_message_content, MessageValidator, MAX_RAW_MESSAGE_LENGTH, TOO_SIMPLE_HINT,
};
use shared::{ChatMessageRequest, ChatMessageResponse};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Handle a chat message.
#[instrument(skip_all)]
pub async fn post_message(
    State(chat): State<Arc<ChatService>>,
    State(responder): State<Arc<AiResponder>>,
    payload: std::result::Result<Json<ChatMessageRequest>, JsonRejection>,
) -> Result<Json<ChatMessageResponse>> {
    let Json(request) = payload.map_err(|rejection| {
        warn!(reason = %rejection.body_text(), "[CHAT] Invalid request schema");
        AppError::InvalidRequest(rejection.body_text())
    })?;
    check_schema(&request)?;

    let sanitized = MessageValidator::lenient()
        .validate(&request.message)
        .map_err(|e| {
            warn!(reason = %e, "[CHAT] Message validation failed");
            AppError::from(e)
        })?;

    if !validate_message_content(&sanitized) {
        warn!(len = sanitized.chars().count(), "[CHAT] Message too simple");
        return Err(AppError::MessageTooSimple(TOO_SIMPLE_HINT.to_string()));
    }

    let session = chat
        .get_or_create_session(request.session_token.as_deref(), request.user_id)
        .await?;
    let history = chat.get_messages(&session.id).await?;

    chat.add_message(&session.id, &sanitized, true).await?;
    let reply = responder
        .respond(&ReplyContext::new(&sanitized, &history, &session))
        .await;
    chat.add_message(&session.id, &reply, false).await?;

    info!(
        session_id = %session.id,
        message_len = sanitized.chars().count(),
        reply_len = reply.chars().count(),
        "[CHAT] Message processed"
    );

    Ok(Json(ChatMessageResponse {
        reply,
        session_token: session.session_token,
        timestamp: Utc::now(),
    }))
}

/// Field rules beyond what deserialization enforces.
fn check_schema(request: &ChatMessageRequest) -> Result<()> {
    let len = request.message.chars().count();

    if len == 0 {
        return Err(AppError::InvalidRequest("message: must not be empty".to_string()));
    }
    if len > MAX_RAW_MESSAGE_LENGTH {
        return Err(AppError::InvalidRequest(format!(
            "message: at most {MAX_RAW_MESSAGE_LENGTH} characters"
        )));
    }

    Ok(())
}
