//! # AI Responder
//!
//! Reply generation as a [`ResponseStrategy`] interface with a remote and a local
//! variant, composed try-then-fallback by [`AiResponder`].
//!
//! ```text
//! AiResponder::respond
//!     ├── WebhookStrategy (if configured) ── Ok(reply) ──→ reply
//!     │          └── Err(_) → warn! ─┐
//!     └── FallbackStrategy ←──────────┘ (infallible)
//! ```

use super::fallback::FallbackStrategy;
use super::webhook::WebhookStrategy;
use async_trait::async_trait;
use lib_core::{Config, Message, Session};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Input to a reply strategy.
#[derive(Debug, Clone, Copy)]
pub struct ReplyContext<'a> {
    /// Sanitized user message
    pub message: &'a str,
    /// Session messages before `message`, oldest first
    pub history: &'a [Message],
    pub session: &'a Session,
}

impl<'a> ReplyContext<'a> {
    pub fn new(message: &'a str, history: &'a [Message], session: &'a Session) -> Self {
        Self {
            message,
            history,
            session,
        }
    }

    /// At most the last `n` history entries.
    pub fn recent(&self, n: usize) -> &'a [Message] {
        let start = self.history.len().saturating_sub(n);
        &self.history[start..]
    }
}

/// Failures of the remote strategy. Never leave the responder.
#[derive(Debug, Error)]
pub enum ResponderError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("upstream returned status {0}")]
    Status(u16),

    #[error("malformed reply: {0}")]
    Malformed(String),
}

/// A way of producing a reply.
#[async_trait]
pub trait ResponseStrategy: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    async fn respond(&self, ctx: &ReplyContext<'_>) -> Result<String, ResponderError>;
}

/// Remote strategy with a local fallback.
pub struct AiResponder {
    remote: Option<Arc<dyn ResponseStrategy>>,
    fallback: FallbackStrategy,
}

impl AiResponder {
    /// Build from config: a webhook when `AI_WEBHOOK_URL` is set, local replies otherwise.
    pub fn from_config(config: &Config) -> Result<Self, ResponderError> {
        match &config.ai_webhook_url {
            Some(url) => {
                let webhook = WebhookStrategy::new(url.clone(), config.ai_webhook_timeout())?;
                info!(url = %url, timeout_secs = config.ai_webhook_timeout_secs, "[AI] Webhook enabled");
                Ok(Self::with_remote(Arc::new(webhook)))
            }
            None => {
                info!("[AI] No webhook configured, using local replies");
                Ok(Self::local_only())
            }
        }
    }

    pub fn with_remote(remote: Arc<dyn ResponseStrategy>) -> Self {
        Self {
            remote: Some(remote),
            fallback: FallbackStrategy,
        }
    }

    pub fn local_only() -> Self {
        Self {
            remote: None,
            fallback: FallbackStrategy,
        }
    }

    /// Reply to `ctx`. Always produces text.
    pub async fn respond(&self, ctx: &ReplyContext<'_>) -> String {
        if let Some(remote) = &self.remote {
            match remote.respond(ctx).await {
                Ok(reply) => {
                    debug!(strategy = remote.name(), "[AI] Remote reply");
                    return reply;
                }
                Err(e) => {
                    warn!(strategy = remote.name(), error = %e, "[AI] Remote reply failed, falling back");
                }
            }
        }

        self.fallback.reply(ctx)
    }
}

// region:    --- Tests
#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::fallback::SALES_REPLY;
    use chrono::Utc;

    /// `None` fails with a 502.
    struct Scripted(Option<&'static str>);

    #[async_trait]
    impl ResponseStrategy for Scripted {
        fn name(&self) -> &'static str {
            "scripted"
        }

        async fn respond(&self, _: &ReplyContext<'_>) -> Result<String, ResponderError> {
            self.0
                .map(str::to_string)
                .ok_or(ResponderError::Status(502))
        }
    }

    fn session() -> Session {
        Session {
            id: "s-1".to_string(),
            session_token: "token-0123456789".to_string(),
            user_id: None,
            created_at: Utc::now(),
            is_active: true,
        }
    }

    #[tokio::test]
    async fn test_remote_reply_wins() {
        let responder = AiResponder::with_remote(Arc::new(Scripted(Some("do webhook"))));
        let session = session();

        let reply = responder
            .respond(&ReplyContext::new("Quero aumentar minhas vendas", &[], &session))
            .await;

        assert_eq!(reply, "do webhook");
    }

    #[tokio::test]
    async fn test_remote_failure_falls_back() {
        let responder = AiResponder::with_remote(Arc::new(Scripted(None)));
        let session = session();

        let reply = responder
            .respond(&ReplyContext::new("Quero aumentar minhas vendas", &[], &session))
            .await;

        assert_eq!(reply, SALES_REPLY);
    }

    #[test]
    fn test_recent_keeps_tail() {
        let session = session();
        let history: Vec<Message> = (0..7)
            .map(|i| Message {
                id: i.to_string(),
                session_id: session.id.clone(),
                content: format!("m{i}"),
                is_user: true,
                timestamp: Utc::now(),
            })
            .collect();

        let ctx = ReplyContext::new("x", &history, &session);

        let recent: Vec<_> = ctx.recent(5).iter().map(|m| m.content.as_str()).collect();
        assert_eq!(recent, ["m2", "m3", "m4", "m5", "m6"]);
        assert_eq!(ReplyContext::new("x", &history[..2], &session).recent(5).len(), 2);
    }
}
// endregion: --- Tests
