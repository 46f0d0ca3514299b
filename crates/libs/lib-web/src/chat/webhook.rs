//! # AI Webhook Client
//!
//! Remote [`ResponseStrategy`] that POSTs the message and recent context to an
//! external endpoint.
//!
//! ## Request
//!
//! ```json
//! {
//!   "message": "Quero aumentar minhas vendas",
//!   "context": [{ "content": "...", "isUser": true, "timestamp": "2025-01-01T00:00:00Z" }],
//!   "timestamp": "2025-01-01T00:00:05Z",
//!   "sessionInfo": { "sessionId": "...", "userId": "anonymous_..." }
//! }
//! ```
//!
//! ## Response
//!
//! Any 2xx whose body is a JSON string, plain text, or a JSON object with a
//! non-empty string in one of [`REPLY_FIELDS`]. Markup is stripped from the
//! reply and it is cut to [`MAX_MESSAGE_LENGTH`] characters before it is stored.

use super::responder::{ReplyContext, ResponderError, ResponseStrategy};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lib_utils::validation::{strip_markup, MAX_MESSAGE_LENGTH};
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument};

/// History entries sent as context.
const CONTEXT_WINDOW: usize = 5;

/// Object fields probed for the reply, in order.
pub const REPLY_FIELDS: [&str; 6] = ["reply", "response", "output", "message", "text", "answer"];

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WebhookRequest<'a> {
    message: &'a str,
    context: Vec<ContextEntry<'a>>,
    timestamp: DateTime<Utc>,
    session_info: WebhookSessionInfo<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ContextEntry<'a> {
    content: &'a str,
    is_user: bool,
    timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WebhookSessionInfo<'a> {
    session_id: &'a str,
    user_id: Option<&'a str>,
}

/// Client for the external AI webhook.
pub struct WebhookStrategy {
    http: Client,
    url: String,
    timeout: Duration,
}

impl WebhookStrategy {
    /// Build a client with a whole-request `timeout`.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, ResponderError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ResponderError::Transport(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            url: url.into(),
            timeout,
        })
    }

    fn map_reqwest(&self, err: reqwest::Error) -> ResponderError {
        if err.is_timeout() {
            ResponderError::Timeout(self.timeout)
        } else {
            ResponderError::Transport(err.to_string())
        }
    }
}

#[async_trait]
impl ResponseStrategy for WebhookStrategy {
    fn name(&self) -> &'static str {
        "webhook"
    }

    #[instrument(skip_all, fields(session_id = %ctx.session.id))]
    async fn respond(&self, ctx: &ReplyContext<'_>) -> Result<String, ResponderError> {
        let payload = WebhookRequest {
            message: ctx.message,
            context: ctx
                .recent(CONTEXT_WINDOW)
                .iter()
                .map(|m| ContextEntry {
                    content: &m.content,
                    is_user: m.is_user,
                    timestamp: m.timestamp,
                })
                .collect(),
            timestamp: Utc::now(),
            session_info: WebhookSessionInfo {
                session_id: &ctx.session.id,
                user_id: ctx.session.user_id.as_deref(),
            },
        };

        let response = self
            .http
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| self.map_reqwest(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ResponderError::Status(status.as_u16()));
        }

        let body = response.text().await.map_err(|e| self.map_reqwest(e))?;
        let reply = extract_reply(&body)?;

        debug!(reply_len = reply.chars().count(), "[AI] Webhook replied");
        Ok(reply)
    }
}

/// Pull the reply text out of a webhook body.
pub fn extract_reply(body: &str) -> Result<String, ResponderError> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return Err(ResponderError::Malformed("empty body".to_string()));
    }

    let reply = match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::String(text)) => text,
        Ok(Value::Object(map)) => REPLY_FIELDS
            .iter()
            .filter_map(|field| map.get(*field).and_then(Value::as_str))
            .find(|text| !text.trim().is_empty())
            .map(str::to_string)
            .ok_or_else(|| ResponderError::Malformed("no reply field".to_string()))?,
        Ok(other) => {
            return Err(ResponderError::Malformed(format!("unexpected JSON: {}", other)));
        }
        Err(_) => trimmed.to_string(),
    };

    let reply: String = strip_markup(&reply).chars().take(MAX_MESSAGE_LENGTH).collect();
    let reply = reply.trim_end();
    if reply.is_empty() {
        return Err(ResponderError::Malformed("empty reply".to_string()));
    }
    Ok(reply.to_string())
}

// region:    --- Tests
#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::post, Json, Router};
    use lib_core::{Message, Session};
    use std::sync::Arc;
    use tokio::sync::Mutex;

    fn session() -> Session {
        Session {
            id: "s-1".to_string(),
            session_token: "token-0123456789".to_string(),
            user_id: Some("visitor-1".to_string()),
            created_at: Utc::now(),
            is_active: true,
        }
    }

    /// Serve `app` on an ephemeral port; returns its base URL.
    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[test]
    fn test_extract_reply_shapes() {
        assert_eq!(extract_reply(r#"{"reply":"a"}"#).unwrap(), "a");
        assert_eq!(extract_reply(r#"{"output":"b","text":"c"}"#).unwrap(), "b");
        assert_eq!(extract_reply(r#"{"reply":"","answer":"d"}"#).unwrap(), "d");
        assert_eq!(extract_reply(r#""e""#).unwrap(), "e");
        assert_eq!(extract_reply("resposta em texto").unwrap(), "resposta em texto");

        assert!(matches!(extract_reply(""), Err(ResponderError::Malformed(_))));
        assert!(matches!(extract_reply(r#"{"status":"ok"}"#), Err(ResponderError::Malformed(_))));
        assert!(matches!(extract_reply("[1,2]"), Err(ResponderError::Malformed(_))));
    }

    #[test]
    fn test_extract_reply_strips_markup_and_caps_length() {
        assert_eq!(
            extract_reply(r#"{"reply":"<script>steal()</script><b>Olá</b>, tudo bem?"}"#).unwrap(),
            "Olá, tudo bem?"
        );
        assert!(matches!(
            extract_reply(r#"{"reply":"<p></p>"}"#),
            Err(ResponderError::Malformed(_))
        ));

        let long = "ç".repeat(MAX_MESSAGE_LENGTH * 2);
        let reply = extract_reply(&long).unwrap();
        assert_eq!(reply.chars().count(), MAX_MESSAGE_LENGTH);

        // Plain punctuation is kept as-is.
        assert_eq!(extract_reply("Vendas & marketing / 2024").unwrap(), "Vendas & marketing / 2024");
    }

    #[tokio::test]
    async fn test_posts_context_and_reads_reply() {
        // -- Arrange
        let seen: Arc<Mutex<Option<Value>>> = Arc::default();
        let app = Router::new().route(
            "/hook",
            post({
                let seen = seen.clone();
                move |Json(body): Json<Value>| {
                    let seen = seen.clone();
                    async move {
                        *seen.lock().await = Some(body);
                        Json(serde_json::json!({ "reply": "Olá do webhook" }))
                    }
                }
            }),
        );
        let base = serve(app).await;
        let webhook = WebhookStrategy::new(format!("{base}/hook"), Duration::from_secs(5)).unwrap();

        let session = session();
        let history: Vec<Message> = (0..7)
            .map(|i| Message {
                id: i.to_string(),
                session_id: session.id.clone(),
                content: format!("m{i}"),
                is_user: i % 2 == 0,
                timestamp: Utc::now(),
            })
            .collect();

        // -- Act
        let reply = webhook
            .respond(&ReplyContext::new("Quero vender mais", &history, &session))
            .await
            .unwrap();

        // -- Assert
        assert_eq!(reply, "Olá do webhook");

        let body = seen.lock().await.take().unwrap();
        assert_eq!(body["message"], "Quero vender mais");
        assert_eq!(body["context"].as_array().unwrap().len(), 5);
        assert_eq!(body["context"][0]["content"], "m2");
        assert_eq!(body["context"][0]["isUser"], true);
        assert_eq!(body["sessionInfo"]["sessionId"], "s-1");
        assert_eq!(body["sessionInfo"]["userId"], "visitor-1");
    }

    #[tokio::test]
    async fn test_non_success_status_fails() {
        let app = Router::new().route("/hook", post(|| async { StatusCode::BAD_GATEWAY }));
        let base = serve(app).await;
        let webhook = WebhookStrategy::new(format!("{base}/hook"), Duration::from_secs(5)).unwrap();
        let session = session();

        let err = webhook
            .respond(&ReplyContext::new("Quero vender mais", &[], &session))
            .await
            .unwrap_err();

        assert!(matches!(err, ResponderError::Status(502)));
    }

    #[tokio::test]
    async fn test_slow_webhook_times_out() {
        let app = Router::new().route(
            "/hook",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(3)).await;
                "tarde demais"
            }),
        );
        let base = serve(app).await;
        let webhook = WebhookStrategy::new(format!("{base}/hook"), Duration::from_millis(200)).unwrap();
        let session = session();

        let err = webhook
            .respond(&ReplyContext::new("Quero vender mais", &[], &session))
            .await
            .unwrap_err();

        assert!(matches!(err, ResponderError::Timeout(_)));
    }

    #[tokio::test]
    async fn test_unreachable_webhook_is_transport_error() {
        let webhook = WebhookStrategy::new("http://127.0.0.1:1/hook", Duration::from_secs(2)).unwrap();
        let session = session();

        let err = webhook
            .respond(&ReplyContext::new("Quero vender mais", &[], &session))
            .await
            .unwrap_err();

        assert!(matches!(err, ResponderError::Transport(_) | ResponderError::Timeout(_)));
    }
}
// endregion: --- Tests
