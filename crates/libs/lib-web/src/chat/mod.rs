//! # Chat Module
//!
//! Chat endpoints and reply generation.
//!
//! - [`handlers`]: `POST /api/chat/message`, `GET /api/chat/history/{token}`
//! - [`responder`]: the reply strategy interface and its try-then-fallback composition
//! - [`webhook`]: remote strategy calling the external AI endpoint
//! - [`fallback`]: local keyword/random replies

pub mod fallback;
pub mod handlers;
pub mod responder;
pub mod webhook;

pub use fallback::FallbackStrategy;
pub use handlers::{get_history, post_message};
pub use responder::{AiResponder, ReplyContext, ResponderError, ResponseStrategy};
pub use webhook::WebhookStrategy;
