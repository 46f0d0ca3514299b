//! # Web Library
//!
//! HTTP handlers, middleware, services, and server wiring for the chat backend.
//!
//! ## Endpoints
//!
//! ```bash
//! curl -X POST http://127.0.0.1:5000/api/chat/message \
//!   -H 'content-type: application/json' \
//!   -d '{"message":"Quero aumentar minhas vendas"}'
//!
//! curl http://127.0.0.1:5000/api/chat/history/<sessionToken>
//! curl http://127.0.0.1:5000/api/health
//! ```

pub mod chat;
pub mod handlers;
pub mod middleware;
pub mod server;
pub mod services;

#[cfg(test)]
pub(crate) mod test_support;

pub use server::{create_router, start_server, AppState, ServerConfig};
