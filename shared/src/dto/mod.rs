//! # Data Transfer Objects (DTOs)
//!
//! This module contains all data structures used for communication between
//! the chat widget and the backend via the REST API.
//!
//! ## Module Organization
//!
//! - [`chat`] - Chat messages, history, health check and error envelopes
//!
//! ## Example JSON Communication
//!
//! ```text
//! POST /api/chat/message
//! Content-Type: application/json
//!
//! {
//!   "message": "Quero aumentar minhas vendas",
//!   "sessionToken": null
//! }
//! ```
//!
//! ```text
//! HTTP/1.1 200 OK
//! Content-Type: application/json
//!
//! {
//!   "reply": "Vendas são cruciais! ...",
//!   "sessionToken": "6f1c2a0e-7d7b-4a59-9f0e-0b7c0a8f51d2",
//!   "timestamp": "2024-01-01T00:00:00Z"
//! }
//! ```

pub mod chat;

pub use chat::*;
