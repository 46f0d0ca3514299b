//! # Shared Data Transfer Objects Library
//!
//! This library defines the contract between the chat widget and the backend API.
//! All DTOs use JSON serialization via `serde` for API communication.
//!
//! ## Structure
//!
//! - **[`dto`]**: Data Transfer Objects for API communication
//!   - **[`dto::chat`]**: Chat message, history, health and error DTOs
//!
//! ## Wire Format
//!
//! The widget speaks camelCase JSON, so every DTO carries
//! `#[serde(rename_all = "camelCase")]`. Timestamps are RFC 3339 strings.
//!
//! ## Usage in Backend
//!
//! ```rust,ignore
//! use shared::dto::chat::{ChatMessageRequest, ChatMessageResponse};
//! use axum::Json;
//!
//! async fn post_message(Json(request): Json<ChatMessageRequest>) -> Json<ChatMessageResponse> {
//!     // Request is automatically deserialized from JSON
//!     // Response is automatically serialized to JSON
//!     # todo!()
//! }
//! ```
//!
//! ## Usage in the Widget
//!
//! ```rust,ignore
//! use shared::dto::chat::{ChatMessageRequest, ChatMessageResponse};
//!
//! # async fn example() -> Result<(), reqwest::Error> {
//! let request = ChatMessageRequest::new("Quero aumentar minhas vendas", None);
//!
//! let response: ChatMessageResponse = reqwest::Client::new()
//!     .post("http://localhost:5000/api/chat/message")
//!     .json(&request)
//!     .send()
//!     .await?
//!     .json()
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod dto;

// Re-export commonly used types for convenience
pub use dto::*;
