//! # Services Layer
//!
//! Business logic between the HTTP handlers and the session store.
//!
//! ```text
//! Handlers (HTTP) → ChatService → SessionStore
//!                 → AiResponder → (webhook → local fallback)
//! ```
//!
//! All services return `Result<T, AppError>` and convert lower-level errors
//! into generic [`lib_core::AppError`] variants.

pub mod chat;

pub use chat::ChatService;
