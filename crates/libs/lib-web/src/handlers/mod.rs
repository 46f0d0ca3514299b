//! # HTTP Request Handlers
//!
//! Handlers outside the chat domain. Chat handlers live in [`crate::chat::handlers`].
//!
//! - **[`health`]**: `GET /api/health`
//!
//! ## Request/Response Flow
//!
//! ```text
//! Client Request
//!     ↓
//! CORS (tower-http)
//!     ↓
//! Request stamp → Trace span → Log lines → Response mapping
//!     ↓
//! Rate limits (general, then chat)
//!     ↓
//! Handler → ChatService / AiResponder
//!     ↓
//! JSON response, or AppError → { error, code }
//! ```

pub mod health;

pub use health::health;
