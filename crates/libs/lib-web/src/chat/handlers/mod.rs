//! # Chat Handlers
//!
//! HTTP handlers for the chat endpoints.

// region: --- Modules
pub mod history;
pub mod message;

// endregion: --- Modules

// region: --- Re-exports
pub use history::get_history;
pub use message::post_message;
// endregion: --- Re-exports
