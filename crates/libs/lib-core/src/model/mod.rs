//! # Model Layer
//!
//! Chat sessions and messages, and the store that owns them.

pub mod store;
