//! # Core Library
//!
//! Core models, the session store, configuration, and the error taxonomy.

pub mod config;
pub mod error;
pub mod model;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, Result};
pub use model::store::{
    MemStore, Message, Session, SessionForCreate, SessionForUpdate, SessionStore, StoreError,
};
