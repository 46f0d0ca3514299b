//! # Utilities Library
//!
//! Shared utilities for the clock, environment variables, and chat message validation.
//!
//! The [`validation`] module is consumed by both the server (`lib-web`) and the
//! client controller (`widget`), so both surfaces apply exactly the same rules.

pub mod envs;
pub mod time;
pub mod validation;

// Re-export commonly used functions
pub use envs::{get_env, get_env_or, get_env_parse, get_env_parse_or};
pub use time::{now_utc, Clock, ManualClock, SystemClock};
pub use validation::{
    check_message, is_too_simple, sanitize_message, strip_markup, validate_message,
    validate_message_content, MessageValidator, ValidationError,
};
