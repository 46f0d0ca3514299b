//! # Chat Widget
//!
//! Client-side chat controller for the NeuroBotX site widget.
//!
//! ## Modules
//!
//! - **[`api`]**: [`ChatApi`] trait and the reqwest-backed [`HttpChatApi`]
//! - **[`controller`]**: [`ChatController`], the widget state machine
//! - **[`notify`]**: toast records raised on validation and API failures
//!
//! Messages are validated with the same rules as the server
//! ([`lib_utils::validation`]) before anything goes over the wire.

pub mod api;
pub mod controller;
pub mod notify;

pub use api::{ApiError, ChatApi, HttpChatApi};
pub use controller::{ChatController, ChatState, SendOutcome, WidgetMessage};
pub use notify::{Notification, Variant};
