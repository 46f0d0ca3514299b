//! # Middleware
//!
//! Axum middleware for request stamping, logging, response mapping, and rate limiting.
//!
//! ## Modules
//!
//! - **[`mw_req_stamp`]**: Request ID stamping
//! - **[`mw_logging`]**: Request/response log lines
//! - **[`mw_res_map`]**: Request ID on server error bodies
//! - **[`mw_rate_limit`]**: Per-client fixed-window limits

// region: --- Modules
pub mod mw_logging;
pub mod mw_rate_limit;
pub mod mw_req_stamp;
pub mod mw_res_map;
// endregion: --- Modules

// region: --- Re-exports
pub use mw_logging::log_requests;
pub use mw_rate_limit::{rate_limit, LimitScope, RateDecision, RateLimiter};
pub use mw_req_stamp::{stamp_req, RequestStamp};
pub use mw_res_map::map_res;
// endregion: --- Re-exports
