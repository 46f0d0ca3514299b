//! # Request/Response Logging Middleware
//!
//! One line per request and one per response, correlated by request id.
//! Bodies are never logged; chat messages are user content.

use super::mw_rate_limit::client_key;
use super::mw_req_stamp::request_id;
use axum::{extract::Request, http::header, middleware::Next, response::Response};
use std::time::Instant;
use tracing::{error, info, warn};

/// Request/response logging middleware.
pub async fn log_requests(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let request_id = request_id(&req);
    let client = client_key(&req);

    let user_agent = req
        .headers()
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    info!(
        request_id = %request_id,
        method = %method,
        path = %path,
        client = %client,
        user_agent = ?user_agent,
        "[REQUEST] {} {}",
        method,
        path
    );

    let response = next.run(req).await;

    let duration_ms = start.elapsed().as_millis();
    let status = response.status();
    let size_bytes = response
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(0);

    if status.is_server_error() {
        error!(
            request_id = %request_id,
            status = status.as_u16(),
            duration_ms,
            "[RESPONSE] {} {} -> {} ({}ms) [SERVER ERROR]",
            method,
            path,
            status.as_u16(),
            duration_ms
        );
    } else if status.is_client_error() {
        warn!(
            request_id = %request_id,
            status = status.as_u16(),
            duration_ms,
            "[RESPONSE] {} {} -> {} ({}ms) [CLIENT ERROR]",
            method,
            path,
            status.as_u16(),
            duration_ms
        );
    } else {
        info!(
            request_id = %request_id,
            status = status.as_u16(),
            duration_ms,
            size_bytes,
            "[RESPONSE] {} {} -> {} ({}ms, {} bytes)",
            method,
            path,
            status.as_u16(),
            duration_ms,
            size_bytes
        );
    }

    response
}
