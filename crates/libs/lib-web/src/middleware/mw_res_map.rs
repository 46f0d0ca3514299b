//! # Response Mapping Middleware
//!
//! Attaches the request id to server error bodies.
//!
//! [`AppError`](lib_core::AppError) responses carry their rendered
//! [`ErrorResponse`] in the response extensions. For 5xx responses this layer
//! re-renders that body with `requestId` set, so clients can quote it in reports.

use super::mw_req_stamp::request_id;
use axum::{
    body::Body,
    extract::Request,
    http::header::CONTENT_LENGTH,
    middleware::Next,
    response::Response,
};
use shared::ErrorResponse;
use tracing::error;

/// Response mapping middleware.
pub async fn map_res(req: Request, next: Next) -> Response {
    let request_id = request_id(&req);
    let mut res = next.run(req).await;

    if !res.status().is_server_error() {
        return res;
    }

    error!(request_id = %request_id, status = res.status().as_u16(), "[RESPONSE] Server error");

    let Some(mut body) = res.extensions_mut().remove::<ErrorResponse>() else {
        return res;
    };
    body.request_id = Some(request_id);

    match serde_json::to_vec(&body) {
        Ok(bytes) => {
            res.headers_mut().remove(CONTENT_LENGTH);
            *res.body_mut() = Body::from(bytes);
        }
        Err(e) => error!(error = %e, "[RESPONSE] Failed to re-render error body"),
    }

    res
}
