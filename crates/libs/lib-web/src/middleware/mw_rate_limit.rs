//! # Rate Limiting Middleware
//!
//! Fixed-window request counting per client address.
//!
//! Two limiters run in production: a general one over every `/api` route and a
//! stricter one on `POST /api/chat/message`. Both answer with the standard
//! `RateLimit-Limit`, `RateLimit-Remaining` and `RateLimit-Reset` headers; a
//! rejected request also gets `Retry-After` and a 429 error body.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use axum::{middleware::from_fn_with_state, routing::post, Router};
//! use lib_web::middleware::{rate_limit, LimitScope, RateLimiter};
//! use std::sync::Arc;
//!
//! let limiter = Arc::new(RateLimiter::per_minute(LimitScope::Chat, 15));
//! let app = Router::new()
//!     .route("/api/chat/message", post(handler))
//!     .route_layer(from_fn_with_state(limiter, rate_limit));
//! ```

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, HeaderName, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use lib_core::AppError;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::warn;

const WINDOW: Duration = Duration::from_secs(60);

/// Which limit a [`RateLimiter`] enforces; selects the rejection error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitScope {
    /// Every API route
    Api,
    /// Chat message submission
    Chat,
}

impl LimitScope {
    fn rejection(self) -> AppError {
        match self {
            LimitScope::Api => AppError::GeneralRateLimited,
            LimitScope::Chat => AppError::RateLimited,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct FixedWindow {
    started: Instant,
    count: u32,
}

/// Outcome of one [`RateLimiter::check`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateDecision {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    /// Time until the current window closes
    pub reset_after: Duration,
}

/// Per-client fixed-window counter.
#[derive(Debug)]
pub struct RateLimiter {
    scope: LimitScope,
    limit: u32,
    window: Duration,
    windows: RwLock<HashMap<String, FixedWindow>>,
}

impl RateLimiter {
    pub fn new(scope: LimitScope, limit: u32, window: Duration) -> Self {
        Self {
            scope,
            limit,
            window,
            windows: RwLock::new(HashMap::new()),
        }
    }

    /// `limit` requests per minute.
    pub fn per_minute(scope: LimitScope, limit: u32) -> Self {
        Self::new(scope, limit, WINDOW)
    }

    pub fn scope(&self) -> LimitScope {
        self.scope
    }

    /// Count one request from `client`.
    pub async fn check(&self, client: &str) -> RateDecision {
        self.check_at(client, Instant::now()).await
    }

    async fn check_at(&self, client: &str, now: Instant) -> RateDecision {
        let mut windows = self.windows.write().await;

        let window = windows.entry(client.to_string()).or_insert(FixedWindow {
            started: now,
            count: 0,
        });

        if now.duration_since(window.started) >= self.window {
            *window = FixedWindow {
                started: now,
                count: 0,
            };
        }

        let reset_after = self.window.saturating_sub(now.duration_since(window.started));

        if window.count >= self.limit {
            return RateDecision {
                allowed: false,
                limit: self.limit,
                remaining: 0,
                reset_after,
            };
        }

        window.count += 1;
        RateDecision {
            allowed: true,
            limit: self.limit,
            remaining: self.limit - window.count,
            reset_after,
        }
    }

    /// Drop windows that have closed.
    pub async fn prune(&self) {
        let now = Instant::now();
        let mut windows = self.windows.write().await;
        windows.retain(|_, w| now.duration_since(w.started) < self.window);
    }

    /// Number of tracked clients.
    pub async fn tracked_clients(&self) -> usize {
        self.windows.read().await.len()
    }
}

/// Client address: first `X-Forwarded-For` hop, then `X-Real-IP`, then the socket peer.
pub fn client_key(req: &Request) -> String {
    let from_header = |name: &str| {
        req.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };

    from_header("x-forwarded-for")
        .or_else(|| from_header("x-real-ip"))
        .or_else(|| {
            req.extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip().to_string())
        })
        .unwrap_or_else(|| "unknown".to_string())
}

/// Rate limiting middleware.
///
/// Headers set by an inner limiter are kept, so the most specific limit is reported.
pub async fn rate_limit(State(limiter): State<Arc<RateLimiter>>, req: Request, next: Next) -> Response {
    let client = client_key(&req);
    let decision = limiter.check(&client).await;

    if !decision.allowed {
        warn!(
            client = %client,
            path = %req.uri().path(),
            scope = ?limiter.scope(),
            limit = decision.limit,
            "[RATE LIMIT] Limit exceeded"
        );
        let mut res = limiter.scope().rejection().into_response();
        let headers = res.headers_mut();
        put_rate_headers(headers, &decision);
        headers.insert(
            axum::http::header::RETRY_AFTER,
            HeaderValue::from(reset_secs(&decision)),
        );
        return res;
    }

    let mut res = next.run(req).await;
    put_rate_headers(res.headers_mut(), &decision);
    res
}

fn reset_secs(decision: &RateDecision) -> u64 {
    // Round up so clients never retry inside the window.
    decision.reset_after.as_secs() + u64::from(decision.reset_after.subsec_nanos() > 0)
}

fn put_rate_headers(headers: &mut HeaderMap, decision: &RateDecision) {
    let values = [
        ("ratelimit-limit", u64::from(decision.limit)),
        ("ratelimit-remaining", u64::from(decision.remaining)),
        ("ratelimit-reset", reset_secs(decision)),
    ];

    for (name, value) in values {
        headers
            .entry(HeaderName::from_static(name))
            .or_insert_with(|| HeaderValue::from(value));
    }
}

// endregion: --- Tests
