//! # Server Setup
//!
//! Server initialization, route registration, and HTTP server startup.
//!
//! [`start_server`] initialises logging, loads [`Config`], wires the store, chat
//! service and responder into [`AppState`], and serves the router built by
//! [`create_router`].

// region: --- Imports
use crate::chat::{get_history, post_message, AiResponder};
use crate::handlers;
use crate::middleware::{
    log_requests, map_res, rate_limit, stamp_req, LimitScope, RateLimiter, RequestStamp,
};
use crate::services::ChatService;
use axum::{
    extract::FromRef,
    http::{header, HeaderValue, Method, Request, Response, StatusCode},
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Router,
};
use lib_core::{Config, MemStore};
use lib_utils::envs::get_env_or;
use lib_utils::time::SystemClock;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{classify::ServerErrorsFailureClass, cors::CorsLayer, trace::TraceLayer};
use tracing::{info, Span};
// endregion: --- Imports

// region: --- AppState
/// Application state shared across all routes
#[derive(Clone)]
pub struct AppState {
    pub chat: Arc<ChatService>,
    pub responder: Arc<AiResponder>,
    pub api_limiter: Arc<RateLimiter>,
    pub chat_limiter: Arc<RateLimiter>,
}

impl AppState {
    /// Build state from its parts; limiters come from `config`.
    pub fn new(config: &Config, chat: Arc<ChatService>, responder: Arc<AiResponder>) -> Self {
        Self {
            api_limiter: Arc::new(RateLimiter::per_minute(
                LimitScope::Api,
                config.api_rate_limit_per_minute,
            )),
            chat_limiter: Arc::new(RateLimiter::per_minute(
                LimitScope::Chat,
                config.chat_rate_limit_per_minute,
            )),
            chat,
            responder,
        }
    }
}

impl FromRef<AppState> for Arc<ChatService> {
    fn from_ref(state: &AppState) -> Self {
        state.chat.clone()
    }
}

impl FromRef<AppState> for Arc<AiResponder> {
    fn from_ref(state: &AppState) -> Self {
        state.responder.clone()
    }
}
// endregion: --- AppState

// region: --- Server Configuration
/// Listener and CORS settings
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1:5000")
    pub bind_address: String,
    /// Allowed CORS origins
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:5000".to_string(),
            allowed_origins: vec![
                "http://localhost:5000".to_string(),
                "http://127.0.0.1:5000".to_string(),
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:3000".to_string(),
            ],
        }
    }
}

impl ServerConfig {
    /// `BIND_ADDRESS` and comma-separated `ALLOWED_ORIGINS`, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let bind_address = get_env_or("BIND_ADDRESS", &defaults.bind_address);
        let allowed_origins = parse_origins(&get_env_or("ALLOWED_ORIGINS", ""));

        Self {
            bind_address,
            allowed_origins: if allowed_origins.is_empty() {
                defaults.allowed_origins
            } else {
                allowed_origins
            },
        }
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}
// endregion: --- Server Configuration

// region: --- Server Setup
/// Initialize and start the HTTP server
///
/// # Errors
///
/// This function will return an error if:
/// - The tracing subscriber cannot be installed
/// - Configuration loading or validation fails
/// - The webhook client cannot be built
/// - Server binding fails
pub async fn start_server(config: ServerConfig) -> anyhow::Result<()> {
    init_tracing()?;

    info!(" NEUROBOTX CHAT BACKEND STARTING");

    info!("Loading configuration...");
    let app_config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;
    app_config.validate().map_err(|e| anyhow::anyhow!(e))?;
    info!(
        session_ttl_hours = app_config.session_ttl_hours,
        chat_limit = app_config.chat_rate_limit_per_minute,
        api_limit = app_config.api_rate_limit_per_minute,
        "Configuration loaded"
    );

    let clock = Arc::new(SystemClock);
    let store = Arc::new(MemStore::with_clock(clock.clone()));
    let chat = Arc::new(ChatService::new(store, clock, app_config.session_ttl()));
    let responder = Arc::new(
        AiResponder::from_config(&app_config)
            .map_err(|e| anyhow::anyhow!("Failed to initialize AI responder: {}", e))?,
    );

    let state = AppState::new(&app_config, chat, responder);
    spawn_limiter_pruning(&state);

    let app = create_router(state, &config.allowed_origins);

    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;

    info!(" SERVER READY: http://{}", config.bind_address);
    log_server_info();

    // ConnectInfo feeds the rate limiter's client address fallback.
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;
    Ok(())
}

/// Install the global `fmt` subscriber filtered by `LOG_LEVEL`.
fn init_tracing() -> anyhow::Result<()> {
    let log_level = get_env_or("LOG_LEVEL", "info").to_lowercase();

    let filter = match log_level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {
            tracing_subscriber::EnvFilter::new(&log_level)
        }
        _ => tracing_subscriber::EnvFilter::new("info"),
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .with_file(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to set global tracing subscriber: {}", e))?;

    info!(" Log level: {}", log_level);
    Ok(())
}

/// Drop closed rate-limit windows once a minute.
fn spawn_limiter_pruning(state: &AppState) {
    let limiters = [state.api_limiter.clone(), state.chat_limiter.clone()];

    tokio::spawn(async move {
        let mut tick = tokio::time::interval(Duration::from_secs(60));
        loop {
            tick.tick().await;
            for limiter in &limiters {
                limiter.prune().await;
            }
        }
    });
}

/// Create the main application router with all routes
pub fn create_router(state: AppState, allowed_origins: &[String]) -> Router {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
        .expose_headers([header::HeaderName::from_static("x-request-id")]);

    info!("[ROUTE SETUP] Registering HTTP routes...");
    Router::new()
        .route(
            "/api/chat/message",
            post(post_message).route_layer(from_fn_with_state(state.chat_limiter.clone(), rate_limit)),
        )
        .route("/api/chat/history/{session_token}", get(get_history))
        .route("/api/health", get(handlers::health))
        .route_layer(from_fn_with_state(state.api_limiter.clone(), rate_limit))
        .fallback(|| async {
            info!("[404 HANDLER] Unmatched route - returning 404");
            (StatusCode::NOT_FOUND, "Route not found")
        })
        .with_state(state)
        // Innermost first: the stamp layer must wrap everything that reads the request id.
        .layer(from_fn(map_res))
        .layer(from_fn(log_requests))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<_>| {
                    let request_id = request
                        .extensions()
                        .get::<RequestStamp>()
                        .map(|s| s.id.clone())
                        .unwrap_or_else(|| "unknown".to_string());
                    tracing::info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = %request.method(),
                        uri = %request.uri(),
                    )
                })
                .on_response(|_response: &Response<_>, _latency: Duration, _span: &Span| {
                    // Response lines come from log_requests.
                })
                .on_failure(|error: ServerErrorsFailureClass, latency: Duration, _span: &Span| {
                    tracing::error!(
                        error = ?error,
                        latency_ms = latency.as_millis(),
                        "[HTTP FAILURE] Error: {:?}, Latency: {}ms",
                        error,
                        latency.as_millis()
                    );
                }),
        )
        .layer(from_fn(stamp_req))
        .layer(cors)
}

/// Log server information
fn log_server_info() {
    info!(" CHAT:");
    info!("   • POST /api/chat/message");
    info!("   • GET  /api/chat/history/{{sessionToken}}");
    info!(" HEALTH:");
    info!("   • GET  /api/health");
}
// endregion: --- Server Setup

// endregion: --- Tests
