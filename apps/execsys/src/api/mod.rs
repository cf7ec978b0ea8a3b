//! # Execution System HTTP API Module
//!
//! This module implements the HTTP REST API server using axum.
//!
//! ## Endpoints
//!
//! - `GET /health` - Health check
//! - `GET /site` - Public site settings (booking link, contacts)
//! - `GET /catalog` - Capacities and interventions
//! - `POST /diagnostic` - Score ratings (partial allowed, nothing recorded)
//! - `POST /diagnostic/submit` - Score a finished diagnostic and record the lead
//! - `POST /diagnostic/report` - Render the downloadable report
//! - `POST /playbook` - Capture a playbook lead
//!
//! ## Security Configuration
//!
//! - `[server] cors_origins` / `EXECSYS_CORS_ORIGINS`: comma-separated list of
//!   allowed origins, or "*" for all (default: localhost only)
//! - `[server] rate_limit` / `EXECSYS_RATE_LIMIT`: requests per second
//!   (default: 100, 0 to disable)
//!
//! There is no authentication: every endpoint serves the public site.

mod handlers;
mod middleware;
mod types;

pub use middleware::{GlobalRateLimiter, create_rate_limiter};
pub use types::{
    CapacityJson, CatalogResponse, ClusterJson, DiagnosticRequest, DiagnosticResponse,
    HealthResponse, InterventionJson, PlaybookRequest, PlaybookResponse, ReportRequest,
    ReportResponse, SiteResponse, SubmitRequest, SubmitResponse,
};

use crate::config::AppConfig;
use crate::sink::SheetsSink;
use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware as axum_middleware,
    routing::{get, post},
};
use execsys_core::{Catalog, ExecsysError};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Request bodies above this size are rejected with 413.
pub const MAX_BODY_BYTES: usize = 64 * 1024;

// =============================================================================
// SERVER STATE
// =============================================================================

/// Shared server state. Everything is immutable after startup.
#[derive(Clone)]
pub struct AppState {
    pub catalog: &'static Catalog,
    pub sink: SheetsSink,
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// State over the standard catalog.
    #[must_use]
    pub fn new(config: AppConfig, sink: SheetsSink) -> Self {
        Self {
            catalog: Catalog::standard(),
            sink,
            config: Arc::new(config),
        }
    }
}

// =============================================================================
// CORS CONFIGURATION
// =============================================================================

/// Build the CORS layer from `cors_origins`:
/// - "*": allows all origins
/// - unset: localhost only
/// - otherwise: the comma-separated list of origins
fn build_cors_layer(cors_origins: Option<&str>) -> CorsLayer {
    match cors_origins {
        Some("*") => {
            tracing::warn!("CORS: Allowing ALL origins (cors_origins = \"*\")");
            CorsLayer::permissive()
        }
        Some(origins) => {
            let allowed_origins: Vec<HeaderValue> = origins
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .filter_map(|s| match s.parse::<HeaderValue>() {
                    Ok(hv) => {
                        tracing::info!("CORS: Allowing origin: {}", s);
                        Some(hv)
                    }
                    Err(e) => {
                        tracing::warn!("CORS: Invalid origin '{}': {}", s, e);
                        None
                    }
                })
                .collect();

            if allowed_origins.is_empty() {
                tracing::warn!("CORS: No valid origins configured, defaulting to localhost only");
                build_localhost_cors()
            } else {
                CorsLayer::new()
                    .allow_origin(allowed_origins)
                    .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                    .allow_headers([header::CONTENT_TYPE])
            }
        }
        None => {
            tracing::info!("CORS: No origins configured, defaulting to localhost only");
            build_localhost_cors()
        }
    }
}

/// Build a restrictive CORS layer that only allows localhost origins.
fn build_localhost_cors() -> CorsLayer {
    let origins: Vec<HeaderValue> = [
        "http://localhost:3000",
        "http://localhost:5173",
        "http://localhost:8080",
        "http://127.0.0.1:3000",
        "http://127.0.0.1:8080",
    ]
    .into_iter()
    .filter_map(|o| o.parse::<HeaderValue>().ok())
    .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

// =============================================================================
// ROUTER CREATION
// =============================================================================

/// Create the axum router with all endpoints and middleware.
///
/// Middleware stack (outer to inner):
/// 1. Tracing - logs all requests
/// 2. CORS - handles preflight requests
/// 3. Body limit
/// 4. Rate Limiting (if enabled)
pub fn create_router(state: AppState) -> Router {
    let cors = build_cors_layer(state.config.server.cors_origins.as_deref());

    let rate_limit = state.config.server.effective_rate_limit();
    let rate_limiter = if rate_limit > 0 {
        tracing::info!("Rate limiting enabled: {} requests/second", rate_limit);
        Some(create_rate_limiter(rate_limit))
    } else {
        tracing::info!("Rate limiting disabled");
        None
    };

    let mut router = Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/site", get(handlers::site_handler))
        .route("/catalog", get(handlers::catalog_handler))
        .route("/diagnostic", post(handlers::diagnostic_handler))
        .route("/diagnostic/submit", post(handlers::submit_handler))
        .route("/diagnostic/report", post(handlers::report_handler))
        .route("/playbook", post(handlers::playbook_handler));

    if let Some(limiter) = rate_limiter {
        router = router.layer(axum_middleware::from_fn_with_state(
            limiter,
            middleware::rate_limit_middleware,
        ));
    }

    router
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(axum::extract::DefaultBodyLimit::max(MAX_BODY_BYTES)),
        )
        .with_state(state)
}

// =============================================================================
// SERVER STARTUP
// =============================================================================

/// Start the HTTP server and run until Ctrl+C.
pub async fn run_server(config: AppConfig) -> Result<(), ExecsysError> {
    let sink = SheetsSink::new(&config.sheets)
        .map_err(|e| ExecsysError::ConfigError(e.to_string()))?;
    let addr = config.server.bind_addr();
    let router = create_router(AppState::new(config, sink));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| ExecsysError::IoError(format!("Bind failed: {}", e)))?;

    tracing::info!("Execution System server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ExecsysError::IoError(format!("Server error: {}", e)))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Cannot listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
