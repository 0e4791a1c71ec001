//! # Kenning HTTP API Module
//!
//! This module implements the HTTP REST API server using axum.
//!
//! ## Endpoints
//!
//! - `GET /health` - Health check
//! - `GET /status` - Working-set status
//! - `GET|POST /points` - List or add knowledge points
//! - `GET|PUT|DELETE /points/{id}` - Fetch, replace or remove one point
//! - `GET|POST /relations` - List relations or create one by hand
//! - `POST /analyze` - Re-derive relations from the current points
//! - `POST /graph` - Graph view filtered by relation type
//! - `GET /key-points` - Points ranked by degree
//! - `GET /gaps` - Sparse/under-connected categories and isolated points
//! - `POST /path` - Learning path to the given targets
//! - `POST /recommend` - Points related to a given point
//! - `POST /export` - Export the working set (base64)
//! - `POST /import` - Import a base64 bundle
//! - `GET /hash` - BLAKE3 content hash of the working set
//!
//! ## Security Configuration (Environment Variables)
//!
//! - `KENNING_CORS_ORIGINS`: Comma-separated list of allowed origins, or "*" for all (default: the dashboard on localhost:3000)
//! - `KENNING_RATE_LIMIT`: Requests per second (default: 100, 0 to disable)
//! - `KENNING_API_KEY`: If set, requires Bearer token authentication

mod auth;
mod handlers;
mod middleware;
mod types;

pub use auth::get_api_key_from_env;
pub use handlers::error_status;
pub use middleware::{create_rate_limiter, get_rate_limit_from_env};
pub use types::{
    AddPointsRequest, AddPointsResponse, AnalyzeResponse, CreateRelationRequest, ExportQuery,
    ExportResponse, GapsResponse, GraphRequest, GraphResponse, HashResponse, HealthResponse,
    ImportRequest, ImportResponse, KeyPointJson, KeyPointsResponse, LimitQuery, PathRequest,
    PathResponse, PointResponse, PointsResponse, RecommendRequest, RecommendResponse,
    RelationResponse, RelationsResponse, StatusResponse,
};

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware as axum_middleware,
    routing::{get, post},
};
use kenning_core::{KenningError, Library};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Maximum request body size (16 MB, room for base64 bundles).
const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

const ALLOWED_METHODS: [Method; 5] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::DELETE,
    Method::OPTIONS,
];

// =============================================================================
// SERVER STATE
// =============================================================================

/// Shared server state containing the working set.
#[derive(Clone)]
pub struct AppState {
    /// The library; readers share it, mutations take the write lock.
    pub library: Arc<RwLock<Library>>,
}

impl AppState {
    /// Create new app state with a library.
    #[must_use]
    pub fn new(library: Library) -> Self {
        Self {
            library: Arc::new(RwLock::new(library)),
        }
    }
}

// =============================================================================
// CORS CONFIGURATION
// =============================================================================

/// Dashboard dev-server origins, allowed when `KENNING_CORS_ORIGINS` is unset.
const DASHBOARD_ORIGINS: [&str; 2] = ["http://localhost:3000", "http://127.0.0.1:3000"];

/// Origins the API answers cross-origin requests for.
#[derive(Debug, Clone, PartialEq)]
enum CorsOrigins {
    Any,
    Only(Vec<HeaderValue>),
}

/// Interpret `KENNING_CORS_ORIGINS`: `*`, a comma-separated list, or unset.
/// A list with no valid entry falls back to the dashboard origins.
fn cors_origins(setting: Option<&str>) -> CorsOrigins {
    let dashboard = || {
        CorsOrigins::Only(
            DASHBOARD_ORIGINS
                .into_iter()
                .map(HeaderValue::from_static)
                .collect(),
        )
    };

    match setting.map(str::trim) {
        Some("*") => CorsOrigins::Any,
        Some(list) => {
            let origins: Vec<HeaderValue> = list
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .filter_map(|o| {
                    o.parse::<HeaderValue>()
                        .inspect_err(|e| tracing::warn!("CORS: ignoring origin {:?}: {}", o, e))
                        .ok()
                })
                .collect();
            if origins.is_empty() {
                tracing::warn!("CORS: no usable origin in KENNING_CORS_ORIGINS");
                dashboard()
            } else {
                CorsOrigins::Only(origins)
            }
        }
        None => dashboard(),
    }
}

fn build_cors_layer() -> CorsLayer {
    match cors_origins(std::env::var("KENNING_CORS_ORIGINS").ok().as_deref()) {
        CorsOrigins::Any => {
            tracing::warn!("CORS: every origin may call the knowledge API");
            CorsLayer::permissive()
        }
        CorsOrigins::Only(origins) => {
            tracing::info!("CORS: {} allowed origin(s)", origins.len());
            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods(ALLOWED_METHODS)
                .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        }
    }
}

// =============================================================================
// ROUTER CREATION
// =============================================================================

/// Create the axum router with all endpoints and middleware.
///
/// Middleware stack (outer to inner):
/// 1. Tracing - logs all requests
/// 2. CORS - handles preflight requests
/// 3. Rate Limiting - global token bucket (if enabled)
/// 4. Authentication - validates API key (if configured)
pub fn create_router(state: AppState) -> Router {
    let cors = build_cors_layer();

    let rate_limit = get_rate_limit_from_env();
    let rate_limiter = if rate_limit > 0 {
        tracing::info!("Rate limiting enabled: {} requests/second", rate_limit);
        Some(create_rate_limiter(rate_limit))
    } else {
        tracing::info!("Rate limiting disabled");
        None
    };

    let has_auth = get_api_key_from_env().is_some();
    if has_auth {
        tracing::info!("API key authentication enabled");
    } else {
        tracing::warn!(
            "API key authentication DISABLED - all endpoints are publicly accessible! \
             Set KENNING_API_KEY environment variable to enable authentication."
        );
    }

    let mut router = Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/status", get(handlers::status_handler))
        .route(
            "/points",
            get(handlers::list_points_handler).post(handlers::add_points_handler),
        )
        .route(
            "/points/{id}",
            get(handlers::get_point_handler)
                .put(handlers::update_point_handler)
                .delete(handlers::delete_point_handler),
        )
        .route(
            "/relations",
            get(handlers::list_relations_handler).post(handlers::create_relation_handler),
        )
        .route("/analyze", post(handlers::analyze_handler))
        .route("/graph", post(handlers::graph_handler))
        .route("/key-points", get(handlers::key_points_handler))
        .route("/gaps", get(handlers::gaps_handler))
        .route("/path", post(handlers::path_handler))
        .route("/recommend", post(handlers::recommend_handler))
        .route("/export", post(handlers::export_handler))
        .route("/import", post(handlers::import_handler))
        .route("/hash", get(handlers::hash_handler));

    // Authentication runs last on the request
    if has_auth {
        router = router.layer(axum_middleware::from_fn(auth::api_key_auth_middleware));
    }

    if let Some(limiter) = rate_limiter {
        router = router.layer(axum_middleware::from_fn_with_state(
            limiter,
            middleware::rate_limit_middleware,
        ));
    }

    router
        .layer(axum::extract::DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// =============================================================================
// SERVER STARTUP
// =============================================================================

/// Start the HTTP server.
pub async fn run_server(addr: &str, library: Library) -> Result<(), KenningError> {
    let state = AppState::new(library);
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| KenningError::IoError(format!("Bind failed: {}", e)))?;

    tracing::info!("Kenning HTTP server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| KenningError::IoError(format!("Server error: {}", e)))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
