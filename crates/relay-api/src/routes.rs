//! API routes
//!
//! Route definitions for all gateway endpoints, plus the CORS and tracing
//! layers applied to the whole surface.

use axum::http::HeaderValue;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// API surface configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Allowed CORS origins; `*` allows any
    pub cors_origins: Vec<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            cors_origins: vec!["*".to_string()],
        }
    }
}

/// Build the gateway router
pub fn create_router(state: Arc<AppState>, config: ApiConfig) -> Router {
    let v1 = Router::new()
        .nest("/orgs", org_routes())
        .nest("/agents", agent_routes())
        .nest("/manifest", manifest_routes())
        .nest("/seal", seal_routes())
        .nest("/audit", audit_routes());

    Router::new()
        .route("/", get(handlers::health::root))
        .route("/health", get(handlers::health::health))
        .nest("/v1", v1)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config))
        .with_state(state)
}

fn org_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/register", post(handlers::orgs::register_organization))
        .route("/:org_id", get(handlers::orgs::get_organization))
}

fn agent_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/register", post(handlers::agents::register_agent))
        .route("/", get(handlers::agents::list_agents))
}

fn manifest_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/validate", post(handlers::manifest::validate_manifest))
        .route("/health", get(handlers::manifest::manifest_health))
}

fn seal_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/verify", get(handlers::seal::verify_seal))
        .route("/mark-executed", post(handlers::seal::mark_seal_executed))
}

fn audit_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/query", get(handlers::audit::query_audit_trail))
        .route("/stats", get(handlers::audit::audit_stats))
}

fn cors_layer(config: &ApiConfig) -> CorsLayer {
    if config.cors_origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<HeaderValue> = config
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}
