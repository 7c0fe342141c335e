//! Health and service-info handlers

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::state::AppState;

/// Overall health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub components: HealthComponents,
}

/// Per-dependency health
#[derive(Debug, Serialize)]
pub struct HealthComponents {
    pub database: String,
    pub policy_engine: String,
}

/// GET /health - liveness of the gateway and its dependencies
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let db_healthy = state.db.health_check().await;
    let policy_healthy = state.policy.health_check().await;

    let overall = db_healthy && policy_healthy;

    Json(HealthResponse {
        status: if overall { "healthy" } else { "unhealthy" }.to_string(),
        components: HealthComponents {
            database: component_status(db_healthy),
            policy_engine: component_status(policy_healthy),
        },
    })
}

fn component_status(healthy: bool) -> String {
    if healthy { "healthy" } else { "unhealthy" }.to_string()
}

/// GET / - service information
pub async fn root() -> Json<Value> {
    Json(json!({
        "service": "Relay Gateway",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Agent governance with cryptographic proofs",
        "endpoints": {
            "validate": "POST /v1/manifest/validate",
            "verify": "GET /v1/seal/verify",
            "mark_executed": "POST /v1/seal/mark-executed",
            "audit": "GET /v1/audit/query",
            "stats": "GET /v1/audit/stats",
            "health": "GET /v1/manifest/health",
            "register_org": "POST /v1/orgs/register",
            "get_org": "GET /v1/orgs/{org_id}",
            "register_agent": "POST /v1/agents/register",
            "list_agents": "GET /v1/agents",
        },
    }))
}
