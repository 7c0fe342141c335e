//! Gateway integration tests
//!
//! Exercises the full request/response cycle through the router. Tests that
//! need only the policy evaluator run against an in-process stub; tests that
//! touch the ledger are ignored unless a PostgreSQL instance is configured
//! via the `RELAY_DB_*` environment variables.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use relay_api::{create_router, ApiConfig, AppState};
use relay_auth::{JwtConfig, JwtService};
use relay_crypto::{SealKeypair, SealSigner};
use relay_db::{Database, DatabaseConfig};
use relay_policy::PolicyClient;

// =============================================================================
// Test Helpers
// =============================================================================

/// Spin up a stub policy evaluator that denies amounts above 5000
async fn spawn_evaluator() -> String {
    let app = Router::new()
        .route(
            "/v1/data/relay/policies/main",
            post(|Json(body): Json<Value>| async move {
                let amount = body["input"]["action"]["parameters"]["amount"]
                    .as_i64()
                    .unwrap_or(0);
                if amount > 5000 {
                    Json(json!({
                        "result": {"allow": false, "reason": "amount exceeds limit"}
                    }))
                } else {
                    Json(json!({"result": {"allow": true}}))
                }
            }),
        )
        .route("/health", get(|| async { "ok" }))
        .route(
            "/v1/data/relay/metadata/version",
            get(|| async { Json(json!({"result": "v1.0.0"})) }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

/// Base URL of a port nothing listens on
async fn dead_evaluator() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

/// Build a router over the given evaluator.
///
/// The database pool is lazy: tests that never reach the ledger don't need a
/// running PostgreSQL.
fn test_router(policy_base: &str, auth_required: bool) -> Router {
    let db = Database::connect_lazy(&DatabaseConfig::from_env()).unwrap();
    let jwt = JwtService::new(JwtConfig {
        secret: "integration-test-secret".to_string(),
        ..Default::default()
    })
    .unwrap();
    let signer = SealSigner::new(SealKeypair::generate());
    let policy = PolicyClient::new(policy_base, "relay/policies/main", "v1.0.0");

    let state = Arc::new(AppState {
        db,
        jwt,
        signer,
        policy,
        auth_required,
        seal_ttl_minutes: 5,
    });

    create_router(state, ApiConfig::default())
}

async fn json_request(
    router: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    request_with_token(router, method, uri, body, None).await
}

async fn request_with_token(
    router: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
    token: Option<&str>,
) -> (StatusCode, Value) {
    let mut request = Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json");

    if let Some(token) = token {
        request = request.header("Authorization", format!("Bearer {}", token));
    }

    let body = match body {
        Some(json_body) => Body::from(serde_json::to_vec(&json_body).unwrap()),
        None => Body::empty(),
    };

    let response = router.clone().oneshot(request.body(body).unwrap()).await.unwrap();

    let status = response.status();
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body_bytes).unwrap_or(json!(null));

    (status, json)
}

fn payment_request(org_id: &str, amount: i64, dry_run: bool) -> Value {
    json!({
        "manifest": {
            "agent": {"agent_id": format!("agent_{}_admin", org_id), "org_id": org_id},
            "action": {
                "provider": "stripe",
                "method": "create_payment",
                "parameters": {"amount": amount, "currency": "USD"}
            },
            "justification": {"reasoning": "demo"},
            "environment": "production"
        },
        "dry_run": dry_run
    })
}

// =============================================================================
// Service Info & Validation Flow (no database required)
// =============================================================================

#[tokio::test]
async fn test_root_service_info() {
    let base = spawn_evaluator().await;
    let router = test_router(&base, false);

    let (status, json) = json_request(&router, "GET", "/", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["service"], "Relay Gateway");
    assert!(json["endpoints"]["validate"].is_string());
}

#[tokio::test]
async fn test_manifest_health_reports_evaluator() {
    let base = spawn_evaluator().await;
    let router = test_router(&base, false);

    let (status, json) = json_request(&router, "GET", "/v1/manifest/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["opa_available"], true);
    assert_eq!(json["policy_version"], "v1.0.0");
}

#[tokio::test]
async fn test_manifest_health_degraded_when_evaluator_down() {
    let base = dead_evaluator().await;
    let router = test_router(&base, false);

    let (status, json) = json_request(&router, "GET", "/v1/manifest/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["opa_available"], false);
    assert_eq!(json["policy_version"], "unknown");
}

#[tokio::test]
async fn test_dry_run_validate_approved() {
    let base = spawn_evaluator().await;
    let router = test_router(&base, false);

    let (status, json) = json_request(
        &router,
        "POST",
        "/v1/manifest/validate",
        Some(payment_request("org_acme", 4000, true)),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["approved"], true);
    assert_eq!(json["policy_version"], "v1.0.0");

    let seal = &json["seal"];
    assert!(seal["seal_id"].as_str().unwrap().starts_with("seal_"));
    assert!(!seal["signature"].as_str().unwrap().is_empty());
    assert!(!seal["public_key"].as_str().unwrap().is_empty());

    // TTL written into the seal: expires_at - issued_at == 5 minutes
    let issued: chrono::DateTime<chrono::Utc> =
        seal["issued_at"].as_str().unwrap().parse().unwrap();
    let expires: chrono::DateTime<chrono::Utc> =
        seal["expires_at"].as_str().unwrap().parse().unwrap();
    let ttl = (expires - issued).num_seconds();
    assert!((299..=301).contains(&ttl));
}

#[tokio::test]
async fn test_dry_run_validate_denied_omits_seal() {
    let base = spawn_evaluator().await;
    let router = test_router(&base, false);

    let (status, json) = json_request(
        &router,
        "POST",
        "/v1/manifest/validate",
        Some(payment_request("org_acme", 6000, true)),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["approved"], false);
    assert_eq!(json["denial_reason"], "amount exceeds limit");
    assert!(json.get("seal").is_none());
}

#[tokio::test]
async fn test_validate_fails_closed_when_evaluator_unreachable() {
    let base = dead_evaluator().await;
    let router = test_router(&base, false);

    let (status, json) = json_request(
        &router,
        "POST",
        "/v1/manifest/validate",
        Some(payment_request("org_acme", 4000, false)),
    )
    .await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["error"], true);
    assert!(json["message"]
        .as_str()
        .unwrap()
        .contains("Policy engine unavailable"));
}

#[tokio::test]
async fn test_validate_rejects_malformed_provider() {
    let base = spawn_evaluator().await;
    let router = test_router(&base, false);

    let mut body = payment_request("org_acme", 4000, true);
    body["manifest"]["action"]["provider"] = json!("stripe api!");

    let (status, _) = json_request(&router, "POST", "/v1/manifest/validate", Some(body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_validate_normalizes_provider_case() {
    let base = spawn_evaluator().await;
    let router = test_router(&base, false);

    let mut body = payment_request("org_acme", 4000, true);
    body["manifest"]["action"]["provider"] = json!("Stripe");
    body["manifest"]["action"]["method"] = json!("Create_Payment");

    let (status, json) = json_request(&router, "POST", "/v1/manifest/validate", Some(body)).await;

    // The stub evaluator allows it, so normalization happened before the
    // policy call saw the document
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["approved"], true);
}

// =============================================================================
// Auth Gate (no database required)
// =============================================================================

#[tokio::test]
async fn test_missing_token_rejected_when_auth_required() {
    let base = spawn_evaluator().await;
    let router = test_router(&base, true);

    let (status, _) = json_request(
        &router,
        "POST",
        "/v1/manifest/validate",
        Some(payment_request("org_acme", 4000, true)),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_garbage_token_rejected_even_when_auth_optional() {
    let base = spawn_evaluator().await;
    let router = test_router(&base, false);

    let (status, _) = request_with_token(
        &router,
        "POST",
        "/v1/manifest/validate",
        Some(payment_request("org_acme", 4000, true)),
        Some("not-a-real-token"),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_protected_endpoints_require_token() {
    let base = spawn_evaluator().await;
    let router = test_router(&base, false);

    let (status, _) = json_request(&router, "GET", "/v1/agents", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = json_request(&router, "GET", "/v1/orgs/org_anything", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_audit_query_validates_limit() {
    let base = spawn_evaluator().await;
    let router = test_router(&base, false);

    let (status, _) = json_request(&router, "GET", "/v1/audit/query?limit=0", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = json_request(&router, "GET", "/v1/audit/query?limit=1001", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// =============================================================================
// Ledger Scenarios (require PostgreSQL via RELAY_DB_*)
// =============================================================================

async fn ledger_router(auth_required: bool) -> Router {
    let config = DatabaseConfig::from_env();
    let db = Database::connect(&config).await.expect("test database");
    db.migrate().await.expect("migrations");

    let jwt = JwtService::new(JwtConfig {
        secret: "integration-test-secret".to_string(),
        ..Default::default()
    })
    .unwrap();
    let signer = SealSigner::new(SealKeypair::generate());

    let base = spawn_evaluator().await;
    let policy = PolicyClient::new(base, "relay/policies/main", "v1.0.0");

    let state = Arc::new(AppState {
        db,
        jwt,
        signer,
        policy,
        auth_required,
        seal_ttl_minutes: 5,
    });

    create_router(state, ApiConfig::default())
}

async fn register_org(router: &Router, name: &str) -> (String, String) {
    let (status, json) = json_request(
        router,
        "POST",
        "/v1/orgs/register",
        Some(json!({"org_name": name, "contact_email": format!("{}@example.com", name)})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    (
        json["org_id"].as_str().unwrap().to_string(),
        json["access_token"].as_str().unwrap().to_string(),
    )
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance configured via RELAY_DB_*"]
async fn test_approved_payment_end_to_end() {
    let router = ledger_router(false).await;
    let (org_id, token) = register_org(&router, "acme").await;

    let (status, json) = request_with_token(
        &router,
        "POST",
        "/v1/manifest/validate",
        Some(payment_request(&org_id, 4000, false)),
        Some(&token),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["approved"], true);
    let seal_id = json["seal"]["seal_id"].as_str().unwrap().to_string();

    let (status, json) = json_request(
        &router,
        "GET",
        &format!("/v1/seal/verify?seal_id={}", seal_id),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["valid"], true);
    assert_eq!(json["expired"], false);
    assert_eq!(json["already_executed"], false);
    assert_eq!(json["approved"], true);
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance configured via RELAY_DB_*"]
async fn test_denied_payment_recorded_but_seal_withheld() {
    let router = ledger_router(false).await;
    let (org_id, token) = register_org(&router, "denyco").await;

    let (status, json) = request_with_token(
        &router,
        "POST",
        "/v1/manifest/validate",
        Some(payment_request(&org_id, 6000, false)),
        Some(&token),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["approved"], false);
    assert!(json.get("seal").is_none());

    // The denial is still in the ledger, seal included
    let (status, json) = request_with_token(
        &router,
        "GET",
        "/v1/audit/query?approved_only=false",
        None,
        Some(&token),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let results = json["results"].as_array().unwrap();
    assert!(!results.is_empty());
    assert_eq!(results[0]["approved"], false);
    assert!(results[0]["seal_id"].is_string());
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance configured via RELAY_DB_*"]
async fn test_mark_executed_is_one_time_use() {
    let router = ledger_router(false).await;
    let (org_id, token) = register_org(&router, "onceco").await;

    let (_, json) = request_with_token(
        &router,
        "POST",
        "/v1/manifest/validate",
        Some(payment_request(&org_id, 4000, false)),
        Some(&token),
    )
    .await;
    let seal_id = json["seal"]["seal_id"].as_str().unwrap().to_string();
    let uri = format!("/v1/seal/mark-executed?seal_id={}", seal_id);

    // Two concurrent executions: exactly one winner
    let (first, second) = tokio::join!(
        json_request(&router, "POST", &uri, None),
        json_request(&router, "POST", &uri, None),
    );

    let statuses = [first.0, second.0];
    assert!(statuses.contains(&StatusCode::OK));
    assert!(statuses.contains(&StatusCode::BAD_REQUEST));

    // And every replay after that is rejected
    let (status, _) = json_request(&router, "POST", &uri, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, json) = json_request(
        &router,
        "GET",
        &format!("/v1/seal/verify?seal_id={}", seal_id),
        None,
    )
    .await;
    assert_eq!(json["valid"], false);
    assert_eq!(json["already_executed"], true);
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance configured via RELAY_DB_*"]
async fn test_tenant_isolation() {
    let router = ledger_router(false).await;
    let (org_one, token_one) = register_org(&router, "tenant-one").await;
    let (org_two, _token_two) = register_org(&router, "tenant-two").await;

    // Cannot read another organization
    let (status, _) = request_with_token(
        &router,
        "GET",
        &format!("/v1/orgs/{}", org_two),
        None,
        Some(&token_one),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Cannot validate a manifest for another organization
    let (status, _) = request_with_token(
        &router,
        "POST",
        "/v1/manifest/validate",
        Some(payment_request(&org_two, 4000, false)),
        Some(&token_one),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Audit queries are forced onto the caller's org regardless of filters
    let (status, json) = request_with_token(
        &router,
        "GET",
        &format!("/v1/audit/query?org_id={}", org_two),
        None,
        Some(&token_one),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    for row in json["results"].as_array().unwrap() {
        assert_eq!(row["org_id"], json!(org_one.clone()));
    }
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance configured via RELAY_DB_*"]
async fn test_agent_registration_and_listing() {
    let router = ledger_router(false).await;
    let (org_id, token) = register_org(&router, "crewco").await;

    let (status, json) = request_with_token(
        &router,
        "POST",
        "/v1/agents/register",
        Some(json!({"agent_name": "billing-agent", "description": "pays invoices"})),
        Some(&token),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["org_id"], json!(org_id.clone()));
    assert!(json["agent_id"].as_str().unwrap().starts_with("agent_"));
    assert!(!json["access_token"].as_str().unwrap().is_empty());

    let (status, json) =
        request_with_token(&router, "GET", "/v1/agents", None, Some(&token)).await;

    assert_eq!(status, StatusCode::OK);
    // Admin agent plus the one just registered
    assert!(json["total"].as_i64().unwrap() >= 2);
}
