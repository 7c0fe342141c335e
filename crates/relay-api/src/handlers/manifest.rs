//! Manifest validation handlers
//!
//! The core flow of the gateway: evaluate the manifest against the policy
//! engine, mint a seal for the decision, and append both to the ledger in a
//! single transaction. The gateway fails closed: if the evaluator cannot be
//! reached, nothing is signed and nothing is written.

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use std::sync::Arc;

use crate::dto::{ManifestHealthResponse, ManifestValidationRequest, ManifestValidationResponse};
use crate::error::{ApiError, ApiResult};
use crate::extractors::{log_tenant_mismatch, ClientIp, OptionalAuth};
use crate::state::AppState;

/// POST /v1/manifest/validate
pub async fn validate_manifest(
    State(state): State<Arc<AppState>>,
    OptionalAuth(auth): OptionalAuth,
    ClientIp(ip): ClientIp,
    Json(request): Json<ManifestValidationRequest>,
) -> ApiResult<Json<ManifestValidationResponse>> {
    let mut manifest = request.manifest;
    manifest.normalize()?;

    // Authorization: an authenticated caller can only validate manifests
    // for its own organization
    if let Some(auth) = &auth {
        if manifest.agent.org_id != auth.org_id {
            log_tenant_mismatch(
                &state,
                auth,
                "/v1/manifest/validate",
                ip.as_deref(),
                &format!(
                    "Org mismatch: authenticated as {}, manifest has {}",
                    auth.org_id, manifest.agent.org_id
                ),
            )
            .await;
            return Err(ApiError::Forbidden(
                "Organization mismatch: cannot validate manifest for another organization"
                    .to_string(),
            ));
        }
    }

    // Policy decision first; a PolicyError here surfaces as 503 with no
    // ledger write
    let decision = state.policy.evaluate(&manifest.to_policy_input()).await?;
    let policy_version = state.policy.policy_version().await;

    // A seal is minted for denials too so the ledger carries a signed record
    // of every decision
    let seal = state.signer.create_seal(
        &manifest,
        decision.approved,
        &policy_version,
        decision.denial_reason.clone(),
        state.seal_ttl_minutes,
    )?;

    if !request.dry_run {
        state.db.ledger_repo().write_decision(&manifest, &seal).await?;
    }

    tracing::info!(
        manifest_id = %manifest.manifest_id,
        approved = decision.approved,
        dry_run = request.dry_run,
        provider = %manifest.action.provider,
        method = %manifest.action.method,
        "Manifest validated"
    );

    Ok(Json(ManifestValidationResponse {
        manifest_id: manifest.manifest_id,
        approved: decision.approved,
        seal: decision.approved.then_some(seal),
        denial_reason: decision.denial_reason,
        policy_version,
        timestamp: Utc::now(),
    }))
}

/// GET /v1/manifest/health
pub async fn manifest_health(
    State(state): State<Arc<AppState>>,
) -> Json<ManifestHealthResponse> {
    let opa_available = state.policy.health_check().await;

    let policy_version = if opa_available {
        state.policy.policy_version().await
    } else {
        "unknown".to_string()
    };

    Json(ManifestHealthResponse {
        status: if opa_available { "healthy" } else { "degraded" }.to_string(),
        opa_available,
        policy_version,
    })
}
