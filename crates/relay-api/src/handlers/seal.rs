//! Seal lifecycle handlers
//!
//! Verification is read-only and reports all four predicates independently;
//! mark-executed is the single mutation the ledger allows, serialized by a
//! conditional update in the store.

use axum::extract::{Query, State};
use axum::Json;
use std::sync::Arc;

use relay_db::MarkExecuted;

use crate::dto::{
    MarkExecutedQuery, MarkExecutedResponse, SealVerificationResponse, SealVerifyQuery,
};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// GET /v1/seal/verify
pub async fn verify_seal(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SealVerifyQuery>,
) -> ApiResult<Json<SealVerificationResponse>> {
    let ledger = state.db.ledger_repo();

    let seal_row = ledger
        .find_seal(&query.seal_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Seal not found: {}", query.seal_id)))?;

    let manifest_row = ledger
        .find_manifest(seal_row.manifest_id)
        .await?
        .ok_or_else(|| {
            ApiError::NotFound(format!("Manifest not found for seal: {}", query.seal_id))
        })?;

    let manifest = manifest_row.to_manifest()?;
    let seal = seal_row.to_seal();

    let signature_valid = relay_crypto::verify_seal(&seal, &manifest);
    let expired = seal.is_expired();
    let already_executed = seal.executed;

    let valid = signature_valid && !expired && !already_executed && seal.approved;

    // Reason priority: forgery dominates everything, then the decision
    // itself, then freshness, then reuse
    let reason = if !signature_valid {
        Some("Invalid cryptographic signature".to_string())
    } else if !seal.approved {
        Some(format!(
            "Action was denied: {}",
            seal.denial_reason.as_deref().unwrap_or("no reason recorded")
        ))
    } else if expired {
        Some("Seal has expired".to_string())
    } else if already_executed {
        Some("Seal has already been executed".to_string())
    } else {
        None
    };

    Ok(Json(SealVerificationResponse {
        seal_id: seal.seal_id,
        valid,
        approved: seal.approved,
        expired,
        already_executed,
        reason,
        manifest_id: seal.manifest_id,
    }))
}

/// POST /v1/seal/mark-executed
pub async fn mark_seal_executed(
    State(state): State<Arc<AppState>>,
    Query(query): Query<MarkExecutedQuery>,
) -> ApiResult<Json<MarkExecutedResponse>> {
    match state.db.ledger_repo().mark_executed(&query.seal_id).await? {
        MarkExecuted::Updated => {
            tracing::info!(seal_id = %query.seal_id, "Seal marked as executed");
            Ok(Json(MarkExecutedResponse {
                status: "success".to_string(),
                message: format!("Seal {} marked as executed", query.seal_id),
            }))
        }
        MarkExecuted::AlreadyExecuted => Err(ApiError::BadRequest(format!(
            "Seal {} was already executed",
            query.seal_id
        ))),
        MarkExecuted::Expired => Err(ApiError::BadRequest(format!(
            "Seal {} has expired",
            query.seal_id
        ))),
        MarkExecuted::NotFound => Err(ApiError::NotFound(format!(
            "Seal not found: {}",
            query.seal_id
        ))),
    }
}
