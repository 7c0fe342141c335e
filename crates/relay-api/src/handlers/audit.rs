//! Audit ledger handlers
//!
//! Read-only compliance access. Authenticated callers are always scoped to
//! their own organization: the caller's org_id overrides any user-supplied
//! filter, unconditionally.

use axum::extract::{Query, State};
use axum::Json;
use std::sync::Arc;

use relay_db::{AuditFilter, LedgerStats};

use crate::dto::{AuditQueryParams, AuditQueryResponse, AuditStatsParams};
use crate::error::{ApiError, ApiResult};
use crate::extractors::OptionalAuth;
use crate::state::AppState;

/// GET /v1/audit/query
pub async fn query_audit_trail(
    State(state): State<Arc<AppState>>,
    OptionalAuth(auth): OptionalAuth,
    Query(params): Query<AuditQueryParams>,
) -> ApiResult<Json<AuditQueryResponse>> {
    if !(1..=1000).contains(&params.limit) {
        return Err(ApiError::BadRequest(
            "limit must be between 1 and 1000".to_string(),
        ));
    }
    if params.offset < 0 {
        return Err(ApiError::BadRequest("offset must be >= 0".to_string()));
    }

    let filter = AuditFilter {
        org_id: effective_org_id(&auth, params.org_id),
        agent_id: params.agent_id,
        provider: params.provider,
        approved_only: params.approved_only,
    };

    let results = state
        .db
        .ledger_repo()
        .query_manifests(&filter, params.limit, params.offset)
        .await?;

    Ok(Json(AuditQueryResponse {
        total: results.len(),
        limit: params.limit,
        offset: params.offset,
        results,
    }))
}

/// GET /v1/audit/stats
pub async fn audit_stats(
    State(state): State<Arc<AppState>>,
    OptionalAuth(auth): OptionalAuth,
    Query(params): Query<AuditStatsParams>,
) -> ApiResult<Json<LedgerStats>> {
    let filter = AuditFilter {
        org_id: effective_org_id(&auth, params.org_id),
        agent_id: params.agent_id,
        ..Default::default()
    };

    let stats = state.db.ledger_repo().stats(&filter).await?;

    Ok(Json(stats))
}

/// Tenant scoping: an authenticated caller's org wins over any query
/// parameter
fn effective_org_id(
    auth: &Option<relay_auth::AuthContext>,
    requested: Option<String>,
) -> Option<String> {
    match auth {
        Some(ctx) => Some(ctx.org_id.clone()),
        None => requested,
    }
}
