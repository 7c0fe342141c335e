//! Organization handlers
//!
//! Registration is the one public write in the system: it mints an org, its
//! bootstrap admin agent, and a bearer token in a single flow, so a new
//! tenant can start validating manifests immediately.

use axum::extract::{Path, State};
use axum::Json;
use std::sync::Arc;

use relay_db::{ids, AuthEventType, DbError};

use crate::dto::{InitialAgentInfo, OrgRegisterRequest, OrgRegisterResponse, OrganizationInfoResponse};
use crate::error::{ApiError, ApiResult};
use crate::extractors::{log_tenant_mismatch, ClientIp, RequireAuth};
use crate::state::AppState;

/// POST /v1/orgs/register
pub async fn register_organization(
    State(state): State<Arc<AppState>>,
    ClientIp(ip): ClientIp,
    Json(request): Json<OrgRegisterRequest>,
) -> ApiResult<Json<OrgRegisterResponse>> {
    if request.org_name.is_empty() {
        return Err(ApiError::BadRequest("org_name must not be empty".to_string()));
    }

    let repo = state.db.org_repo();

    // Mint ids and insert; one retry with fresh randomness on the
    // effectively-unreachable collision
    let mut attempt = 0;
    let (org, agent) = loop {
        let org_id = ids::mint_org_id();
        let admin_id = ids::admin_agent_id(&org_id);

        match repo
            .create_with_admin(&org_id, &request.org_name, &request.contact_email, &admin_id)
            .await
        {
            Ok(created) => break created,
            Err(DbError::Duplicate(_)) if attempt == 0 => {
                attempt += 1;
                tracing::warn!("Organization id collision, retrying with fresh id");
            }
            Err(e) => return Err(e.into()),
        }
    };

    let access_token = state.jwt.issue(&agent.agent_id, &org.org_id)?;

    if let Err(e) = state
        .db
        .auth_event_repo()
        .log(
            AuthEventType::Authentication,
            true,
            Some(&agent.agent_id),
            Some(&org.org_id),
            Some("/v1/orgs/register"),
            ip.as_deref(),
            None,
        )
        .await
    {
        tracing::warn!(error = %e, "Failed to record registration auth event");
    }

    tracing::info!(org_id = %org.org_id, "Organization registered");

    Ok(Json(OrgRegisterResponse {
        org_id: org.org_id,
        org_name: org.org_name,
        contact_email: org.contact_email,
        created_at: org.created_at,
        initial_agent: InitialAgentInfo {
            agent_id: agent.agent_id,
            agent_name: agent.agent_name,
        },
        access_token,
        token_type: "bearer".to_string(),
        expires_in: state.jwt.expires_in_secs(),
    }))
}

/// GET /v1/orgs/:org_id
pub async fn get_organization(
    State(state): State<Arc<AppState>>,
    RequireAuth(auth): RequireAuth,
    ClientIp(ip): ClientIp,
    Path(org_id): Path<String>,
) -> ApiResult<Json<OrganizationInfoResponse>> {
    // Tenancy rule: an agent can only see its own organization
    if org_id != auth.org_id {
        log_tenant_mismatch(
            &state,
            &auth,
            &format!("/v1/orgs/{}", org_id),
            ip.as_deref(),
            "Attempted to view another organization",
        )
        .await;
        return Err(ApiError::Forbidden(
            "Access denied: cannot view other organizations".to_string(),
        ));
    }

    let repo = state.db.org_repo();

    let org = repo
        .find_by_org_id(&org_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Organization not found: {}", org_id)))?;

    let agents_count = repo.count_agents(&org_id).await?;

    Ok(Json(OrganizationInfoResponse {
        org_id: org.org_id,
        org_name: org.org_name,
        contact_email: org.contact_email,
        agents_count,
        created_at: org.created_at,
        is_active: org.is_active,
    }))
}
