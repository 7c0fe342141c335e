//! Agent handlers

use axum::extract::State;
use axum::Json;
use std::sync::Arc;

use relay_db::{ids, AuthEventType, DbError};

use crate::dto::{AgentInfo, AgentListResponse, AgentRegisterRequest, AgentRegisterResponse};
use crate::error::{ApiError, ApiResult};
use crate::extractors::{ClientIp, RequireAuth};
use crate::state::AppState;

/// POST /v1/agents/register
pub async fn register_agent(
    State(state): State<Arc<AppState>>,
    RequireAuth(auth): RequireAuth,
    ClientIp(ip): ClientIp,
    Json(request): Json<AgentRegisterRequest>,
) -> ApiResult<Json<AgentRegisterResponse>> {
    if request.agent_name.is_empty() {
        return Err(ApiError::BadRequest("agent_name must not be empty".to_string()));
    }

    let repo = state.db.agent_repo();

    // New agents are always minted under the caller's own organization
    let mut attempt = 0;
    let agent = loop {
        let agent_id = ids::mint_agent_id();

        match repo
            .create(
                &agent_id,
                &auth.org_id,
                &request.agent_name,
                request.description.as_deref(),
            )
            .await
        {
            Ok(created) => break created,
            Err(DbError::Duplicate(_)) if attempt == 0 => {
                attempt += 1;
                tracing::warn!("Agent id collision, retrying with fresh id");
            }
            Err(e) => return Err(e.into()),
        }
    };

    let access_token = state.jwt.issue(&agent.agent_id, &agent.org_id)?;

    if let Err(e) = state
        .db
        .auth_event_repo()
        .log(
            AuthEventType::Authentication,
            true,
            Some(&agent.agent_id),
            Some(&agent.org_id),
            Some("/v1/agents/register"),
            ip.as_deref(),
            None,
        )
        .await
    {
        tracing::warn!(error = %e, "Failed to record registration auth event");
    }

    tracing::info!(agent_id = %agent.agent_id, org_id = %agent.org_id, "Agent registered");

    Ok(Json(AgentRegisterResponse {
        agent_id: agent.agent_id,
        org_id: agent.org_id,
        agent_name: agent.agent_name,
        description: agent.description,
        created_at: agent.created_at,
        access_token,
        token_type: "bearer".to_string(),
        expires_in: state.jwt.expires_in_secs(),
    }))
}

/// GET /v1/agents
pub async fn list_agents(
    State(state): State<Arc<AppState>>,
    RequireAuth(auth): RequireAuth,
) -> ApiResult<Json<AgentListResponse>> {
    let agents = state.db.agent_repo().list_by_org(&auth.org_id).await?;

    let agents: Vec<AgentInfo> = agents
        .into_iter()
        .map(|a| AgentInfo {
            agent_id: a.agent_id,
            agent_name: a.agent_name,
            description: a.description,
            created_at: a.created_at,
            is_active: a.is_active,
        })
        .collect();

    Ok(Json(AgentListResponse {
        total: agents.len(),
        agents,
    }))
}
