//! Custom Axum extractors
//!
//! Request extractors for authentication and client identification. Token
//! verification here is the whole auth gate: decode the bearer token, confirm
//! the agent is still active, write the auth event, and hand the handler an
//! `AuthContext`. Every verification outcome is recorded before the response
//! that reports it.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use relay_auth::{AuthContext, AuthError};
use relay_db::AuthEventType;

use crate::error::ApiError;
use crate::state::AppState;

// =============================================================================
// Client IP Extractor
// =============================================================================

/// Extract the client IP from proxy headers
pub struct ClientIp(pub Option<String>);

#[async_trait]
impl<S> FromRequestParts<S> for ClientIp
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(ClientIp(client_ip(parts)))
    }
}

fn client_ip(parts: &Parts) -> Option<String> {
    let headers = &parts.headers;
    headers
        .get("X-Real-IP")
        .or_else(|| headers.get("X-Forwarded-For"))
        .and_then(|v| v.to_str().ok())
        .map(|s| s.split(',').next().unwrap_or(s).trim().to_string())
}

fn bearer_token(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|s| s.trim().to_string())
}

// =============================================================================
// Auth Extractors
// =============================================================================

/// Authenticated request context; rejects with 401 when absent or invalid
pub struct RequireAuth(pub AuthContext);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for RequireAuth {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        match authenticate(state, parts).await {
            Ok(ctx) => Ok(RequireAuth(ctx)),
            Err(e) => Err(ApiError::from(e).into_response()),
        }
    }
}

/// Optional authentication, gated by the `auth_required` feature flag.
///
/// A missing token passes through as `None` when auth is not required and is
/// a 401 when it is. A present token is always fully verified; handing the
/// gateway a bad token is never acceptable, flag or no flag.
pub struct OptionalAuth(pub Option<AuthContext>);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for OptionalAuth {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        if bearer_token(parts).is_none() && !state.auth_required {
            return Ok(OptionalAuth(None));
        }

        match authenticate(state, parts).await {
            Ok(ctx) => Ok(OptionalAuth(Some(ctx))),
            Err(e) => Err(ApiError::from(e).into_response()),
        }
    }
}

/// Verify the bearer token on a request and resolve its agent.
///
/// Writes an auth event for every outcome, success included, before
/// returning.
async fn authenticate(state: &Arc<AppState>, parts: &Parts) -> Result<AuthContext, AuthError> {
    let endpoint = parts.uri.path().to_string();
    let ip = client_ip(parts);

    let Some(token) = bearer_token(parts) else {
        log_auth_failure(state, None, None, &endpoint, ip.as_deref(), "Missing authorization token")
            .await;
        return Err(AuthError::MissingToken);
    };

    let claims = match state.jwt.verify(&token) {
        Ok(claims) => claims,
        Err(e) => {
            log_auth_failure(state, None, None, &endpoint, ip.as_deref(), &e.to_string()).await;
            return Err(e);
        }
    };

    // The token is only as good as the agent it names
    let agent = match state.db.agent_repo().find_by_agent_id(&claims.agent_id).await {
        Ok(agent) => agent,
        Err(e) => {
            tracing::error!(error = %e, "Agent lookup failed during authentication");
            return Err(AuthError::AgentInactive);
        }
    };

    if !agent.map(|a| a.is_active).unwrap_or(false) {
        log_auth_failure(
            state,
            Some(&claims.agent_id),
            Some(&claims.org_id),
            &endpoint,
            ip.as_deref(),
            "Agent not found or inactive",
        )
        .await;
        return Err(AuthError::AgentInactive);
    }

    if let Err(e) = state
        .db
        .auth_event_repo()
        .log(
            AuthEventType::AuthorizationSuccess,
            true,
            Some(&claims.agent_id),
            Some(&claims.org_id),
            Some(&endpoint),
            ip.as_deref(),
            None,
        )
        .await
    {
        tracing::warn!(error = %e, "Failed to record auth success event");
    }

    Ok(AuthContext::new(claims.agent_id, claims.org_id))
}

async fn log_auth_failure(
    state: &Arc<AppState>,
    agent_id: Option<&str>,
    org_id: Option<&str>,
    endpoint: &str,
    ip: Option<&str>,
    reason: &str,
) {
    if let Err(e) = state
        .db
        .auth_event_repo()
        .log(
            AuthEventType::AuthorizationFailure,
            false,
            agent_id,
            org_id,
            Some(endpoint),
            ip,
            Some(reason),
        )
        .await
    {
        tracing::warn!(error = %e, "Failed to record auth failure event");
    }
}

/// Record an authorization failure discovered inside a handler (tenant
/// mismatch on an otherwise valid token)
pub async fn log_tenant_mismatch(
    state: &Arc<AppState>,
    auth: &AuthContext,
    endpoint: &str,
    ip: Option<&str>,
    reason: &str,
) {
    if let Err(e) = state
        .db
        .auth_event_repo()
        .log(
            AuthEventType::AuthorizationFailure,
            false,
            Some(&auth.agent_id),
            Some(&auth.org_id),
            Some(endpoint),
            ip,
            Some(reason),
        )
        .await
    {
        tracing::warn!(error = %e, "Failed to record authorization failure event");
    }
}
