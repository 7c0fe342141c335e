//! Tenancy DTOs - organization and agent registration

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Request to register a new organization
#[derive(Debug, Clone, Deserialize)]
pub struct OrgRegisterRequest {
    /// Organization display name
    pub org_name: String,
    /// Contact email for the organization
    pub contact_email: String,
}

/// The admin agent created alongside an organization
#[derive(Debug, Clone, Serialize)]
pub struct InitialAgentInfo {
    pub agent_id: String,
    pub agent_name: String,
}

/// Response to organization registration, including a ready-to-use token
/// bound to the initial admin agent
#[derive(Debug, Clone, Serialize)]
pub struct OrgRegisterResponse {
    pub org_id: String,
    pub org_name: String,
    pub contact_email: String,
    pub created_at: DateTime<Utc>,
    pub initial_agent: InitialAgentInfo,
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// Organization details, visible only to its own agents
#[derive(Debug, Clone, Serialize)]
pub struct OrganizationInfoResponse {
    pub org_id: String,
    pub org_name: String,
    pub contact_email: String,
    pub agents_count: i64,
    pub created_at: DateTime<Utc>,
    pub is_active: bool,
}

/// Request to register an agent under the caller's organization
#[derive(Debug, Clone, Deserialize)]
pub struct AgentRegisterRequest {
    /// Agent display name
    pub agent_name: String,
    /// Optional description of the agent's purpose
    #[serde(default)]
    pub description: Option<String>,
}

/// Response to agent registration
#[derive(Debug, Clone, Serialize)]
pub struct AgentRegisterResponse {
    pub agent_id: String,
    pub org_id: String,
    pub agent_name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// One agent in a listing
#[derive(Debug, Clone, Serialize)]
pub struct AgentInfo {
    pub agent_id: String,
    pub agent_name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub is_active: bool,
}

/// Agents belonging to the caller's organization
#[derive(Debug, Clone, Serialize)]
pub struct AgentListResponse {
    pub total: usize,
    pub agents: Vec<AgentInfo>,
}
