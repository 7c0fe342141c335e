//! Database models - mapped from PostgreSQL tables

use chrono::{DateTime, Utc};
use relay_types::{Manifest, Seal};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::DbResult;

// ============================================================================
// Tenancy Models
// ============================================================================

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct OrgRow {
    pub id: i64,
    pub org_id: String,
    pub org_name: String,
    pub contact_email: String,
    pub created_at: DateTime<Utc>,
    pub is_active: bool,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct AgentRow {
    pub id: i64,
    pub agent_id: String,
    pub org_id: String,
    pub agent_name: String,
    pub description: Option<String>,
    /// Reserved for a future API-key auth variant; always NULL today
    pub api_key_hash: Option<String>,
    pub created_at: DateTime<Utc>,
    pub is_active: bool,
}

// ============================================================================
// Ledger Models
// ============================================================================

/// Immutable record of an agent action request
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ManifestRow {
    pub id: i64,
    pub manifest_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub agent_id: String,
    pub org_id: String,
    pub user_id: Option<String>,
    pub provider: String,
    pub method: String,
    pub parameters: Value,
    pub reasoning: String,
    pub confidence_score: Option<f64>,
    pub environment: String,
    /// Full submitted document, kept verbatim so the canonical signing
    /// payload can be reconstructed later
    pub manifest_json: Value,
}

impl ManifestRow {
    /// Rehydrate the domain manifest from the stored document
    pub fn to_manifest(&self) -> DbResult<Manifest> {
        Ok(serde_json::from_value(self.manifest_json.clone())?)
    }
}

/// Cryptographic seal row; immutable except the executed transition
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct SealRow {
    pub id: i64,
    pub seal_id: String,
    pub manifest_id: Uuid,
    pub approved: bool,
    pub policy_version: String,
    pub denial_reason: Option<String>,
    pub signature: String,
    pub public_key: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub executed: bool,
    pub executed_at: Option<DateTime<Utc>>,
}

impl SealRow {
    /// Convert to the domain seal
    pub fn to_seal(&self) -> Seal {
        Seal {
            seal_id: self.seal_id.clone(),
            manifest_id: self.manifest_id,
            approved: self.approved,
            policy_version: self.policy_version.clone(),
            denial_reason: self.denial_reason.clone(),
            signature: self.signature.clone(),
            public_key: self.public_key.clone(),
            issued_at: self.issued_at,
            expires_at: self.expires_at,
            executed: self.executed,
            executed_at: self.executed_at,
        }
    }
}

/// One manifest joined with its seal, as returned by audit queries
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AuditRow {
    pub manifest_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub agent_id: String,
    pub org_id: String,
    pub provider: String,
    pub method: String,
    pub parameters: Value,
    pub reasoning: String,
    pub environment: String,
    pub seal_id: Option<String>,
    pub approved: Option<bool>,
    pub policy_version: Option<String>,
    pub denial_reason: Option<String>,
    pub executed: Option<bool>,
}

/// Aggregate ledger counters over a filter scope
#[derive(Debug, Clone, Serialize)]
pub struct LedgerStats {
    pub total_manifests: i64,
    pub approved: i64,
    pub denied: i64,
    pub executed: i64,
    /// Percentage of manifests approved, rounded to two decimals
    pub approval_rate: f64,
}

/// Filters for ledger queries; `None` means "no constraint"
#[derive(Debug, Clone, Default)]
pub struct AuditFilter {
    pub org_id: Option<String>,
    pub agent_id: Option<String>,
    pub provider: Option<String>,
    /// `Some(true)` = approved only, `Some(false)` = denied only,
    /// `None` = both
    pub approved_only: Option<bool>,
}

/// Outcome of the one-time-use executed transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkExecuted {
    /// This caller won the transition
    Updated,
    /// The seal was already spent
    AlreadyExecuted,
    /// The seal passed its TTL before anyone executed it
    Expired,
    /// No such seal
    NotFound,
}

// ============================================================================
// Auth Event Models
// ============================================================================

/// Types of auth events written to the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthEventType {
    Authentication,
    AuthorizationSuccess,
    AuthorizationFailure,
}

impl AuthEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Authentication => "authentication",
            Self::AuthorizationSuccess => "authorization_success",
            Self::AuthorizationFailure => "authorization_failure",
        }
    }
}

/// Immutable audit record of an auth decision
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct AuthEventRow {
    pub id: i64,
    pub event_id: Uuid,
    pub event_type: String,
    pub agent_id: Option<String>,
    pub org_id: Option<String>,
    pub endpoint: Option<String>,
    pub ip_address: Option<String>,
    pub success: bool,
    pub failure_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}
