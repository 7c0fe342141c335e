//! Audit ledger DTOs

use serde::{Deserialize, Serialize};

use relay_db::AuditRow;

fn default_limit() -> i64 {
    100
}

/// Query parameters for the audit trail.
///
/// `org_id` is only honored for anonymous callers; authenticated requests
/// are always scoped to the caller's own organization.
#[derive(Debug, Clone, Deserialize)]
pub struct AuditQueryParams {
    #[serde(default)]
    pub org_id: Option<String>,
    #[serde(default)]
    pub agent_id: Option<String>,
    #[serde(default)]
    pub provider: Option<String>,
    /// true = only approved, false = only denied, absent = both
    #[serde(default)]
    pub approved_only: Option<bool>,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

/// Page of audit results
#[derive(Debug, Clone, Serialize)]
pub struct AuditQueryResponse {
    pub total: usize,
    pub limit: i64,
    pub offset: i64,
    pub results: Vec<AuditRow>,
}

/// Query parameters for audit stats
#[derive(Debug, Clone, Deserialize)]
pub struct AuditStatsParams {
    #[serde(default)]
    pub org_id: Option<String>,
    #[serde(default)]
    pub agent_id: Option<String>,
}
