//! Manifest validation DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use relay_types::{Manifest, Seal};

/// Request to validate a manifest against policies
#[derive(Debug, Clone, Deserialize)]
pub struct ManifestValidationRequest {
    /// The manifest to validate
    pub manifest: Manifest,
    /// If true, run the decision without writing audit records
    #[serde(default)]
    pub dry_run: bool,
}

/// Response from manifest validation.
///
/// The seal is present only for approvals; denial seals exist in the ledger
/// but are not handed back to the requesting agent.
#[derive(Debug, Clone, Serialize)]
pub struct ManifestValidationResponse {
    pub manifest_id: Uuid,
    pub approved: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seal: Option<Seal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub denial_reason: Option<String>,
    pub policy_version: String,
    pub timestamp: DateTime<Utc>,
}

/// Health of the manifest validation path
#[derive(Debug, Clone, Serialize)]
pub struct ManifestHealthResponse {
    pub status: String,
    pub opa_available: bool,
    pub policy_version: String,
}
