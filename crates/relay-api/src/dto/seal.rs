//! Seal lifecycle DTOs

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Query parameters for seal verification
#[derive(Debug, Clone, Deserialize)]
pub struct SealVerifyQuery {
    /// The seal ID to verify
    pub seal_id: String,
}

/// Verification report for a seal.
///
/// The four predicates are reported independently so executors can
/// distinguish "expired but authentic" from "forged".
#[derive(Debug, Clone, Serialize)]
pub struct SealVerificationResponse {
    pub seal_id: String,
    pub valid: bool,
    pub approved: bool,
    pub expired: bool,
    pub already_executed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub manifest_id: Uuid,
}

/// Query parameters for marking a seal executed
#[derive(Debug, Clone, Deserialize)]
pub struct MarkExecutedQuery {
    /// The seal ID to mark as executed
    pub seal_id: String,
}

/// Response to a successful executed transition
#[derive(Debug, Clone, Serialize)]
pub struct MarkExecutedResponse {
    pub status: String,
    pub message: String,
}
