//! Seal types
//!
//! A Seal is a cryptographic proof that a manifest was evaluated against the
//! policy rule set: an Ed25519 signature over the canonical manifest payload,
//! time-bounded and one-time-use.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Cryptographic decision record for a single manifest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Seal {
    /// Unique identifier, `seal_{unix_seconds}_{manifest_uuid_prefix}`
    pub seal_id: String,
    /// The manifest this seal decides
    pub manifest_id: Uuid,
    /// Whether the action was approved
    pub approved: bool,
    /// Version of the policy rule set that was evaluated
    pub policy_version: String,
    /// Reason for denial if not approved
    #[serde(default)]
    pub denial_reason: Option<String>,

    /// Base64-encoded Ed25519 signature over the canonical payload
    pub signature: String,
    /// Base64-encoded Ed25519 public key, embedded so verification is
    /// self-contained
    pub public_key: String,

    /// When this seal was issued
    pub issued_at: DateTime<Utc>,
    /// When this seal stops being usable
    pub expires_at: DateTime<Utc>,

    /// Whether the sealed action was executed (flips at most once)
    #[serde(default)]
    pub executed: bool,
    /// When the action was executed
    #[serde(default)]
    pub executed_at: Option<DateTime<Utc>>,
}

impl Seal {
    /// Generate a seal id for a manifest.
    ///
    /// Format: `seal_{unix_seconds}_{first_hex_group_of_manifest_uuid}`
    pub fn generate_seal_id(manifest_id: Uuid) -> String {
        let timestamp = Utc::now().timestamp();
        let uuid_string = manifest_id.to_string();
        let prefix = uuid_string.split('-').next().unwrap_or("00000000");
        format!("seal_{}_{}", timestamp, prefix)
    }

    /// Compute an expiry timestamp `ttl_minutes` from now
    pub fn create_expiry(ttl_minutes: i64) -> DateTime<Utc> {
        Utc::now() + Duration::minutes(ttl_minutes)
    }

    /// Whether this seal has passed its expiry
    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }

    /// Whether this seal can still authorize its action: approved, within
    /// its TTL, and never executed
    pub fn is_valid(&self) -> bool {
        self.approved && !self.is_expired() && !self.executed
    }
}
