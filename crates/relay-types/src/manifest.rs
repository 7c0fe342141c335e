//! Manifest types
//!
//! A Manifest is the core primitive of Relay: a structured document that
//! describes a requested agent action with enough context for deterministic
//! policy evaluation. Who (agent/org/user), what (provider/method/parameters),
//! why (reasoning/confidence), where (environment).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::{RelayError, RelayResult};

/// Agent identity and context information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentContext {
    /// Unique identifier for the agent
    pub agent_id: String,
    /// Organization the agent belongs to
    pub org_id: String,
    /// User on whose behalf the agent acts
    #[serde(default)]
    pub user_id: Option<String>,
}

/// The action being requested by the agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionRequest {
    /// Service provider (e.g. "stripe", "aws", "github")
    pub provider: String,
    /// Operation on the provider (e.g. "create_payment", "delete_bucket")
    pub method: String,
    /// Action parameters as a structured document
    pub parameters: Value,
}

impl ActionRequest {
    /// Validate and normalize the provider and method names.
    ///
    /// Both must be alphanumeric (underscores and hyphens allowed) and are
    /// lowercased on acceptance, so policy rules and ledger queries never see
    /// mixed-case variants of the same action.
    pub fn normalize(&mut self) -> RelayResult<()> {
        self.provider = normalize_name("action.provider", &self.provider)?;
        self.method = normalize_name("action.method", &self.method)?;
        Ok(())
    }
}

fn normalize_name(field: &str, value: &str) -> RelayResult<String> {
    if value.is_empty() {
        return Err(RelayError::invalid_field(field, "must not be empty"));
    }
    if !value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(RelayError::invalid_field(
            field,
            "must be alphanumeric (underscores and hyphens allowed)",
        ));
    }
    Ok(value.to_ascii_lowercase())
}

/// The agent's reasoning for requesting the action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Justification {
    /// Natural language explanation of why this action is needed
    pub reasoning: String,
    /// Agent's confidence in this action (0.0 to 1.0)
    #[serde(default)]
    pub confidence_score: Option<f64>,
    /// Additional context data
    #[serde(default)]
    pub context: Option<Value>,
}

fn default_manifest_version() -> String {
    crate::MANIFEST_VERSION.to_string()
}

fn default_environment() -> String {
    "production".to_string()
}

/// A complete agent action request.
///
/// Manifests are immutable once accepted; the gateway stores the document
/// verbatim alongside its projected columns so the canonical signing payload
/// can always be reconstructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    /// Unique identifier for this manifest
    #[serde(default = "Uuid::new_v4")]
    pub manifest_id: Uuid,
    /// Manifest schema version
    #[serde(default = "default_manifest_version")]
    pub version: String,
    /// When this manifest was created
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
    /// Agent identity and context
    pub agent: AgentContext,
    /// The action being requested
    pub action: ActionRequest,
    /// Agent's reasoning for the action
    pub justification: Justification,
    /// Deployment environment (e.g. "production", "staging")
    #[serde(default = "default_environment")]
    pub environment: String,
}

impl Manifest {
    /// Validate and normalize the manifest in place.
    ///
    /// Applies the schema-level constraints that must hold before policy
    /// evaluation: non-empty identity fields, normalized provider/method,
    /// confidence score within [0, 1].
    pub fn normalize(&mut self) -> RelayResult<()> {
        if self.agent.agent_id.is_empty() {
            return Err(RelayError::invalid_field("agent.agent_id", "must not be empty"));
        }
        if self.agent.org_id.is_empty() {
            return Err(RelayError::invalid_field("agent.org_id", "must not be empty"));
        }
        if self.justification.reasoning.is_empty() {
            return Err(RelayError::invalid_field(
                "justification.reasoning",
                "must not be empty",
            ));
        }
        if let Some(score) = self.justification.confidence_score {
            if !(0.0..=1.0).contains(&score) {
                return Err(RelayError::invalid_field(
                    "justification.confidence_score",
                    "must be between 0.0 and 1.0",
                ));
            }
        }
        self.action.normalize()
    }

    /// Project the manifest into the stable policy-evaluation input.
    ///
    /// The shape of this document is part of the contract with the external
    /// policy evaluator; field additions are fine, renames are not.
    pub fn to_policy_input(&self) -> Value {
        serde_json::json!({
            "manifest_id": self.manifest_id.to_string(),
            "timestamp": self.timestamp.to_rfc3339_opts(chrono::SecondsFormat::Micros, true),
            "agent": self.agent,
            "action": self.action,
            "justification": self.justification,
            "environment": self.environment,
        })
    }
}
