//! Relay Policy Client
//!
//! HTTP client for the external policy evaluator (an OPA-style rule engine).
//! The gateway is fail-closed with respect to policy decisions: any transport
//! failure, timeout, or malformed response surfaces as a `PolicyError`, and
//! the caller refuses to mint a seal or touch the ledger.

use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Default evaluator request timeout
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Errors from the policy evaluator integration
#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("Policy evaluator request timed out after {0}s")]
    Timeout(u64),

    #[error("Cannot connect to policy evaluator at {0}")]
    Connection(String),

    #[error("Policy evaluator returned HTTP {0}")]
    Http(u16),

    #[error("Invalid policy evaluator response: {0}")]
    InvalidResponse(String),

    #[error("Policy evaluator transport error: {0}")]
    Transport(String),
}

/// Result type for policy operations
pub type PolicyResult<T> = Result<T, PolicyError>;

/// Outcome of a policy evaluation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyDecision {
    /// Whether the action is allowed
    pub approved: bool,
    /// Reason given by the rule set when denied
    pub denial_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EvaluateResponse {
    result: Option<EvaluateResult>,
}

#[derive(Debug, Deserialize)]
struct EvaluateResult {
    #[serde(default)]
    allow: bool,
    reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VersionResponse {
    result: Option<String>,
}

/// Client for the external policy evaluator
#[derive(Clone)]
pub struct PolicyClient {
    client: reqwest::Client,
    base_url: String,
    policy_path: String,
    default_version: String,
    timeout_secs: u64,
}

impl PolicyClient {
    /// Create a client for an evaluator.
    ///
    /// `policy_path` addresses the rule package, e.g. `relay/policies/main`
    /// (dots are accepted and normalized to slashes).
    pub fn new(
        base_url: impl Into<String>,
        policy_path: impl Into<String>,
        default_version: impl Into<String>,
    ) -> Self {
        Self::with_timeout(
            base_url,
            policy_path,
            default_version,
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        )
    }

    /// Create a client with an explicit request timeout
    pub fn with_timeout(
        base_url: impl Into<String>,
        policy_path: impl Into<String>,
        default_version: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            policy_path: policy_path.into().replace('.', "/"),
            default_version: default_version.into(),
            timeout_secs: timeout.as_secs(),
        }
    }

    /// Evaluate a policy input document.
    ///
    /// Expects the evaluator to answer `{"result": {"allow": bool,
    /// "reason": ...}}`; a missing `result` field means the rule package is
    /// not loaded and is treated as an evaluator failure, not a denial.
    pub async fn evaluate(&self, input: &Value) -> PolicyResult<PolicyDecision> {
        let url = format!("{}/v1/data/{}", self.base_url, self.policy_path);
        debug!(url = %url, "Evaluating manifest against policy engine");

        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({ "input": input }))
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        if !response.status().is_success() {
            return Err(PolicyError::Http(response.status().as_u16()));
        }

        let body: EvaluateResponse = response
            .json()
            .await
            .map_err(|e| PolicyError::InvalidResponse(e.to_string()))?;

        let result = body
            .result
            .ok_or_else(|| PolicyError::InvalidResponse("missing 'result' field".to_string()))?;

        let denial_reason = if result.allow {
            None
        } else {
            Some(
                result
                    .reason
                    .unwrap_or_else(|| "Policy violation".to_string()),
            )
        };

        Ok(PolicyDecision {
            approved: result.allow,
            denial_reason,
        })
    }

    /// Whether the evaluator answers its health endpoint with a 200
    pub async fn health_check(&self) -> bool {
        let url = format!("{}/health", self.base_url);
        match self.client.get(&url).send().await {
            Ok(response) => response.status().as_u16() == 200,
            Err(_) => false,
        }
    }

    /// Current policy version, best effort.
    ///
    /// Read from the evaluator's metadata document; any failure falls back
    /// to the configured default so version lookup never blocks a decision.
    pub async fn policy_version(&self) -> String {
        let url = format!("{}/v1/data/relay/metadata/version", self.base_url);

        let fetched = async {
            let response = self.client.get(&url).send().await.ok()?;
            if response.status().as_u16() != 200 {
                return None;
            }
            let body: VersionResponse = response.json().await.ok()?;
            body.result
        }
        .await;

        match fetched {
            Some(version) => version,
            None => {
                debug!(
                    fallback = %self.default_version,
                    "Policy version lookup failed, using configured default"
                );
                self.default_version.clone()
            }
        }
    }

    /// Load a rule document into the evaluator.
    ///
    /// Used by bootstrap tooling and tests, not by the request path.
    pub async fn load_policy(&self, name: &str, policy: &str) -> PolicyResult<()> {
        let url = format!("{}/v1/policies/{}", self.base_url, name);

        let response = self
            .client
            .put(&url)
            .header("Content-Type", "text/plain")
            .body(policy.to_string())
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        if !response.status().is_success() {
            warn!(name = %name, status = %response.status(), "Policy load rejected");
            return Err(PolicyError::Http(response.status().as_u16()));
        }

        Ok(())
    }

    fn map_transport_error(&self, e: reqwest::Error) -> PolicyError {
        if e.is_timeout() {
            PolicyError::Timeout(self.timeout_secs)
        } else if e.is_connect() {
            PolicyError::Connection(self.base_url.clone())
        } else {
            PolicyError::Transport(e.to_string())
        }
    }
}
