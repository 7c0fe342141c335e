//! Authentication types

use serde::{Deserialize, Serialize};

/// Claims carried inside a Relay bearer token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Agent the token was issued to
    pub agent_id: String,
    /// Organization the agent belongs to
    pub org_id: String,
    /// Issued-at, unix seconds
    pub iat: i64,
    /// Expiry, unix seconds
    pub exp: i64,
}

/// Request-scoped identity derived from a verified token.
///
/// Every authenticated operation is scoped to this pair; handlers compare
/// `org_id` against target resources and reject mismatches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    pub agent_id: String,
    pub org_id: String,
}

impl AuthContext {
    pub fn new(agent_id: impl Into<String>, org_id: impl Into<String>) -> Self {
        Self {
            agent_id: agent_id.into(),
            org_id: org_id.into(),
        }
    }
}
