//! Authentication configuration

use serde::{Deserialize, Serialize};

/// JWT token configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// Secret key for signing tokens (must be set in production)
    pub secret: String,
    /// Token lifetime in hours
    pub expiry_hours: i64,
    /// Clock-skew leeway accepted at verification, in seconds
    pub leeway_secs: u64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            expiry_hours: 1,
            leeway_secs: 10,
        }
    }
}

impl JwtConfig {
    /// Token lifetime in seconds, as reported to clients
    pub fn expiry_secs(&self) -> i64 {
        self.expiry_hours * 3600
    }
}
