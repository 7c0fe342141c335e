//! Gateway configuration
//!
//! Environment-driven configuration with the `RELAY_` prefix. Loaded once at
//! startup and read-only afterwards.

use relay_db::DatabaseConfig;

/// Gateway configuration settings
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Database connection settings
    pub database: DatabaseConfig,

    /// Base URL of the external policy evaluator
    pub opa_url: String,
    /// Rule package to evaluate, e.g. `relay/policies/main`
    pub policy_path: String,
    /// Fallback policy version when the evaluator metadata is unreachable
    pub policy_version: String,

    /// Base64-encoded Ed25519 signing key
    pub private_key: Option<String>,
    /// Seal time-to-live in minutes
    pub seal_ttl_minutes: i64,

    /// JWT signing secret
    pub jwt_secret: Option<String>,
    /// JWT lifetime in hours
    pub jwt_expiry_hours: i64,
    /// Whether flagged endpoints require authentication
    pub auth_required: bool,

    /// API bind host
    pub api_host: String,
    /// API bind port
    pub api_port: u16,
    /// Allowed CORS origins, comma-separated in the environment
    pub cors_origins: Vec<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            opa_url: "http://localhost:8181".to_string(),
            policy_path: "relay/policies/main".to_string(),
            policy_version: "v1.0.0".to_string(),
            private_key: None,
            seal_ttl_minutes: 5,
            jwt_secret: None,
            jwt_expiry_hours: 1,
            auth_required: false,
            api_host: "0.0.0.0".to_string(),
            api_port: 8000,
            cors_origins: vec!["*".to_string()],
        }
    }
}

impl GatewayConfig {
    /// Load configuration from `RELAY_*` environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            database: DatabaseConfig::from_env(),
            opa_url: env_or("RELAY_OPA_URL", defaults.opa_url),
            policy_path: env_or("RELAY_POLICY_PATH", defaults.policy_path),
            policy_version: env_or("RELAY_POLICY_VERSION", defaults.policy_version),
            private_key: std::env::var("RELAY_PRIVATE_KEY").ok(),
            seal_ttl_minutes: env_parse_or("RELAY_SEAL_TTL_MINUTES", defaults.seal_ttl_minutes),
            jwt_secret: std::env::var("RELAY_JWT_SECRET").ok(),
            jwt_expiry_hours: env_parse_or("RELAY_JWT_EXPIRY_HOURS", defaults.jwt_expiry_hours),
            auth_required: env_parse_or("RELAY_AUTH_REQUIRED", defaults.auth_required),
            api_host: env_or("RELAY_API_HOST", defaults.api_host),
            api_port: env_parse_or("RELAY_API_PORT", defaults.api_port),
            cors_origins: std::env::var("RELAY_CORS_ORIGINS")
                .map(|v| v.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or(defaults.cors_origins),
        }
    }
}

fn env_or(key: &str, default: String) -> String {
    std::env::var(key).unwrap_or(default)
}

fn env_parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GatewayConfig::default();
        assert_eq!(config.seal_ttl_minutes, 5);
        assert_eq!(config.jwt_expiry_hours, 1);
        assert!(!config.auth_required);
        assert_eq!(config.api_port, 8000);
        assert_eq!(config.cors_origins, vec!["*".to_string()]);
    }
}
