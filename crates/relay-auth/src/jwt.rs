//! JWT token service
//!
//! Issues and verifies the gateway's bearer tokens: HS256, claims
//! `{agent_id, org_id, iat, exp}`, one-hour default lifetime, ten seconds of
//! clock-skew leeway at verification.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::config::JwtConfig;
use crate::error::{AuthError, AuthResult};
use crate::types::TokenClaims;

/// JWT service for token management
#[derive(Clone)]
pub struct JwtService {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtService {
    /// Create a new JWT service.
    ///
    /// A missing secret is a configuration error: the gateway refuses to
    /// start rather than issue unsigned-equivalent tokens.
    pub fn new(config: JwtConfig) -> AuthResult<Self> {
        if config.secret.is_empty() {
            return Err(AuthError::Config("JWT secret not configured".to_string()));
        }

        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Ok(Self {
            config,
            encoding_key,
            decoding_key,
        })
    }

    /// Issue a bearer token for an agent
    pub fn issue(&self, agent_id: &str, org_id: &str) -> AuthResult<String> {
        let now = Utc::now();
        let expiry = now + Duration::hours(self.config.expiry_hours);

        let claims = TokenClaims {
            agent_id: agent_id.to_string(),
            org_id: org_id.to_string(),
            iat: now.timestamp(),
            exp: expiry.timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Config(format!("Failed to encode token: {}", e)))
    }

    /// Decode and verify a token, returning its claims
    pub fn verify(&self, token: &str) -> AuthResult<TokenClaims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = self.config.leeway_secs;
        validation.set_required_spec_claims(&["exp"]);

        let data = decode::<TokenClaims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    tracing::debug!("Token verification failed: expired");
                    AuthError::TokenExpired
                }
                _ => {
                    tracing::warn!(error = %e, "Token verification failed");
                    AuthError::InvalidToken(e.to_string())
                }
            }
        })?;

        if data.claims.agent_id.is_empty() || data.claims.org_id.is_empty() {
            tracing::warn!("Token verification failed: missing identity claims");
            return Err(AuthError::InvalidToken("missing identity claims".to_string()));
        }

        Ok(data.claims)
    }

    /// Token lifetime in seconds, as reported in registration responses
    pub fn expires_in_secs(&self) -> i64 {
        self.config.expiry_secs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret-key-for-relay-tokens".to_string(),
            expiry_hours: 1,
            leeway_secs: 10,
        }
    }

    fn encode_raw(claims: &TokenClaims, secret: &str) -> String {
        encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn test_issue_and_verify_roundtrip() {
        let service = JwtService::new(test_config()).unwrap();

        let token = service.issue("agent_test123", "org_test456").unwrap();
        let claims = service.verify(&token).unwrap();

        assert_eq!(claims.agent_id, "agent_test123");
        assert_eq!(claims.org_id, "org_test456");
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_missing_secret_is_config_error() {
        let result = JwtService::new(JwtConfig::default());
        assert!(matches!(result, Err(AuthError::Config(_))));
    }

    #[test]
    fn test_expired_token_rejected() {
        let service = JwtService::new(test_config()).unwrap();
        let now = Utc::now().timestamp();

        let token = encode_raw(
            &TokenClaims {
                agent_id: "agent_a".to_string(),
                org_id: "org_b".to_string(),
                iat: now - 7200,
                exp: now - 3600,
            },
            &test_config().secret,
        );

        assert!(matches!(service.verify(&token), Err(AuthError::TokenExpired)));
    }

    #[test]
    fn test_leeway_accepts_just_expired_token() {
        let service = JwtService::new(test_config()).unwrap();
        let now = Utc::now().timestamp();

        // Expired 5 seconds ago, within the 10-second leeway
        let token = encode_raw(
            &TokenClaims {
                agent_id: "agent_a".to_string(),
                org_id: "org_b".to_string(),
                iat: now - 3600,
                exp: now - 5,
            },
            &test_config().secret,
        );

        assert!(service.verify(&token).is_ok());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let service = JwtService::new(test_config()).unwrap();
        let now = Utc::now().timestamp();

        let token = encode_raw(
            &TokenClaims {
                agent_id: "agent_a".to_string(),
                org_id: "org_b".to_string(),
                iat: now,
                exp: now + 3600,
            },
            "some-other-secret",
        );

        assert!(matches!(
            service.verify(&token),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_garbage_token_rejected() {
        let service = JwtService::new(test_config()).unwrap();
        assert!(matches!(
            service.verify("not-a-token"),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_empty_identity_claims_rejected() {
        let service = JwtService::new(test_config()).unwrap();
        let now = Utc::now().timestamp();

        let token = encode_raw(
            &TokenClaims {
                agent_id: String::new(),
                org_id: "org_b".to_string(),
                iat: now,
                exp: now + 3600,
            },
            &test_config().secret,
        );

        assert!(matches!(
            service.verify(&token),
            Err(AuthError::InvalidToken(_))
        ));
    }
}
