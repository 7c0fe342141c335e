//! Authentication error types
//!
//! Each variant maps to a stable failure reason recorded in the auth-event
//! ledger; messages are safe for external exposure.

use thiserror::Error;

/// Authentication error types
#[derive(Debug, Error)]
pub enum AuthError {
    /// No bearer token on a request that requires one
    #[error("Missing authorization token")]
    MissingToken,

    /// Token signature valid but past its expiry
    #[error("Token expired")]
    TokenExpired,

    /// Token malformed, wrong signature, or missing claims
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// Token decoded but its agent is unknown or deactivated
    #[error("Agent not found or inactive")]
    AgentInactive,

    /// Auth subsystem misconfigured (missing secret)
    #[error("Auth configuration error: {0}")]
    Config(String),
}

/// Result type alias for authentication operations
pub type AuthResult<T> = Result<T, AuthError>;
