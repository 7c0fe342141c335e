//! Relay Authentication Layer
//!
//! Bearer-token authentication for the gateway: HMAC-SHA256 signed JSON
//! tokens binding every request to an `(agent_id, org_id)` pair. Tokens are
//! minted at registration time and verified on each protected request; the
//! store-backed active-agent check and auth-event logging live in the API
//! layer, which owns the database handle.

pub mod config;
pub mod error;
pub mod jwt;
pub mod types;

pub use config::JwtConfig;
pub use error::{AuthError, AuthResult};
pub use jwt::JwtService;
pub use types::{AuthContext, TokenClaims};
