//! Application state shared across handlers
//!
//! Everything here is initialized once at startup and read-only afterwards;
//! the only mutable resource crossing request boundaries is the connection
//! pool inside `Database`.

use relay_auth::JwtService;
use relay_crypto::SealSigner;
use relay_db::Database;
use relay_policy::PolicyClient;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool and repositories
    pub db: Database,
    /// Bearer-token service
    pub jwt: JwtService,
    /// Seal minting and verification
    pub signer: SealSigner,
    /// External policy evaluator client
    pub policy: PolicyClient,
    /// Whether requests to flagged endpoints must carry a token
    pub auth_required: bool,
    /// Seal time-to-live written into `expires_at`
    pub seal_ttl_minutes: i64,
}
