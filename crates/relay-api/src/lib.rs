//! Relay API - REST surface for the gateway
//!
//! Provides the HTTP interface over the Relay core:
//! - Organization and agent registration (tenancy)
//! - Manifest validation (policy decision + seal minting)
//! - Seal verification and one-time-use execution marking
//! - Audit ledger queries and stats
//!
//! Handlers are thin: request parsing, tenant checks, and response shaping.
//! The decision flow itself lives in the capability crates.

pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult, ErrorResponse};
pub use routes::{create_router, ApiConfig};
pub use state::AppState;
