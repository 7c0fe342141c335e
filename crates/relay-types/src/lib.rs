//! Relay Types - Canonical domain types for the Relay policy decision point
//!
//! This crate contains the foundational types for Relay with zero dependencies
//! on other relay crates:
//!
//! - Manifest types (agent context, action request, justification)
//! - Seal types (cryptographic decision records)
//! - Shared validation and error types
//!
//! # Architectural Invariants
//!
//! These types support the core Relay guarantees:
//!
//! 1. A seal binds a policy decision to exactly one manifest
//! 2. Seals are time-bounded and one-time-use
//! 3. Manifests are immutable once submitted
//! 4. Provider and method names are normalized before evaluation

pub mod error;
pub mod manifest;
pub mod seal;

pub use error::{RelayError, RelayResult};
pub use manifest::{ActionRequest, AgentContext, Justification, Manifest};
pub use seal::Seal;

/// Version of the manifest schema accepted by this gateway
pub const MANIFEST_VERSION: &str = "1.0";
