//! Relay Crypto - seal minting and verification
//!
//! Implements the seal engine: a deterministic canonical payload over the
//! decided manifest, signed with Ed25519. The canonical byte string is the
//! contract every verifier relies on; the signature binds the decision
//! (`approved`, `policy_version`) to the exact manifest content so neither
//! side can be swapped after the fact.

pub mod canonical;
pub mod error;
pub mod keys;
pub mod signer;

pub use canonical::canonical_payload;
pub use error::{CryptoError, CryptoResult};
pub use keys::SealKeypair;
pub use signer::{verify_detached, verify_seal, SealSigner};
