//! Crypto error types

use thiserror::Error;

/// Errors from key handling and seal signing
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("Invalid key material: {0}")]
    InvalidKey(String),

    #[error("Signing failed: {0}")]
    SigningFailed(String),
}

/// Result type for crypto operations
pub type CryptoResult<T> = Result<T, CryptoError>;
