//! Signing key management
//!
//! Keys arrive as base64, either a 32-byte Ed25519 seed or a 64-byte
//! seed-plus-public-key blob (the layout the keygen tool emits). The derived
//! public key travels inside every seal so verification never needs key
//! distribution.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use ed25519_dalek::{SigningKey, VerifyingKey};
use rand::rngs::OsRng;

use crate::error::{CryptoError, CryptoResult};

/// An Ed25519 keypair for seal signing
#[derive(Clone)]
pub struct SealKeypair {
    signing_key: SigningKey,
    verifying_key: VerifyingKey,
}

impl SealKeypair {
    /// Generate a new random keypair
    pub fn generate() -> Self {
        let mut csprng = OsRng;
        let signing_key = SigningKey::generate(&mut csprng);
        let verifying_key = signing_key.verifying_key();

        Self {
            signing_key,
            verifying_key,
        }
    }

    /// Load a keypair from base64 key material.
    ///
    /// Accepts a 32-byte seed or a 64-byte seed||public blob; only the seed
    /// half is used, the public key is always re-derived.
    pub fn from_base64(encoded: &str) -> CryptoResult<Self> {
        let bytes = BASE64
            .decode(encoded.trim())
            .map_err(|e| CryptoError::InvalidKey(format!("base64 decode: {}", e)))?;

        if bytes.len() != 32 && bytes.len() != 64 {
            return Err(CryptoError::InvalidKey(format!(
                "expected 32 or 64 key bytes, got {}",
                bytes.len()
            )));
        }

        let mut seed = [0u8; 32];
        seed.copy_from_slice(&bytes[..32]);

        let signing_key = SigningKey::from_bytes(&seed);
        let verifying_key = signing_key.verifying_key();

        Ok(Self {
            signing_key,
            verifying_key,
        })
    }

    /// Get the signing key (never leaves this crate)
    pub(crate) fn signing_key(&self) -> &SigningKey {
        &self.signing_key
    }

    /// Get the verifying key
    pub fn verifying_key(&self) -> &VerifyingKey {
        &self.verifying_key
    }

    /// Public key as base64
    pub fn public_key_base64(&self) -> String {
        BASE64.encode(self.verifying_key.as_bytes())
    }

    /// Private key material as base64, seed||public layout (for secure
    /// storage only)
    pub fn private_key_base64(&self) -> String {
        let mut blob = [0u8; 64];
        blob[..32].copy_from_slice(&self.signing_key.to_bytes());
        blob[32..].copy_from_slice(self.verifying_key.as_bytes());
        BASE64.encode(blob)
    }
}

/// Parse a base64 public key into a verifying key
pub(crate) fn decode_public_key(encoded: &str) -> CryptoResult<VerifyingKey> {
    let bytes = BASE64
        .decode(encoded)
        .map_err(|e| CryptoError::InvalidKey(format!("base64 decode: {}", e)))?;

    let key_bytes: [u8; 32] = bytes
        .as_slice()
        .try_into()
        .map_err(|_| CryptoError::InvalidKey("public key must be 32 bytes".to_string()))?;

    VerifyingKey::from_bytes(&key_bytes)
        .map_err(|e| CryptoError::InvalidKey(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine as _;

    #[test]
    fn test_roundtrip_64_byte_blob() {
        let keypair = SealKeypair::generate();
        let restored = SealKeypair::from_base64(&keypair.private_key_base64()).unwrap();

        assert_eq!(keypair.public_key_base64(), restored.public_key_base64());
    }

    #[test]
    fn test_load_32_byte_seed() {
        let keypair = SealKeypair::generate();
        let seed_b64 = BASE64.encode(keypair.signing_key.to_bytes());

        let restored = SealKeypair::from_base64(&seed_b64).unwrap();
        assert_eq!(keypair.public_key_base64(), restored.public_key_base64());
    }

    #[test]
    fn test_reject_wrong_length() {
        let short = BASE64.encode([0u8; 16]);
        assert!(matches!(
            SealKeypair::from_base64(&short),
            Err(CryptoError::InvalidKey(_))
        ));
    }

    #[test]
    fn test_reject_invalid_base64() {
        assert!(SealKeypair::from_base64("not valid base64!!!").is_err());
    }
}
