//! Seal signing and verification

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use ed25519_dalek::{Signature, Signer, Verifier};
use relay_types::{Manifest, Seal};

use crate::canonical::canonical_payload;
use crate::error::{CryptoError, CryptoResult};
use crate::keys::{decode_public_key, SealKeypair};

/// Mints and verifies Ed25519 seals over the canonical payload
#[derive(Clone)]
pub struct SealSigner {
    keypair: SealKeypair,
}

impl SealSigner {
    /// Create a signer around a loaded keypair
    pub fn new(keypair: SealKeypair) -> Self {
        Self { keypair }
    }

    /// Create a signer from base64 private key material
    pub fn from_base64(encoded: &str) -> CryptoResult<Self> {
        Ok(Self::new(SealKeypair::from_base64(encoded)?))
    }

    /// Base64 public key embedded into every minted seal
    pub fn public_key_base64(&self) -> String {
        self.keypair.public_key_base64()
    }

    /// Mint a seal for a decided manifest.
    ///
    /// A seal is minted for denials too, so the ledger carries a signed
    /// record of every decision; callers decide what to hand back to the
    /// requesting agent.
    pub fn create_seal(
        &self,
        manifest: &Manifest,
        approved: bool,
        policy_version: &str,
        denial_reason: Option<String>,
        ttl_minutes: i64,
    ) -> CryptoResult<Seal> {
        let payload = canonical_payload(manifest, policy_version, approved);

        let signature = self
            .keypair
            .signing_key()
            .try_sign(&payload)
            .map_err(|e| CryptoError::SigningFailed(e.to_string()))?;

        Ok(Seal {
            seal_id: Seal::generate_seal_id(manifest.manifest_id),
            manifest_id: manifest.manifest_id,
            approved,
            policy_version: policy_version.to_string(),
            denial_reason,
            signature: BASE64.encode(signature.to_bytes()),
            public_key: self.public_key_base64(),
            issued_at: chrono::Utc::now(),
            expires_at: Seal::create_expiry(ttl_minutes),
            executed: false,
            executed_at: None,
        })
    }
}

/// Verify a seal against the manifest it claims to decide.
///
/// Reconstructs the canonical payload from the manifest plus the seal's
/// stored `policy_version` and `approved`, then checks the signature against
/// the seal's embedded public key. Every failure mode returns `false`;
/// nothing escapes.
pub fn verify_seal(seal: &Seal, manifest: &Manifest) -> bool {
    let payload = canonical_payload(manifest, &seal.policy_version, seal.approved);
    verify_detached(&seal.signature, &seal.public_key, &payload)
}

/// Verify a detached signature over an arbitrary payload.
///
/// Downstream executors use this to check seals without a signer instance.
pub fn verify_detached(signature_b64: &str, public_key_b64: &str, payload: &[u8]) -> bool {
    let Ok(signature_bytes) = BASE64.decode(signature_b64) else {
        return false;
    };
    let Ok(signature_array) = <[u8; 64]>::try_from(signature_bytes.as_slice()) else {
        return false;
    };
    let signature = Signature::from_bytes(&signature_array);

    let Ok(verifying_key) = decode_public_key(public_key_b64) else {
        return false;
    };

    verifying_key.verify(payload, &signature).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine as _;
    use relay_types::{ActionRequest, AgentContext, Justification};
    use uuid::Uuid;

    fn sample_manifest() -> Manifest {
        Manifest {
            manifest_id: Uuid::new_v4(),
            version: "1.0".to_string(),
            timestamp: chrono::Utc::now(),
            agent: AgentContext {
                agent_id: "agent_acme_admin".to_string(),
                org_id: "org_acme".to_string(),
                user_id: None,
            },
            action: ActionRequest {
                provider: "stripe".to_string(),
                method: "create_payment".to_string(),
                parameters: serde_json::json!({"amount": 4000, "currency": "USD"}),
            },
            justification: Justification {
                reasoning: "demo".to_string(),
                confidence_score: Some(0.9),
                context: None,
            },
            environment: "production".to_string(),
        }
    }

    fn signer() -> SealSigner {
        SealSigner::new(SealKeypair::generate())
    }

    #[test]
    fn test_sign_and_verify() {
        let signer = signer();
        let manifest = sample_manifest();

        let seal = signer
            .create_seal(&manifest, true, "v1.0.0", None, 5)
            .unwrap();

        assert!(seal.approved);
        assert!(!seal.signature.is_empty());
        assert!(!seal.public_key.is_empty());
        assert!(verify_seal(&seal, &manifest));
    }

    #[test]
    fn test_denial_seal_verifies_too() {
        let signer = signer();
        let manifest = sample_manifest();

        let seal = signer
            .create_seal(
                &manifest,
                false,
                "v1.0.0",
                Some("amount exceeds limit".to_string()),
                5,
            )
            .unwrap();

        assert!(!seal.approved);
        assert!(verify_seal(&seal, &manifest));
    }

    #[test]
    fn test_tampered_parameters_fail() {
        let signer = signer();
        let mut manifest = sample_manifest();
        let seal = signer
            .create_seal(&manifest, true, "v1.0.0", None, 5)
            .unwrap();

        manifest.action.parameters = serde_json::json!({"amount": 9999, "currency": "USD"});
        assert!(!verify_seal(&seal, &manifest));
    }

    #[test]
    fn test_tampered_provider_and_method_fail() {
        let signer = signer();
        let manifest = sample_manifest();
        let seal = signer
            .create_seal(&manifest, true, "v1.0.0", None, 5)
            .unwrap();

        let mut other = manifest.clone();
        other.action.provider = "aws".to_string();
        assert!(!verify_seal(&seal, &other));

        let mut other = manifest;
        other.action.method = "refund_payment".to_string();
        assert!(!verify_seal(&seal, &other));
    }

    #[test]
    fn test_tampered_identity_fails() {
        let signer = signer();
        let manifest = sample_manifest();
        let seal = signer
            .create_seal(&manifest, true, "v1.0.0", None, 5)
            .unwrap();

        let mut other = manifest.clone();
        other.agent.agent_id = "agent_mallory".to_string();
        assert!(!verify_seal(&seal, &other));

        let mut other = manifest;
        other.agent.org_id = "org_mallory".to_string();
        assert!(!verify_seal(&seal, &other));
    }

    #[test]
    fn test_tampered_decision_fails() {
        let signer = signer();
        let manifest = sample_manifest();
        let mut seal = signer
            .create_seal(&manifest, false, "v1.0.0", Some("denied".to_string()), 5)
            .unwrap();

        // Flipping a denial into an approval must break the signature
        seal.approved = true;
        assert!(!verify_seal(&seal, &manifest));
    }

    #[test]
    fn test_tampered_policy_version_fails() {
        let signer = signer();
        let manifest = sample_manifest();
        let mut seal = signer
            .create_seal(&manifest, true, "v1.0.0", None, 5)
            .unwrap();

        seal.policy_version = "v9.9.9".to_string();
        assert!(!verify_seal(&seal, &manifest));
    }

    #[test]
    fn test_wrong_key_fails() {
        let manifest = sample_manifest();
        let seal = signer()
            .create_seal(&manifest, true, "v1.0.0", None, 5)
            .unwrap();

        let mut tampered = seal;
        tampered.public_key = SealKeypair::generate().public_key_base64();
        assert!(!verify_seal(&tampered, &manifest));
    }

    #[test]
    fn test_garbage_signature_is_false_not_panic() {
        let manifest = sample_manifest();
        let mut seal = signer()
            .create_seal(&manifest, true, "v1.0.0", None, 5)
            .unwrap();

        seal.signature = "!!!not-base64!!!".to_string();
        assert!(!verify_seal(&seal, &manifest));

        seal.signature = BASE64.encode([0u8; 10]);
        assert!(!verify_seal(&seal, &manifest));
    }

    #[test]
    fn test_detached_verification() {
        let signer = signer();
        let manifest = sample_manifest();
        let seal = signer
            .create_seal(&manifest, true, "v1.0.0", None, 5)
            .unwrap();

        let payload = canonical_payload(&manifest, &seal.policy_version, seal.approved);
        assert!(verify_detached(&seal.signature, &seal.public_key, &payload));
        assert!(!verify_detached(&seal.signature, &seal.public_key, b"other payload"));
    }

    #[test]
    fn test_seal_ttl_written_into_expiry() {
        let signer = signer();
        let manifest = sample_manifest();
        let seal = signer
            .create_seal(&manifest, true, "v1.0.0", None, 5)
            .unwrap();

        let ttl = seal.expires_at - seal.issued_at;
        assert!(ttl >= chrono::Duration::seconds(299));
        assert!(ttl <= chrono::Duration::seconds(301));
    }
}
