//! Identifier minting for the tenancy registry
//!
//! Organization and agent ids carry 64 bits of randomness; collisions are
//! effectively unreachable, and callers still retry once on a duplicate-key
//! error before giving up.

use rand::RngCore;

/// Mint an organization id: `org_` + 16 hex chars
pub fn mint_org_id() -> String {
    format!("org_{}", random_hex())
}

/// Mint an agent id: `agent_` + 16 hex chars
pub fn mint_agent_id() -> String {
    format!("agent_{}", random_hex())
}

/// The id of the admin agent created alongside an organization
pub fn admin_agent_id(org_id: &str) -> String {
    format!("agent_{}_admin", org_id)
}

fn random_hex() -> String {
    let mut bytes = [0u8; 8];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_org_id_format() {
        let org_id = mint_org_id();
        assert!(org_id.starts_with("org_"));
        assert_eq!(org_id.len(), 4 + 16);
        assert!(org_id[4..].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_agent_id_format() {
        let agent_id = mint_agent_id();
        assert!(agent_id.starts_with("agent_"));
        assert_eq!(agent_id.len(), 6 + 16);
    }

    #[test]
    fn test_admin_agent_id() {
        assert_eq!(
            admin_agent_id("org_0123456789abcdef"),
            "agent_org_0123456789abcdef_admin"
        );
    }

    #[test]
    fn test_ids_are_random() {
        assert_ne!(mint_org_id(), mint_org_id());
        assert_ne!(mint_agent_id(), mint_agent_id());
    }
}
