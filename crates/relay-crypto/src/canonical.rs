//! Canonical signing payload
//!
//! The byte string signed into a seal must reconstruct identically on the
//! verifier side, so serialization is pinned here rather than left to
//! whatever a JSON library happens to emit: object keys are sorted at every
//! nesting level and separators are exactly `,` and `:` with no whitespace.

use relay_types::Manifest;
use serde_json::Value;

/// Build the canonical byte string for a manifest decision.
///
/// The payload covers exactly these fields:
/// `manifest_id`, `timestamp`, `agent_id`, `org_id`, `provider`, `method`,
/// `parameters`, `policy_version`, `approved`. Binding `policy_version` and
/// `approved` prevents a denial seal being replayed against an approved
/// manifest; binding `parameters` prevents post-approval tampering.
pub fn canonical_payload(manifest: &Manifest, policy_version: &str, approved: bool) -> Vec<u8> {
    let payload = serde_json::json!({
        "manifest_id": manifest.manifest_id.to_string(),
        "timestamp": manifest
            .timestamp
            .to_rfc3339_opts(chrono::SecondsFormat::Micros, true),
        "agent_id": manifest.agent.agent_id,
        "org_id": manifest.agent.org_id,
        "provider": manifest.action.provider,
        "method": manifest.action.method,
        "parameters": manifest.action.parameters,
        "policy_version": policy_version,
        "approved": approved,
    });

    let mut out = String::new();
    write_canonical(&payload, &mut out);
    out.into_bytes()
}

/// Serialize a JSON value with sorted keys and compact separators
fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort_unstable();

            out.push('{');
            for (i, key) in keys.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                // Key escaping is JSON string escaping
                out.push_str(&Value::String((*key).clone()).to_string());
                out.push(':');
                write_canonical(&map[*key], out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        // Scalars already render compactly
        scalar => out.push_str(&scalar.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use relay_types::{ActionRequest, AgentContext, Justification};
    use uuid::Uuid;

    fn fixed_manifest() -> Manifest {
        Manifest {
            manifest_id: Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap(),
            version: "1.0".to_string(),
            timestamp: chrono::Utc.with_ymd_and_hms(2026, 1, 17, 10, 30, 0).unwrap(),
            agent: AgentContext {
                agent_id: "agent_acme_admin".to_string(),
                org_id: "org_acme".to_string(),
                user_id: None,
            },
            action: ActionRequest {
                provider: "stripe".to_string(),
                method: "create_payment".to_string(),
                parameters: serde_json::json!({"currency": "USD", "amount": 4000}),
            },
            justification: Justification {
                reasoning: "demo".to_string(),
                confidence_score: None,
                context: None,
            },
            environment: "production".to_string(),
        }
    }

    #[test]
    fn test_canonical_bytes_pinned() {
        let payload = canonical_payload(&fixed_manifest(), "v1.0.0", true);

        let expected = concat!(
            "{\"agent_id\":\"agent_acme_admin\",",
            "\"approved\":true,",
            "\"manifest_id\":\"550e8400-e29b-41d4-a716-446655440000\",",
            "\"method\":\"create_payment\",",
            "\"org_id\":\"org_acme\",",
            "\"parameters\":{\"amount\":4000,\"currency\":\"USD\"},",
            "\"policy_version\":\"v1.0.0\",",
            "\"provider\":\"stripe\",",
            "\"timestamp\":\"2026-01-17T10:30:00.000000Z\"}",
        );
        assert_eq!(String::from_utf8(payload).unwrap(), expected);
    }

    #[test]
    fn test_nested_parameter_keys_sorted() {
        let mut manifest = fixed_manifest();
        manifest.action.parameters = serde_json::json!({
            "zebra": {"b": 2, "a": 1},
            "alpha": [{"y": true, "x": false}]
        });

        let payload = String::from_utf8(canonical_payload(&manifest, "v1", false)).unwrap();

        assert!(payload.contains("\"parameters\":{\"alpha\":[{\"x\":false,\"y\":true}],\"zebra\":{\"a\":1,\"b\":2}}"));
    }

    #[test]
    fn test_no_whitespace_in_payload() {
        let payload = String::from_utf8(canonical_payload(&fixed_manifest(), "v1.0.0", true)).unwrap();
        assert!(!payload.contains(' '));
        assert!(!payload.contains('\n'));
    }

    #[test]
    fn test_decision_changes_payload() {
        let manifest = fixed_manifest();
        let approved = canonical_payload(&manifest, "v1.0.0", true);
        let denied = canonical_payload(&manifest, "v1.0.0", false);
        let other_version = canonical_payload(&manifest, "v2.0.0", true);

        assert_ne!(approved, denied);
        assert_ne!(approved, other_version);
    }
}
