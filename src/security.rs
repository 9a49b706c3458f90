//! Redaction of sensitive values before they reach logs.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use serde_json::Value;

const REDACTED: &str = "[REDACTED]";

/// Keys whose values never appear in logs, compared case-insensitively.
/// Both camelCase wire names and snake_case internal names are listed.
static SENSITIVE_FIELDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    HashSet::from([
        "password",
        "passwordhash",
        "password_hash",
        "salt",
        "token",
        "accesstoken",
        "access_token",
        "refreshtoken",
        "refresh_token",
        "secret",
        "apikey",
        "api_key",
        "privatekey",
        "private_key",
        "authorization",
        "cookie",
        "ssn",
        "creditcard",
        "credit_card",
        "cvv",
        "pin",
    ])
});

/// Recursively replace sensitive fields with a placeholder. Arrays are
/// walked element by element; scalars pass through untouched.
pub fn redact(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, inner)| {
                    if SENSITIVE_FIELDS.contains(key.to_lowercase().as_str()) {
                        (key.clone(), Value::String(REDACTED.to_string()))
                    } else {
                        (key.clone(), redact(inner))
                    }
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(redact).collect()),
        other => other.clone(),
    }
}

/// More aggressive variant for log lines: also blanks contact fields at
/// the top level, which are fine in responses but not in logs.
pub fn redact_for_logging(value: &Value) -> Value {
    let mut filtered = redact(value);

    if let Value::Object(map) = &mut filtered {
        for field in ["email", "phone", "address", "ip"] {
            if let Some(entry) = map.get_mut(field) {
                *entry = Value::String(REDACTED.to_string());
            }
        }
    }

    filtered
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_redacts_sensitive_keys_case_insensitively() {
        let input = json!({
            "email": "a@example.com",
            "password": "hunter22",
            "PASSWORD": "hunter22",
            "apiKey": "abc123",
        });

        let filtered = redact(&input);
        assert_eq!(filtered["email"], "a@example.com");
        assert_eq!(filtered["password"], REDACTED);
        assert_eq!(filtered["PASSWORD"], REDACTED);
        assert_eq!(filtered["apiKey"], REDACTED);
    }

    #[test]
    fn test_redacts_nested_objects_and_arrays() {
        let input = json!({
            "users": [
                { "email": "a@example.com", "password_hash": "x" },
                { "email": "b@example.com", "token": "y" },
            ],
            "meta": { "secret": "z", "count": 2 },
        });

        let filtered = redact(&input);
        assert_eq!(filtered["users"][0]["password_hash"], REDACTED);
        assert_eq!(filtered["users"][1]["token"], REDACTED);
        assert_eq!(filtered["meta"]["secret"], REDACTED);
        assert_eq!(filtered["meta"]["count"], 2);
    }

    #[test]
    fn test_logging_variant_blanks_contact_fields() {
        let input = json!({
            "email": "a@example.com",
            "ip": "10.0.0.1",
            "nested": { "email": "keep@example.com" },
        });

        let filtered = redact_for_logging(&input);
        assert_eq!(filtered["email"], REDACTED);
        assert_eq!(filtered["ip"], REDACTED);
        assert_eq!(filtered["nested"]["email"], "keep@example.com");
    }

    #[test]
    fn test_scalars_pass_through() {
        assert_eq!(redact(&json!("plain")), json!("plain"));
        assert_eq!(redact(&json!(42)), json!(42));
        assert_eq!(redact(&Value::Null), Value::Null);
    }
}
