use serde_json::Value;
use tracing::warn;

use crate::crypto::Claims;

/// Reserved claim naming the dispatched method.
pub const METHOD_KEY: &str = "_method";

/// Build the claims to sign: `payload` plus `_method = method_name`.
///
/// The caller's payload is left untouched. A `_method` already present in
/// the payload is overwritten by the dispatched name.
pub fn canonical_claims(method_name: &str, payload: &Claims) -> Claims {
    let mut claims = payload.clone();
    let previous = claims.insert(METHOD_KEY.to_string(), Value::String(method_name.to_string()));
    if let Some(previous) = previous {
        warn!(
            method = method_name,
            overwritten = %previous,
            "payload already carried a {} claim; using the dispatched method name",
            METHOD_KEY
        );
    }
    claims
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(v: Value) -> Claims {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn adds_method_to_every_payload() {
        let payloads = [
            json!({}),
            json!({"x": 1}),
            json!({"a": "f9644caf-0615-40a1-afd3-c7b13420fa0e", "b": 1234}),
            json!({"nested": {"list": [1, null, true]}, "text": "Grüße"}),
        ];
        for payload in payloads {
            let payload = obj(payload);
            let claims = canonical_claims("no_return_no_error", &payload);
            let mut expected = payload.clone();
            expected.insert("_method".into(), json!("no_return_no_error"));
            assert_eq!(claims, expected);
        }
    }

    #[test]
    fn leaves_payload_untouched() {
        let payload = obj(json!({"x": 1}));
        let _ = canonical_claims("ping", &payload);
        assert_eq!(payload, obj(json!({"x": 1})));
    }

    #[test]
    fn dispatched_name_wins_over_payload() {
        let payload = obj(json!({"_method": "spoofed", "x": 1}));
        let claims = canonical_claims("ping", &payload);
        assert_eq!(claims, obj(json!({"_method": "ping", "x": 1})));
    }
}
