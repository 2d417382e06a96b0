//! RFC 7515 compact serialization: `b64url(header).b64url(payload).b64url(sig)`.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use ed25519_dalek::{Signature, Signer as _, Verifier as _};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::{Sha256, Sha384, Sha512};

use crate::crypto::{Algorithm, Claims, SecretKey, SignError, VerifyKey};

/// JOSE header. Field order gives `{"alg":..,"typ":"JWT"}`.
#[derive(Debug, Serialize, Deserialize)]
struct Header {
    alg: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    typ: Option<String>,
    /// No critical extensions are understood, so any `crit` is rejected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    crit: Option<Vec<String>>,
}

macro_rules! hmac_with {
    ($digest:ty, $key:expr) => {
        Hmac::<$digest>::new_from_slice($key)
            .map_err(|e| SignError::InvalidKey(e.to_string()))
    };
}

/// Sign `claims` into a compact token.
pub fn encode(claims: &Claims, secret: &SecretKey, alg: Algorithm) -> Result<String, SignError> {
    let header = Header { alg: alg.as_str().to_string(), typ: Some("JWT".into()), crit: None };
    let header_json = serde_json::to_vec(&header)?;
    let payload_json = serde_json::to_vec(claims)?;

    let signing_input = format!(
        "{}.{}",
        URL_SAFE_NO_PAD.encode(header_json),
        URL_SAFE_NO_PAD.encode(payload_json)
    );
    let signature = raw_sign(alg, secret, signing_input.as_bytes())?;
    Ok(format!("{}.{}", signing_input, URL_SAFE_NO_PAD.encode(signature)))
}

/// Check `token` against `key` and return the raw payload bytes.
///
/// The header's `alg` must be one of `allowed` and the header must not
/// carry a `crit` list.
pub fn decode(token: &str, key: &VerifyKey, allowed: &[Algorithm]) -> Result<Vec<u8>, SignError> {
    let mut parts = token.split('.');
    let (header_b64, payload_b64, sig_b64) = match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(h), Some(p), Some(s), None) => (h, p, s),
        _ => return Err(SignError::Malformed("expected three dot-separated segments".into())),
    };

    let header_bytes = b64_decode(header_b64, "header")?;
    let header: Header = serde_json::from_slice(&header_bytes)
        .map_err(|e| SignError::Malformed(format!("header: {e}")))?;
    let alg: Algorithm = header
        .alg
        .parse()
        .map_err(|_| SignError::AlgorithmNotAllowed(header.alg.clone()))?;
    if !allowed.contains(&alg) {
        return Err(SignError::AlgorithmNotAllowed(header.alg));
    }
    if let Some(crit) = header.crit {
        return Err(SignError::Malformed(format!(
            "unsupported critical header parameters: {}",
            crit.join(", ")
        )));
    }

    let signature = b64_decode(sig_b64, "signature")?;
    // signing input is the original text, not a re-encoding
    let signing_input_len = header_b64.len() + 1 + payload_b64.len();
    raw_verify(alg, key, token[..signing_input_len].as_bytes(), &signature)?;

    b64_decode(payload_b64, "payload")
}

fn b64_decode(segment: &str, what: &str) -> Result<Vec<u8>, SignError> {
    URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|e| SignError::Malformed(format!("{what}: {e}")))
}

fn raw_sign(alg: Algorithm, secret: &SecretKey, msg: &[u8]) -> Result<Vec<u8>, SignError> {
    let key = secret.as_bytes();
    let sig = match alg {
        Algorithm::HS256 => {
            let mut mac = hmac_with!(Sha256, key)?;
            mac.update(msg);
            mac.finalize().into_bytes().to_vec()
        }
        Algorithm::HS384 => {
            let mut mac = hmac_with!(Sha384, key)?;
            mac.update(msg);
            mac.finalize().into_bytes().to_vec()
        }
        Algorithm::HS512 => {
            let mut mac = hmac_with!(Sha512, key)?;
            mac.update(msg);
            mac.finalize().into_bytes().to_vec()
        }
        Algorithm::EdDSA => secret.ed25519_signing_key()?.sign(msg).to_bytes().to_vec(),
    };
    Ok(sig)
}

fn raw_verify(alg: Algorithm, key: &VerifyKey, msg: &[u8], sig: &[u8]) -> Result<(), SignError> {
    match (alg, key) {
        (Algorithm::HS256, VerifyKey::Shared(secret)) => {
            let mut mac = hmac_with!(Sha256, secret.as_bytes())?;
            mac.update(msg);
            mac.verify_slice(sig).map_err(|_| SignError::BadSignature)
        }
        (Algorithm::HS384, VerifyKey::Shared(secret)) => {
            let mut mac = hmac_with!(Sha384, secret.as_bytes())?;
            mac.update(msg);
            mac.verify_slice(sig).map_err(|_| SignError::BadSignature)
        }
        (Algorithm::HS512, VerifyKey::Shared(secret)) => {
            let mut mac = hmac_with!(Sha512, secret.as_bytes())?;
            mac.update(msg);
            mac.verify_slice(sig).map_err(|_| SignError::BadSignature)
        }
        (Algorithm::EdDSA, VerifyKey::Ed25519(public)) => {
            let sig = Signature::from_slice(sig).map_err(|_| SignError::BadSignature)?;
            public.verify(msg, &sig).map_err(|_| SignError::BadSignature)
        }
        // a seed is never accepted for verification
        (Algorithm::EdDSA, VerifyKey::Shared(_)) => {
            Err(SignError::InvalidKey("EdDSA needs an Ed25519 public key (pub:<hex>)".into()))
        }
        (_, VerifyKey::Ed25519(_)) => Err(SignError::InvalidKey(format!("{alg} needs a shared secret"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn claims(v: serde_json::Value) -> Claims {
        v.as_object().cloned().unwrap()
    }

    fn shared(text: &str) -> VerifyKey {
        VerifyKey::Shared(SecretKey::from_text(text))
    }

    #[test]
    fn header_is_compact_and_ordered() {
        let token = encode(&claims(json!({"a": 1})), &SecretKey::from_text("k"), Algorithm::HS256).unwrap();
        let header = URL_SAFE_NO_PAD.decode(token.split('.').next().unwrap()).unwrap();
        assert_eq!(header, br#"{"alg":"HS256","typ":"JWT"}"#);
    }

    #[test]
    fn payload_is_compact_json_with_sorted_keys() {
        let token = encode(&claims(json!({"b": 2, "_method": "m", "a": [1, 2]})), &SecretKey::from_text("k"), Algorithm::HS512).unwrap();
        let payload = decode(&token, &shared("k"), &[Algorithm::HS512]).unwrap();
        assert_eq!(payload, br#"{"_method":"m","a":[1,2],"b":2}"#);
    }

    #[test]
    fn known_hs256_vector() {
        // header {"alg":"HS256","typ":"JWT"}, payload {"a":1}, key "secret"
        let token = encode(&claims(json!({"a": 1})), &SecretKey::from_text("secret"), Algorithm::HS256).unwrap();
        let mut parts = token.split('.');
        assert_eq!(parts.next().unwrap(), "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9");
        assert_eq!(parts.next().unwrap(), "eyJhIjoxfQ");
        assert_eq!(parts.next().unwrap().len(), 43);
    }

    #[test]
    fn tampered_payload_fails() {
        let key = SecretKey::from_text("k");
        let token = encode(&claims(json!({"a": 1})), &key, Algorithm::HS256).unwrap();
        let parts: Vec<&str> = token.split('.').collect();
        let forged = format!("{}.{}.{}", parts[0], URL_SAFE_NO_PAD.encode(br#"{"a":2}"#), parts[2]);
        assert!(matches!(decode(&forged, &key.clone().into(), &[Algorithm::HS256]), Err(SignError::BadSignature)));
    }

    #[test]
    fn wrong_secret_fails() {
        let token = encode(&claims(json!({})), &SecretKey::from_text("a"), Algorithm::HS384).unwrap();
        assert!(matches!(
            decode(&token, &shared("b"), &[Algorithm::HS384]),
            Err(SignError::BadSignature)
        ));
    }

    #[test]
    fn disallowed_algorithm_is_rejected() {
        let key = SecretKey::from_text("k");
        let token = encode(&claims(json!({})), &key, Algorithm::HS256).unwrap();
        assert!(matches!(
            decode(&token, &key.into(), &[Algorithm::HS512]),
            Err(SignError::AlgorithmNotAllowed(alg)) if alg == "HS256"
        ));
    }

    #[test]
    fn eddsa_verifies_with_public_key_only() {
        let seed = SecretKey::from_bytes([9u8; 32]);
        let token = encode(&claims(json!({"x": "y"})), &seed, Algorithm::EdDSA).unwrap();
        let public = VerifyKey::parse(&seed.verify_key(Algorithm::EdDSA).unwrap().to_encoded()).unwrap();
        assert_eq!(decode(&token, &public, &[Algorithm::EdDSA]).unwrap(), br#"{"x":"y"}"#);

        let other = SecretKey::from_bytes([8u8; 32]).verify_key(Algorithm::EdDSA).unwrap();
        assert!(matches!(decode(&token, &other, &[Algorithm::EdDSA]), Err(SignError::BadSignature)));
    }

    #[test]
    fn eddsa_refuses_a_seed_as_verify_key() {
        let seed = SecretKey::from_bytes([9u8; 32]);
        let token = encode(&claims(json!({})), &seed, Algorithm::EdDSA).unwrap();
        assert!(matches!(
            decode(&token, &VerifyKey::Shared(seed.clone()), &[Algorithm::EdDSA]),
            Err(SignError::InvalidKey(_))
        ));

        let hmac_token = encode(&claims(json!({})), &seed, Algorithm::HS256).unwrap();
        let public = seed.verify_key(Algorithm::EdDSA).unwrap();
        assert!(matches!(decode(&hmac_token, &public, &[Algorithm::HS256]), Err(SignError::InvalidKey(_))));
    }

    #[test]
    fn critical_header_parameters_are_rejected() {
        let key = SecretKey::from_text("k");
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","crit":["x-unknown"],"x-unknown":1}"#);
        let payload = URL_SAFE_NO_PAD.encode(br#"{"a":1}"#);
        let input = format!("{header}.{payload}");
        let sig = raw_sign(Algorithm::HS256, &key, input.as_bytes()).unwrap();
        let token = format!("{input}.{}", URL_SAFE_NO_PAD.encode(sig));

        let err = decode(&token, &key.into(), &[Algorithm::HS256]).unwrap_err();
        assert!(matches!(&err, SignError::Malformed(msg) if msg.contains("x-unknown")), "{err}");
    }

    #[test]
    fn malformed_tokens() {
        let key = shared("k");
        for bad in ["", "a.b", "a.b.c.d", "!!.e30.AA"] {
            assert!(matches!(decode(bad, &key, &Algorithm::SUPPORTED), Err(SignError::Malformed(_))), "{bad}");
        }
    }
}
