use serde_json::{Map, Value};

use crate::crypto::{jws, Algorithm, SecretKey, SignError, VerifyKey};

/// The mapping that gets signed: call arguments plus the reserved `_method`.
pub type Claims = Map<String, Value>;

/// Trait for turning claims into a compact signed token
pub trait ClaimsSigner: Send + Sync {
    /// `algorithm` is the JOSE name; unknown names fail here, at sign time.
    fn sign(&self, claims: &Claims, secret: &SecretKey, algorithm: &str) -> Result<String, SignError>;
}

/// Trait for checking a token and recovering the signed payload bytes
pub trait ClaimsVerifier: Send + Sync {
    fn verify(&self, token: &str, key: &VerifyKey, algorithms: &[Algorithm]) -> Result<Vec<u8>, SignError>;
}

/// JWS compact signer backed by HMAC-SHA2 and Ed25519.
#[derive(Debug, Clone, Copy, Default)]
pub struct JwsSigner;

impl ClaimsSigner for JwsSigner {
    fn sign(&self, claims: &Claims, secret: &SecretKey, algorithm: &str) -> Result<String, SignError> {
        let alg: Algorithm = algorithm.parse()?;
        let token = jws::encode(claims, secret, alg)?;
        if !token.is_ascii() {
            return Err(SignError::NonAsciiToken);
        }
        Ok(token)
    }
}

impl ClaimsVerifier for JwsSigner {
    fn verify(&self, token: &str, key: &VerifyKey, algorithms: &[Algorithm]) -> Result<Vec<u8>, SignError> {
        jws::decode(token, key, algorithms)
    }
}

/// Verify `token` and parse its payload as a JSON object.
pub fn verify_json(
    verifier: &dyn ClaimsVerifier,
    token: &str,
    key: &VerifyKey,
    algorithms: &[Algorithm],
) -> Result<Claims, SignError> {
    let payload = verifier.verify(token, key, algorithms)?;
    match serde_json::from_slice::<Value>(&payload) {
        Ok(Value::Object(claims)) => Ok(claims),
        Ok(_) => Err(SignError::Malformed("payload is not a JSON object".into())),
        Err(e) => Err(SignError::Malformed(format!("payload: {e}"))),
    }
}
