use std::sync::Arc;

use axum::response::{IntoResponse, Response};
use axum::Json;
use http::header::CONTENT_TYPE;
use http::{HeaderMap, StatusCode};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::warn;

use crate::crypto::{verify_json, Algorithm, Claims, ClaimsVerifier, JwsSigner, SignError, VerifyKey};
use crate::transport::{CONTENT_TYPE_JOSE, METHOD_KEY};

/// Verifies `application/jose` request bodies against a shared secret or an
/// Ed25519 public key.
#[derive(Clone)]
pub struct ReceiverAuth {
    key: VerifyKey,
    algorithms: Vec<Algorithm>,
    verifier: Arc<dyn ClaimsVerifier>,
}

impl ReceiverAuth {
    pub fn new(key: impl Into<VerifyKey>, algorithms: Vec<Algorithm>) -> Self {
        Self { key: key.into(), algorithms, verifier: Arc::new(JwsSigner) }
    }

    /// Check media type and signature, then split off `_method`.
    pub fn verify_request(&self, headers: &HeaderMap, body: &[u8]) -> Result<VerifiedCall, Rejection> {
        let content_type = headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");
        let media_type = content_type.split(';').next().unwrap_or("").trim();
        if !media_type.eq_ignore_ascii_case(CONTENT_TYPE_JOSE) {
            warn!(content_type, "rejecting request with wrong media type");
            return Err(Rejection::UnsupportedMediaType(content_type.to_string()));
        }

        let token = std::str::from_utf8(body)
            .map_err(|_| Rejection::InvalidToken(SignError::Malformed("body is not text".into())))?
            .trim();
        let claims = verify_json(self.verifier.as_ref(), token, &self.key, &self.algorithms)
            .map_err(|e| {
                warn!(error = %e, "rejecting request with invalid token");
                Rejection::InvalidToken(e)
            })?;

        VerifiedCall::from_claims(claims)
    }
}

/// A request whose signature checked out.
#[derive(Debug, Clone, PartialEq)]
pub struct VerifiedCall {
    pub method: String,
    /// Claims without `_method`.
    pub params: Claims,
    /// Claims exactly as signed.
    pub claims: Claims,
}

impl VerifiedCall {
    pub fn from_claims(claims: Claims) -> Result<Self, Rejection> {
        let method = match claims.get(METHOD_KEY) {
            Some(Value::String(m)) => m.clone(),
            Some(_) => return Err(Rejection::BadClaims(format!("{METHOD_KEY} must be a string"))),
            None => return Err(Rejection::BadClaims(format!("missing {METHOD_KEY} claim"))),
        };
        let mut params = claims.clone();
        params.remove(METHOD_KEY);
        Ok(Self { method, params, claims })
    }
}

#[derive(Debug, Error)]
pub enum Rejection {
    #[error("expected application/jose, got {0:?}")]
    UnsupportedMediaType(String),

    #[error("invalid token: {0}")]
    InvalidToken(SignError),

    #[error("bad claims: {0}")]
    BadClaims(String),
}

impl Rejection {
    pub fn status(&self) -> StatusCode {
        match self {
            Rejection::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Rejection::InvalidToken(_) => StatusCode::UNAUTHORIZED,
            Rejection::BadClaims(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Rejection::UnsupportedMediaType(_) => "unsupported_media_type",
            Rejection::InvalidToken(_) => "invalid_token",
            Rejection::BadClaims(_) => "bad_claims",
        }
    }
}

impl IntoResponse for Rejection {
    fn into_response(self) -> Response {
        let body = json!({"error": self.kind(), "message": self.to_string()});
        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{ClaimsSigner, SecretKey};
    use http::HeaderValue;

    fn jose_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/jose"));
        headers
    }

    fn token(claims: Value, secret: &SecretKey) -> String {
        JwsSigner.sign(claims.as_object().unwrap(), secret, "HS256").unwrap()
    }

    #[test]
    fn accepts_signed_call() {
        let secret = SecretKey::from_text("s");
        let auth = ReceiverAuth::new(secret.clone(), vec![Algorithm::HS256]);
        let body = token(json!({"_method": "ping", "x": 1}), &secret);
        let call = auth.verify_request(&jose_headers(), body.as_bytes()).unwrap();
        assert_eq!(call.method, "ping");
        assert_eq!(Value::Object(call.params), json!({"x": 1}));
    }

    #[test]
    fn wrong_media_type_is_415() {
        let auth = ReceiverAuth::new(SecretKey::from_text("s"), vec![Algorithm::HS256]);
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let err = auth.verify_request(&headers, b"{}").unwrap_err();
        assert_eq!(err.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }

    #[test]
    fn wrong_secret_is_401() {
        let auth = ReceiverAuth::new(SecretKey::from_text("s"), vec![Algorithm::HS256]);
        let body = token(json!({"_method": "ping"}), &SecretKey::from_text("other"));
        let err = auth.verify_request(&jose_headers(), body.as_bytes()).unwrap_err();
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn missing_method_is_400() {
        let secret = SecretKey::from_text("s");
        let auth = ReceiverAuth::new(secret.clone(), vec![Algorithm::HS256]);
        let body = token(json!({"x": 1}), &secret);
        let err = auth.verify_request(&jose_headers(), body.as_bytes()).unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn eddsa_receiver_holds_only_the_public_key() {
        let seed = SecretKey::from_bytes([4u8; 32]);
        let public = VerifyKey::parse(&seed.verify_key(Algorithm::EdDSA).unwrap().to_encoded()).unwrap();
        let auth = ReceiverAuth::new(public, vec![Algorithm::EdDSA]);
        let body = JwsSigner.sign(json!({"_method": "ping"}).as_object().unwrap(), &seed, "EdDSA").unwrap();
        assert_eq!(auth.verify_request(&jose_headers(), body.as_bytes()).unwrap().method, "ping");
    }

    #[test]
    fn critical_header_is_401() {
        let auth = ReceiverAuth::new(SecretKey::from_text("s"), vec![Algorithm::HS256]);
        // header {"alg":"HS256","crit":["exp"]}; crit is checked before the signature
        let body = "eyJhbGciOiJIUzI1NiIsImNyaXQiOlsiZXhwIl19.e30.AAAA";
        let err = auth.verify_request(&jose_headers(), body.as_bytes()).unwrap_err();
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
        assert!(matches!(err, Rejection::InvalidToken(SignError::Malformed(_))));
    }
}
