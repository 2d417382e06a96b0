use std::fmt;
use std::str::FromStr;

use ed25519_dalek::{SigningKey, VerifyingKey};
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::crypto::{Algorithm, SignError};
use crate::utils::serde_helpers::{as_prefixed, decode_prefixed, encode_prefixed, from_prefixed};

/// Length of generated HMAC secrets and of Ed25519 seeds.
pub const DEFAULT_SECRET_LEN: usize = 32;

/// Prefix of an Ed25519 public key in its textual form.
pub const PUBLIC_KEY_PREFIX: &str = "pub:";

/// Signing key material shared by every call made through one endpoint.
///
/// For HMAC algorithms these are the raw key bytes; for `EdDSA` they are the
/// 32-byte Ed25519 seed. `Debug` never prints the bytes.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SecretKey(
    #[serde(serialize_with = "as_prefixed", deserialize_with = "from_prefixed")] Vec<u8>,
);

impl SecretKey {
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Use a text secret as-is (its UTF-8 bytes).
    pub fn from_text(secret: &str) -> Self {
        Self(secret.as_bytes().to_vec())
    }

    /// Parse `base64:<..>`, `hex:<..>`, `text:<..>` or plain text.
    ///
    /// Plain text starting with one of those prefixes is decoded, not taken
    /// literally; write it as `text:<secret>` to keep it verbatim. Empty
    /// secrets are rejected.
    pub fn parse(s: &str) -> Result<Self, SignError> {
        let key = decode_prefixed(s).map(Self).map_err(SignError::InvalidKey)?;
        if key.is_empty() {
            return Err(SignError::InvalidKey("secret is empty".into()));
        }
        Ok(key)
    }

    /// Generate a random secret
    pub fn generate(len: usize) -> Self {
        let mut bytes = vec![0u8; len];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The `base64:` form accepted by [`SecretKey::parse`].
    pub fn to_encoded(&self) -> String {
        encode_prefixed(&self.0)
    }

    /// Interpret the secret as an Ed25519 seed.
    pub fn ed25519_signing_key(&self) -> Result<SigningKey, SignError> {
        let seed: [u8; 32] = self.0.as_slice().try_into().map_err(|_| {
            SignError::InvalidKey(format!(
                "Ed25519 seed must be 32 bytes, got {}",
                self.0.len()
            ))
        })?;
        Ok(SigningKey::from_bytes(&seed))
    }

    /// The key a receiver needs to check tokens signed with this secret.
    ///
    /// HMAC shares the secret itself; for `EdDSA` only the public half.
    pub fn verify_key(&self, alg: Algorithm) -> Result<VerifyKey, SignError> {
        if alg.is_symmetric() {
            Ok(VerifyKey::Shared(self.clone()))
        } else {
            Ok(VerifyKey::Ed25519(self.ed25519_signing_key()?.verifying_key()))
        }
    }
}

impl FromStr for SecretKey {
    type Err = SignError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretKey(<{} bytes>)", self.0.len())
    }
}

/// Key material a receiver verifies with. Never holds an Ed25519 seed.
#[derive(Clone, PartialEq, Eq)]
pub enum VerifyKey {
    /// HMAC secret, the same bytes the signer holds.
    Shared(SecretKey),
    /// Ed25519 public key.
    Ed25519(VerifyingKey),
}

impl VerifyKey {
    /// `pub:<hex>` is an Ed25519 public key; anything else is a shared
    /// secret in the forms [`SecretKey::parse`] accepts.
    pub fn parse(s: &str) -> Result<Self, SignError> {
        match s.strip_prefix(PUBLIC_KEY_PREFIX) {
            Some(rest) => {
                let bytes = hex::decode(rest.trim())
                    .map_err(|e| SignError::InvalidKey(format!("bad public key hex: {e}")))?;
                let bytes: [u8; 32] = bytes.as_slice().try_into().map_err(|_| {
                    SignError::InvalidKey(format!("Ed25519 public key must be 32 bytes, got {}", bytes.len()))
                })?;
                VerifyingKey::from_bytes(&bytes)
                    .map(VerifyKey::Ed25519)
                    .map_err(|e| SignError::InvalidKey(e.to_string()))
            }
            None => SecretKey::parse(s).map(VerifyKey::Shared),
        }
    }

    /// Textual form accepted by [`VerifyKey::parse`].
    pub fn to_encoded(&self) -> String {
        match self {
            VerifyKey::Shared(secret) => secret.to_encoded(),
            VerifyKey::Ed25519(public) => format!("{PUBLIC_KEY_PREFIX}{}", hex::encode(public.to_bytes())),
        }
    }
}

impl From<SecretKey> for VerifyKey {
    fn from(secret: SecretKey) -> Self {
        VerifyKey::Shared(secret)
    }
}

impl FromStr for VerifyKey {
    type Err = SignError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Debug for VerifyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerifyKey::Shared(secret) => write!(f, "VerifyKey::Shared({secret:?})"),
            VerifyKey::Ed25519(_) => write!(f, "VerifyKey::Ed25519({})", self.to_encoded()),
        }
    }
}
