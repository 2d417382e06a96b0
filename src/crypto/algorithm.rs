use std::fmt;
use std::str::FromStr;

use crate::crypto::SignError;

/// JOSE `alg` values this crate can sign and verify.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Algorithm {
    HS256,
    HS384,
    HS512,
    /// Ed25519; the secret is the 32-byte seed.
    EdDSA,
}

impl Algorithm {
    pub const SUPPORTED: [Algorithm; 4] = [
        Algorithm::HS256,
        Algorithm::HS384,
        Algorithm::HS512,
        Algorithm::EdDSA,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Algorithm::HS256 => "HS256",
            Algorithm::HS384 => "HS384",
            Algorithm::HS512 => "HS512",
            Algorithm::EdDSA => "EdDSA",
        }
    }

    /// HMAC algorithms share one secret between signer and verifier.
    pub fn is_symmetric(&self) -> bool {
        !matches!(self, Algorithm::EdDSA)
    }
}

impl FromStr for Algorithm {
    type Err = SignError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Algorithm::SUPPORTED
            .iter()
            .copied()
            .find(|alg| alg.as_str() == s)
            .ok_or_else(|| SignError::UnsupportedAlgorithm(s.to_string()))
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
