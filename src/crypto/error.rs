use thiserror::Error;

/// Failures while producing or checking a signed token.
#[derive(Debug, Error)]
pub enum SignError {
    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("invalid key material: {0}")]
    InvalidKey(String),

    #[error("malformed token: {0}")]
    Malformed(String),

    #[error("algorithm {0} is not allowed")]
    AlgorithmNotAllowed(String),

    #[error("signature verification failed")]
    BadSignature,

    #[error("claims serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("signed token is not ASCII")]
    NonAsciiToken,
}
