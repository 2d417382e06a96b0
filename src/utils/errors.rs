use bytes::Bytes;
use http::StatusCode;
use thiserror::Error;

use crate::crypto::SignError;
use crate::transport::HttpError;

/// Errors a signed call can fail with.
///
/// A decoded response with a non-2xx/3xx status is not an error at this
/// layer; it comes back as a `CallOutcome` with `success == false`.
#[derive(Error, Debug)]
pub enum TransportError {
    /// Claims could not be signed; nothing was sent.
    #[error("signing failed: {0}")]
    Signing(#[from] SignError),

    /// No response could be obtained from the endpoint.
    #[error("HTTP transport failed: {0}")]
    Http(#[from] HttpError),

    /// The endpoint answered with a body that is not JSON.
    #[error("unexpected response (HTTP {status}): {}", String::from_utf8_lossy(.raw))]
    UnexpectedResponse { status: StatusCode, raw: Bytes },
}

impl TransportError {
    /// Raw body of an unexpected response, exactly as received.
    pub fn raw_body(&self) -> Option<&[u8]> {
        match self {
            TransportError::UnexpectedResponse { raw, .. } => Some(raw),
            _ => None,
        }
    }
}

/// Convenience alias
pub type Result<T> = std::result::Result<T, TransportError>;
