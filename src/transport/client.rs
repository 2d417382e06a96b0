//! HTTP client abstraction used by the signing transport.
//!
//! The core only needs "send this request, give me status, headers and
//! body". Connection handling, TLS, redirects and timeouts all belong to the
//! implementation behind [`HttpClient`].

use async_trait::async_trait;
use bytes::Bytes;
use http::{HeaderMap, Method, StatusCode};
use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// An outbound request.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl HttpRequest {
    pub fn post(url: impl Into<String>, headers: HeaderMap, body: impl Into<Bytes>) -> Self {
        Self { method: Method::POST, url: url.into(), headers, body: body.into() }
    }
}

/// A response, whatever its status.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl HttpResponse {
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self { status, headers: HeaderMap::new(), body: body.into() }
    }

    /// Look up a header value (case-insensitive name).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

#[derive(Debug, Error)]
pub enum HttpError {
    /// Error status surfaced as an error; still carries the full response.
    #[error("HTTP error status {}", .0.status)]
    Status(HttpResponse),

    #[error("connection failed: {0}")]
    Connect(#[source] BoxError),

    #[error("request timed out: {0}")]
    Timeout(#[source] BoxError),

    #[error("request failed: {0}")]
    Request(#[source] BoxError),
}

/// Minimal async HTTP client.
///
/// Implementations must be safe to share between concurrent calls.
#[async_trait]
pub trait HttpClient: Send + Sync + 'static {
    /// Submit one request. Implementations may report error statuses
    /// either as `Ok(response)` or as `Err(HttpError::Status(response))`.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpError>;

    /// Submit one request, folding error-as-response back into `Ok`, so
    /// callers see a single response type for every status.
    async fn round_trip(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        match self.send(request).await {
            Err(HttpError::Status(response)) => Ok(response),
            other => other,
        }
    }
}
