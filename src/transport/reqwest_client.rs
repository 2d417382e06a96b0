//! [`reqwest`]-backed implementation of [`HttpClient`].

use std::time::Duration;

use async_trait::async_trait;

use super::client::{HttpClient, HttpError, HttpRequest, HttpResponse};

/// Default HTTP client. `reqwest::Client` pools connections internally and
/// is cheap to clone.
#[derive(Debug, Clone)]
pub struct ReqwestHttpClient {
    inner: reqwest::Client,
}

impl ReqwestHttpClient {
    /// Create a new reqwest-backed HTTP client with default settings.
    pub fn new() -> Self {
        Self { inner: reqwest::Client::new() }
    }

    /// Create a client whose requests give up after `timeout`.
    pub fn with_timeout(timeout: Duration) -> Result<Self, HttpError> {
        let inner = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| HttpError::Request(Box::new(e)))?;
        Ok(Self { inner })
    }
}

impl Default for ReqwestHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

fn classify(e: reqwest::Error) -> HttpError {
    if e.is_timeout() {
        HttpError::Timeout(Box::new(e))
    } else if e.is_connect() {
        HttpError::Connect(Box::new(e))
    } else {
        HttpError::Request(Box::new(e))
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        let resp = self
            .inner
            .request(request.method, &request.url)
            .headers(request.headers)
            .body(request.body)
            .send()
            .await
            .map_err(classify)?;

        let status = resp.status();
        let headers = resp.headers().clone();
        let body = resp.bytes().await.map_err(classify)?;

        Ok(HttpResponse { status, headers, body })
    }
}
