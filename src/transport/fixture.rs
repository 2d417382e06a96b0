//! In-memory [`HttpClient`] for tests.
//!
//! Records every request it is given and answers through a handler. Like a
//! strict client, statuses >= 400 are surfaced as `HttpError::Status`.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::{HeaderValue, StatusCode};
use parking_lot::Mutex;
use serde_json::Value;
use tracing::warn;

use super::client::{BoxError, HttpClient, HttpError, HttpRequest, HttpResponse};

pub type FixtureHandler = Arc<dyn Fn(&HttpRequest) -> Result<HttpResponse, HttpError> + Send + Sync>;

#[derive(Default)]
struct Inner {
    handler: Mutex<Option<FixtureHandler>>,
    records: Mutex<Vec<HttpRequest>>,
}

/// Cloning shares the handler and the record log.
#[derive(Clone, Default)]
pub struct FixtureClient {
    inner: Arc<Inner>,
}

impl FixtureClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the handler answering every request.
    pub fn handler<F>(&self, handler: F)
    where
        F: Fn(&HttpRequest) -> Result<HttpResponse, HttpError> + Send + Sync + 'static,
    {
        let mut slot = self.inner.handler.lock();
        if slot.is_some() {
            warn!("the existing fixture handler is replaced by a new handler");
        }
        *slot = Some(Arc::new(handler));
    }

    /// Answer with `value` as pretty JSON and the given status.
    pub fn response_is(&self, value: Value, status: StatusCode) {
        let body = Bytes::from(serde_json::to_vec_pretty(&value).unwrap_or_default());
        self.raw_response(status, "application/json", body);
    }

    /// Answer with arbitrary bytes.
    pub fn raw_response(&self, status: StatusCode, content_type: &'static str, body: impl Into<Bytes>) {
        let body = body.into();
        self.handler(move |_| {
            let mut resp = HttpResponse::new(status, body.clone());
            resp.headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
            Ok(resp)
        });
    }

    /// Fail every request at the connection level.
    pub fn refuse_connections(&self, reason: &'static str) {
        self.handler(move |_| Err(HttpError::Connect(BoxError::from(reason))));
    }

    pub fn records(&self) -> Vec<HttpRequest> {
        self.inner.records.lock().clone()
    }

    pub fn last_request(&self) -> Option<HttpRequest> {
        self.inner.records.lock().last().cloned()
    }
}

#[async_trait]
impl HttpClient for FixtureClient {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        self.inner.records.lock().push(request.clone());

        let handler = self.inner.handler.lock().clone();
        let response = match handler {
            Some(handler) => handler(&request)?,
            None => {
                let mut resp = HttpResponse::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "No handler is configured.",
                );
                resp.headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
                resp
            }
        };

        if response.status.as_u16() >= 400 {
            return Err(HttpError::Status(response));
        }
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderMap;
    use serde_json::json;

    fn request() -> HttpRequest {
        HttpRequest::post("http://localhost/", HeaderMap::new(), "x")
    }

    #[tokio::test]
    async fn records_and_answers() {
        let client = FixtureClient::new();
        client.response_is(json!({"ok": true}), StatusCode::OK);
        let resp = client.send(request()).await.unwrap();
        assert_eq!(resp.status, StatusCode::OK);
        assert_eq!(resp.header("content-type"), Some("application/json"));
        assert_eq!(client.records().len(), 1);
    }

    #[tokio::test]
    async fn error_status_surfaces_as_error_but_round_trip_folds_it() {
        let client = FixtureClient::new();
        client.response_is(json!({"error": "nope"}), StatusCode::NOT_FOUND);
        assert!(matches!(client.send(request()).await, Err(HttpError::Status(r)) if r.status == StatusCode::NOT_FOUND));
        let resp = client.round_trip(request()).await.unwrap();
        assert_eq!(resp.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn without_handler_answers_500() {
        let client = FixtureClient::new();
        let resp = client.round_trip(request()).await.unwrap();
        assert_eq!(resp.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(&resp.body[..], b"No handler is configured.");
    }

    #[tokio::test]
    async fn refused_connection_is_not_folded() {
        let client = FixtureClient::new();
        client.refuse_connections("connection refused");
        tokio_test::assert_err!(client.round_trip(request()).await);
    }
}
