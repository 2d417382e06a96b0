use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use http::header::{ACCEPT, CONTENT_TYPE};
use http::{HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, trace};

use crate::crypto::{Claims, ClaimsSigner, JwsSigner, SecretKey};
use crate::transport::claims::canonical_claims;
use crate::transport::client::{HttpClient, HttpRequest, HttpResponse};
use crate::transport::reqwest_client::ReqwestHttpClient;
use crate::utils::{Result, TransportError};

pub const ACCEPT_JSON: &str = "application/json";
pub const CONTENT_TYPE_JOSE: &str = "application/jose";

/// Where and how calls are signed and sent. Fixed for the transport's life.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub url: String,
    pub secret: SecretKey,
    /// JOSE algorithm name, checked by the signer on every call.
    pub algorithm: String,
}

impl Endpoint {
    pub fn new(url: impl Into<String>, secret: SecretKey, algorithm: impl Into<String>) -> Self {
        Self { url: url.into(), secret, algorithm: algorithm.into() }
    }
}

/// Annotation value attached to a service, method or parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnnotationValue {
    Integer(i64),
    Text(String),
    Null,
}

pub type Annotations = BTreeMap<String, AnnotationValue>;
/// Per-parameter annotations, keyed by parameter name.
pub type ParameterAnnotations = BTreeMap<String, Annotations>;

/// Result of one call: whether the status was 2xx/3xx, and the decoded body.
#[derive(Debug, Clone, PartialEq)]
pub struct CallOutcome {
    pub success: bool,
    pub content: Value,
}

impl CallOutcome {
    pub fn into_parts(self) -> (bool, Value) {
        (self.success, self.content)
    }
}

/// The RPC framework's view of a transport: a method name and arguments in,
/// an outcome and a decoded value out.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn call(
        &self,
        method_name: &str,
        payload: &Claims,
        service_annotations: &Annotations,
        method_annotations: &Annotations,
        parameter_annotations: &ParameterAnnotations,
    ) -> Result<CallOutcome>;
}

/// Signs each call's claims as a JWS and POSTs it to a fixed endpoint.
pub struct SigningTransport {
    endpoint: Endpoint,
    signer: Arc<dyn ClaimsSigner>,
    client: Arc<dyn HttpClient>,
}

impl SigningTransport {
    pub fn new(endpoint: Endpoint, client: Arc<dyn HttpClient>) -> Self {
        Self { endpoint, signer: Arc::new(JwsSigner), client }
    }

    /// Use a freshly built [`ReqwestHttpClient`].
    pub fn with_default_client(endpoint: Endpoint) -> Self {
        Self::new(endpoint, Arc::new(ReqwestHttpClient::new()))
    }

    /// Replace the signer (defaults to [`JwsSigner`]).
    pub fn with_signer(mut self, signer: Arc<dyn ClaimsSigner>) -> Self {
        self.signer = signer;
        self
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    fn build_request(&self, token: String) -> HttpRequest {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_JSON));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(CONTENT_TYPE_JOSE));
        HttpRequest::post(self.endpoint.url.clone(), headers, token.into_bytes())
    }
}

impl std::fmt::Debug for SigningTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningTransport")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Transport for SigningTransport {
    async fn call(
        &self,
        method_name: &str,
        payload: &Claims,
        service_annotations: &Annotations,
        method_annotations: &Annotations,
        parameter_annotations: &ParameterAnnotations,
    ) -> Result<CallOutcome> {
        let claims = canonical_claims(method_name, payload);
        let token = self
            .signer
            .sign(&claims, &self.endpoint.secret, &self.endpoint.algorithm)?;
        let request = self.build_request(token);

        trace!(
            method = method_name,
            service = ?service_annotations,
            annotations = ?method_annotations,
            parameters = ?parameter_annotations,
            "call annotations"
        );
        debug!(
            "An HTTP request for {}():\n{} {}\n{:?}\n\n{}",
            method_name,
            request.method,
            request.url,
            request.headers,
            String::from_utf8_lossy(&request.body)
        );

        let response = self.client.round_trip(request).await?;
        classify(response)
    }
}

/// Decode a response body and map its status to success.
///
/// Success is `200 <= status < 400`. A body that is not JSON is an
/// [`TransportError::UnexpectedResponse`] regardless of status.
pub fn classify(response: HttpResponse) -> Result<CallOutcome> {
    let HttpResponse { status, body, .. } = response;
    let content: Value = match serde_json::from_slice(&body) {
        Ok(v) => v,
        Err(_) => return Err(TransportError::UnexpectedResponse { status, raw: body }),
    };
    let code = status.as_u16();
    Ok(CallOutcome { success: (200..400).contains(&code), content })
}
