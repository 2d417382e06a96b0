//! Transport module
//!
//! - `SigningTransport`: signs call claims as a JWS and POSTs them
//!   (`Content-Type: application/jose`), then classifies the JSON reply
//! - `HttpClient`: the HTTP capability it runs over, with a `reqwest`
//!   implementation and an in-memory fixture for tests
//!
//! To integrate: build an `Endpoint`, pick an `HttpClient` and hand both to
//! `SigningTransport::new()`.

pub mod claims;
#[cfg(feature = "fixtures")]
pub mod fixture;
pub mod client;
pub mod reqwest_client;
pub mod signing;

pub use claims::{canonical_claims, METHOD_KEY};
#[cfg(feature = "fixtures")]
pub use fixture::FixtureClient;
pub use client::{HttpClient, HttpError, HttpRequest, HttpResponse};
pub use reqwest_client::ReqwestHttpClient;
pub use signing::{
    classify, AnnotationValue, Annotations, CallOutcome, Endpoint, ParameterAnnotations,
    SigningTransport, Transport, ACCEPT_JSON, CONTENT_TYPE_JOSE,
};
