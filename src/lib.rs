//! Signing RPC transport over HTTP.
//!
//! A call's method name and arguments become JWS claims (`_method` plus the
//! arguments), the compact token is POSTed as `application/jose`, and the
//! JSON reply comes back as a [`CallOutcome`]: `success` is true for 2xx/3xx
//! statuses, and the decoded body is returned either way.
//!
//! - [`transport`]: `SigningTransport` and the `HttpClient` seam
//! - [`crypto`]: JWS signing / verification (HMAC-SHA2, Ed25519)
//! - [`rpc`]: the verifying receiver side of the same wire contract
//! - [`cli`]: the `jose-rpc` binary and its TOML config

pub mod cli;
pub mod crypto;
pub mod rpc;
pub mod transport;
pub mod utils;

pub use crypto::{Algorithm, Claims, SecretKey, VerifyKey};
pub use transport::{CallOutcome, Endpoint, HttpClient, SigningTransport, Transport};
pub use utils::{Result, TransportError};
