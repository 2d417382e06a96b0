//! Crypto module: JWS signing and verification of call claims.
//!
//! - Keys: signing secrets, receiver-side verify keys, textual encodings
//! - Algorithm: the JOSE algorithm identifiers we can sign with
//! - Jws: RFC 7515 compact serialization
//! - Sign: the `ClaimsSigner` / `ClaimsVerifier` seams used by the transport

pub mod algorithm;
pub mod error;
pub mod jws;
pub mod keys;
pub mod sign;

pub use algorithm::Algorithm;
pub use error::SignError;
pub use keys::{SecretKey, VerifyKey};
pub use sign::{verify_json, Claims, ClaimsSigner, ClaimsVerifier, JwsSigner};
