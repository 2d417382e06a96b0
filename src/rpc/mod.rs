//! RPC module: the receiving side of the signed wire contract.
//!
//! - `POST /` takes an `application/jose` body, verifies it, and dispatches
//!   on its `_method` claim
//! - `GET /health` for liveness
//!
//! To integrate: register `MethodHandler`s on a `Dispatcher` and pass it with
//! a `ReceiverAuth` to `RpcServer::new()`.

pub mod auth;
pub mod handlers;
pub mod server;

pub use auth::{ReceiverAuth, Rejection, VerifiedCall};
pub use handlers::{Dispatcher, EchoHandler, FnHandler, MethodError, MethodHandler};
pub use server::RpcServer;
