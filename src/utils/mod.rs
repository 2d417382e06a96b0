//! Utility module: errors, logging, and serde helpers.

pub mod errors;
pub mod logging;
pub mod serde_helpers;

pub use errors::{Result, TransportError};
pub use logging::{init_logging, init_test_logging};
