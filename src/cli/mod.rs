pub mod args;
pub mod config;

pub use args::{run_cli, Cli, Cmd};
pub use config::EndpointConfig;
