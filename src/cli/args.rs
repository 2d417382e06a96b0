use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;

use crate::cli::config::{parse_algorithms_csv, EndpointConfig};
use crate::crypto::keys::DEFAULT_SECRET_LEN;
use crate::crypto::{Algorithm, SecretKey, VerifyKey};
use crate::rpc::{Dispatcher, EchoHandler, ReceiverAuth, RpcServer};
use crate::transport::{Annotations, ParameterAnnotations, SigningTransport, Transport};
use crate::utils::{init_logging, TransportError};

/// Send and receive JWS-signed RPC calls over HTTP.
#[derive(Parser)]
#[clap(name = "jose-rpc", version)]
pub struct Cli {
    #[clap(subcommand)]
    pub cmd: Cmd,
}

#[derive(Subcommand)]
pub enum Cmd {
    /// Sign and send one call, print the decoded reply
    Call {
        /// method name, sent as the `_method` claim
        method: String,

        /// arguments as a JSON object
        #[clap(long, default_value = "{}")]
        payload: String,

        /// TOML file with url / secret / algorithm / timeout_secs
        #[clap(long)]
        config: Option<PathBuf>,

        #[clap(long, env = "JOSE_URL")]
        url: Option<String>,

        /// secret as text, `base64:..`, `hex:..` or `text:..`
        #[clap(long, env = "JOSE_SECRET", hide_env_values = true)]
        secret: Option<String>,

        #[clap(long, env = "JOSE_ALGORITHM")]
        algorithm: Option<String>,

        #[clap(long)]
        timeout_secs: Option<u64>,
    },
    /// Run a verifying receiver that echoes every call's claims
    Serve {
        /// bind address (host:port)
        #[clap(long, default_value = "127.0.0.1:8080")]
        bind: SocketAddr,

        /// shared secret (text, `base64:..`, `hex:..`, `text:..`) or an
        /// Ed25519 public key as `pub:<hex>`
        #[clap(long, env = "JOSE_VERIFY_KEY", hide_env_values = true)]
        key: String,

        /// comma separated algorithms to accept
        #[clap(long, default_value = "HS256,HS384,HS512")]
        algorithms: String,
    },
    /// Print a fresh random secret
    GenSecret {
        #[clap(long, default_value = "HS256")]
        algorithm: String,
    },
}

pub async fn run_cli() -> Result<ExitCode> {
    init_logging();
    let cli = Cli::parse();

    match cli.cmd {
        Cmd::Call { method, payload, config, url, secret, algorithm, timeout_secs } => {
            let base = match config {
                Some(path) => EndpointConfig::load(path)?,
                None => EndpointConfig::default(),
            };
            let overrides = EndpointConfig {
                url,
                secret: secret.as_deref().map(SecretKey::parse).transpose()?,
                algorithm,
                timeout_secs,
            };
            let cfg = base.merge(overrides);

            let payload = match serde_json::from_str::<Value>(&payload)? {
                Value::Object(map) => map,
                other => return Err(anyhow!("payload must be a JSON object, got {other}")),
            };

            let transport = SigningTransport::new(cfg.endpoint()?, Arc::new(cfg.http_client()?));
            let outcome = transport
                .call(&method, &payload, &Annotations::new(), &Annotations::new(), &ParameterAnnotations::new())
                .await;

            match outcome {
                Ok(outcome) => {
                    println!("{}", serde_json::to_string_pretty(&outcome.content)?);
                    Ok(if outcome.success { ExitCode::SUCCESS } else { ExitCode::FAILURE })
                }
                Err(TransportError::UnexpectedResponse { status, raw }) => {
                    eprintln!("unexpected response (HTTP {status}):");
                    eprintln!("{}", String::from_utf8_lossy(&raw));
                    Ok(ExitCode::from(2))
                }
                Err(e) => Err(e.into()),
            }
        }
        Cmd::Serve { bind, key, algorithms } => {
            let auth = ReceiverAuth::new(VerifyKey::parse(&key)?, parse_algorithms_csv(&algorithms)?);
            let server = RpcServer::new(bind, auth, Dispatcher::new().fallback(EchoHandler));
            server
                .start(async {
                    let _ = tokio::signal::ctrl_c().await;
                })
                .await?;
            println!("receiver stopped");
            Ok(ExitCode::SUCCESS)
        }
        Cmd::GenSecret { algorithm } => {
            let alg: Algorithm = algorithm.parse()?;
            let secret = SecretKey::generate(DEFAULT_SECRET_LEN);
            println!("{}", secret.to_encoded());
            if !alg.is_symmetric() {
                println!("verify key: {}", secret.verify_key(alg)?.to_encoded());
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_call_arguments() {
        let cli = Cli::try_parse_from([
            "jose-rpc", "call", "ping", "--payload", "{\"x\":1}", "--url", "http://localhost/", "--secret", "s",
        ])
        .unwrap();
        match cli.cmd {
            Cmd::Call { method, payload, url, .. } => {
                assert_eq!(method, "ping");
                assert_eq!(payload, "{\"x\":1}");
                assert_eq!(url.as_deref(), Some("http://localhost/"));
            }
            _ => panic!("expected call"),
        }
    }

    #[test]
    fn serve_takes_a_public_key() {
        let cli = Cli::try_parse_from(["jose-rpc", "serve", "--key", "pub:00", "--algorithms", "EdDSA"]).unwrap();
        match cli.cmd {
            Cmd::Serve { key, algorithms, .. } => {
                assert_eq!(key, "pub:00");
                assert_eq!(algorithms, "EdDSA");
            }
            _ => panic!("expected serve"),
        }
    }
}
