use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;

use crate::crypto::{Algorithm, SecretKey};
use crate::transport::{Endpoint, ReqwestHttpClient};

pub const DEFAULT_ALGORITHM: &str = "HS256";

/// Endpoint settings, read from a TOML file and/or command-line flags.
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct EndpointConfig {
    pub url: Option<String>,
    pub secret: Option<SecretKey>,
    pub algorithm: Option<String>,
    /// Applied to the HTTP client, not to the transport.
    pub timeout_secs: Option<u64>,
}

impl EndpointConfig {
    /// Load endpoint config from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let cfg: EndpointConfig = toml::from_str(&data)
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(cfg)
    }

    /// Fields set in `overrides` win.
    pub fn merge(self, overrides: EndpointConfig) -> Self {
        Self {
            url: overrides.url.or(self.url),
            secret: overrides.secret.or(self.secret),
            algorithm: overrides.algorithm.or(self.algorithm),
            timeout_secs: overrides.timeout_secs.or(self.timeout_secs),
        }
    }

    pub fn endpoint(&self) -> Result<Endpoint> {
        let url = self.url.clone().ok_or_else(|| anyhow!("no endpoint url configured"))?;
        let secret = self.secret.clone().ok_or_else(|| anyhow!("no secret configured"))?;
        let algorithm = self.algorithm.clone().unwrap_or_else(|| DEFAULT_ALGORITHM.to_string());
        Ok(Endpoint::new(url, secret, algorithm))
    }

    pub fn http_client(&self) -> Result<ReqwestHttpClient> {
        match self.timeout_secs {
            Some(secs) => Ok(ReqwestHttpClient::with_timeout(Duration::from_secs(secs))?),
            None => Ok(ReqwestHttpClient::new()),
        }
    }
}

/// Parse a CSV list of JOSE algorithm names
pub fn parse_algorithms_csv(s: &str) -> Result<Vec<Algorithm>> {
    let algs = s
        .split(',')
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .map(|a| a.parse::<Algorithm>())
        .collect::<Result<Vec<_>, _>>()?;
    if algs.is_empty() {
        return Err(anyhow!("at least one algorithm is required"));
    }
    Ok(algs)
}
