use anyhow::Context;
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::Path;

/// Server configuration, read from an optional TOML file with environment
/// overrides (`REWIND_HOST`, `REWIND_PORT`, `REWIND_CORS_ORIGIN`).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Origin allowed by CORS; unset means permissive (development default)
    pub cors_origin: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            cors_origin: None,
        }
    }
}

impl Config {
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut config = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path)
                    .with_context(|| format!("reading config file {}", path.display()))?;
                toml::from_str(&raw)
                    .with_context(|| format!("parsing config file {}", path.display()))?
            }
            None => Config::default(),
        };

        if let Ok(host) = std::env::var("REWIND_HOST") {
            config.host = host;
        }
        if let Ok(port) = std::env::var("REWIND_PORT") {
            config.port = port.parse().context("REWIND_PORT is not a port number")?;
        }
        if let Ok(origin) = std::env::var("REWIND_CORS_ORIGIN") {
            config.cors_origin = Some(origin);
        }

        Ok(config)
    }

    pub fn bind_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid bind address {}:{}", self.host, self.port))
    }
}
