//! Configuration for the record validation service
//!
//! TOML file with `[server]` and `[tracker]` sections. Every field has a
//! default, so an absent file or an empty document yields a runnable
//! configuration.

use crate::tracker::TrackerStrategy;
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::path::Path;
use thiserror::Error;

/// Top-level service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ServiceConfig {
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub tracker: TrackerSection,
}

/// HTTP listener settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerSection {
    /// Address to bind, must parse as an IP address
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    /// TCP port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
        }
    }
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Change-tracker settings
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TrackerSection {
    /// Fingerprint strategy: "raw" or "digest"
    #[serde(default)]
    pub strategy: TrackerStrategy,
}

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("Invalid bind address: {0}")]
    InvalidBindAddress(String),
}

impl ServiceConfig {
    /// Load configuration from a TOML file and validate it.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: ServiceConfig = toml::from_str(&content)?;

        config.validate()?;

        Ok(config)
    }

    /// Validate field values that serde cannot check on its own.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.bind_ip()?;
        Ok(())
    }

    /// Parsed bind address.
    pub fn bind_ip(&self) -> Result<IpAddr, ConfigError> {
        self.server
            .bind_address
            .parse()
            .map_err(|_| ConfigError::InvalidBindAddress(self.server.bind_address.clone()))
    }

    /// Full socket address the server listens on.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        Ok(SocketAddr::new(self.bind_ip()?, self.server.port))
    }
}
