//! Configuration module for vecadmin
//!
//! Configuration can be loaded from TOML files and/or environment variables.

mod defaults;
mod loading;


use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use defaults::*;

/// Providers accepted in `connection.provider`
pub const VALID_PROVIDERS: [&str; 2] = ["grpc", "memory"];

/// Returns the path to the global configuration file
///
/// The global config is stored at `~/.vecadmin/config.toml`.
pub fn global_config_path() -> Result<PathBuf> {
    let home_dir = dirs::home_dir()
        .ok_or_else(|| Error::config("Unable to determine home directory".to_string()))?;
    Ok(home_dir.join(".vecadmin").join("config.toml"))
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Connection to the collection service
    #[serde(default)]
    pub connection: ConnectionConfig,

    /// Client-side pre-validation limits
    #[serde(default)]
    pub limits: CollectionLimits,
}

/// Connection configuration
///
/// # Providers
/// - `grpc` (default): remote service over a tonic channel
/// - `memory`: in-process reference service, useful for tests and dry runs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
    #[serde(default = "default_provider")]
    pub provider: String,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Deadline applied to every RPC
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,

    /// Probe the service version when the client is constructed
    #[serde(default = "default_verify_on_connect")]
    pub verify_on_connect: bool,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            host: default_host(),
            port: default_port(),
            timeout_ms: default_timeout_ms(),
            connect_timeout_ms: default_connect_timeout_ms(),
            verify_on_connect: default_verify_on_connect(),
        }
    }
}

impl ConnectionConfig {
    /// Endpoint URL for the gRPC channel
    pub fn endpoint_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

/// Bounds the service enforces on collection parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionLimits {
    #[serde(default = "default_min_segment_row_limit")]
    pub min_segment_row_limit: u64,

    #[serde(default = "default_max_segment_row_limit")]
    pub max_segment_row_limit: u64,

    /// Sent when a spec leaves `segment_row_limit` unset
    #[serde(default = "default_segment_row_limit")]
    pub default_segment_row_limit: u64,

    #[serde(default = "default_max_dimension")]
    pub max_dimension: u32,
}

impl Default for CollectionLimits {
    fn default() -> Self {
        Self {
            min_segment_row_limit: default_min_segment_row_limit(),
            max_segment_row_limit: default_max_segment_row_limit(),
            default_segment_row_limit: default_segment_row_limit(),
            max_dimension: default_max_dimension(),
        }
    }
}

impl Config {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        let connection = &self.connection;
        if !VALID_PROVIDERS.contains(&connection.provider.as_str()) {
            return Err(Error::config(format!(
                "Invalid provider '{}'. Must be one of: {:?}",
                connection.provider, VALID_PROVIDERS
            )));
        }

        if connection.host.trim().is_empty() {
            return Err(Error::config("connection.host must not be empty"));
        }

        if connection.port == 0 {
            return Err(Error::config("Invalid port 0"));
        }

        if connection.timeout_ms == 0 {
            return Err(Error::config(
                "connection.timeout_ms must be greater than 0".to_string(),
            ));
        }

        if connection.connect_timeout_ms == 0 {
            return Err(Error::config(
                "connection.connect_timeout_ms must be greater than 0".to_string(),
            ));
        }

        let limits = &self.limits;
        if limits.min_segment_row_limit == 0 {
            return Err(Error::config(
                "limits.min_segment_row_limit must be greater than 0".to_string(),
            ));
        }

        if limits.min_segment_row_limit > limits.max_segment_row_limit {
            return Err(Error::config(format!(
                "limits.min_segment_row_limit ({}) exceeds limits.max_segment_row_limit ({})",
                limits.min_segment_row_limit, limits.max_segment_row_limit
            )));
        }

        if !(limits.min_segment_row_limit..=limits.max_segment_row_limit)
            .contains(&limits.default_segment_row_limit)
        {
            return Err(Error::config(format!(
                "limits.default_segment_row_limit ({}) must lie within [{}, {}]",
                limits.default_segment_row_limit,
                limits.min_segment_row_limit,
                limits.max_segment_row_limit
            )));
        }

        if limits.max_dimension == 0 || limits.max_dimension > crate::schema::MAX_DIMENSION {
            return Err(Error::config(format!(
                "limits.max_dimension must be within 1..={}",
                crate::schema::MAX_DIMENSION
            )));
        }

        Ok(())
    }
}
