//! Configuration loading from files and environment variables

use crate::error::{Error, Result};
use config::{
    Config as ConfigLib, ConfigBuilder as LibConfigBuilder, Environment, File, FileFormat,
};
use std::path::Path;
use tracing::debug;

use super::defaults::*;
use super::{global_config_path, Config};

/// Helper to set a config default with consistent error mapping
fn set_config_default<T: Into<config::Value>>(
    builder: LibConfigBuilder<config::builder::DefaultState>,
    key: &str,
    value: T,
) -> Result<LibConfigBuilder<config::builder::DefaultState>> {
    builder
        .set_default(key, value)
        .map_err(|e| Error::config(format!("Failed to set {key} default: {e}")))
}

impl Config {
    /// Loads configuration from a TOML file with environment variable overrides
    ///
    /// Environment variables are prefixed with `VECADMIN_` and use double underscores
    /// for nested values. For example:
    /// - `VECADMIN_CONNECTION__TIMEOUT_MS=5000`
    ///
    /// `VECADMIN_HOST` and `VECADMIN_PORT` are accepted as shortcuts for the
    /// connection endpoint.
    pub fn from_file(path: &Path) -> Result<Self> {
        let builder = ConfigLib::builder();

        // config crate doesn't apply serde defaults for missing sections
        let builder = set_config_default(builder, "connection.provider", default_provider())?;
        let builder = set_config_default(builder, "connection.host", default_host())?;
        let builder = set_config_default(builder, "connection.port", default_port() as i64)?;
        let builder = set_config_default(
            builder,
            "connection.timeout_ms",
            default_timeout_ms() as i64,
        )?;
        let builder = set_config_default(
            builder,
            "connection.connect_timeout_ms",
            default_connect_timeout_ms() as i64,
        )?;
        let builder = set_config_default(
            builder,
            "connection.verify_on_connect",
            default_verify_on_connect(),
        )?;
        let builder = set_config_default(
            builder,
            "limits.min_segment_row_limit",
            default_min_segment_row_limit() as i64,
        )?;
        let builder = set_config_default(
            builder,
            "limits.max_segment_row_limit",
            default_max_segment_row_limit() as i64,
        )?;
        let builder = set_config_default(
            builder,
            "limits.default_segment_row_limit",
            default_segment_row_limit() as i64,
        )?;
        let mut builder = set_config_default(
            builder,
            "limits.max_dimension",
            default_max_dimension() as i64,
        )?;

        // Add the config file if it exists; an unreadable file is an I/O error
        if path.exists() {
            debug!("Loading configuration from {}", path.display());
            let content = std::fs::read_to_string(path)?;
            builder = builder.add_source(File::from_str(&content, FileFormat::Toml));
        }

        // Add environment variables with VECADMIN_ prefix
        builder = builder.add_source(
            Environment::with_prefix("VECADMIN")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        if let Ok(host) = std::env::var("VECADMIN_HOST") {
            builder = builder
                .set_override("connection.host", host)
                .map_err(|e| Error::config(format!("Failed to set VECADMIN_HOST: {e}")))?;
        }
        if let Ok(port) = std::env::var("VECADMIN_PORT") {
            if let Ok(port_num) = port.parse::<u16>() {
                builder = builder
                    .set_override("connection.port", port_num)
                    .map_err(|e| Error::config(format!("Failed to set VECADMIN_PORT: {e}")))?;
            }
        }

        let config = builder
            .build()
            .map_err(|e| Error::config(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| Error::config(format!("Failed to deserialize config: {e}")))
    }

    /// Creates a config from a TOML string (useful for testing)
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::config(format!("Failed to parse TOML: {e}")))
    }

    /// Load configuration from a single file
    ///
    /// Precedence (lowest to highest):
    /// 1. Hardcoded defaults
    /// 2. Config file (~/.vecadmin/config.toml or custom --config path)
    /// 3. Environment variables (VECADMIN_*)
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let path = match config_path {
            Some(p) => p.to_path_buf(),
            None => global_config_path()?,
        };
        Self::from_file(&path)
    }
}
