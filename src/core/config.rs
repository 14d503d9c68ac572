//! Configuration module for checkstream
//!
//! Handles application configuration including:
//! - HTTP bind address and service name
//! - The directory being served
//! - Streaming and hashing buffer sizes
//! - Logging
//!
//! Values are layered with the `config` crate: an optional TOML file first,
//! then `CHECKSTREAM_`-prefixed environment variables (`__` separates nested
//! keys, e.g. `CHECKSTREAM_SERVER__PORT=9000`).

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::error::{FileError, Result};
use crate::logging::LoggingConfig;

/// Environment variable prefix for configuration overrides
pub const ENV_PREFIX: &str = "CHECKSTREAM";

/// Default location of the configuration file
pub const DEFAULT_CONFIG_PATH: &str = "config/checkstream.toml";

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP server settings
    pub server: ServerConfig,

    /// Served directory settings
    pub catalog: CatalogConfig,

    /// Buffer sizes for hashing and streaming
    pub streaming: StreamingConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Service name reported on `/`
    pub name: String,
}

/// Served directory configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Directory whose regular files are exposed
    pub serve_directory: PathBuf,

    /// Reuse identity tokens while a file's (mtime, size) is unchanged
    pub identity_cache: bool,
}

/// Buffer sizes used while reading files
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamingConfig {
    /// Bytes read per chunk when emitting a response body
    pub chunk_size: usize,

    /// Bytes read per pass when computing an identity token
    pub hash_buffer_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3030,
            name: "checkstream".to_string(),
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            serve_directory: PathBuf::from("SERVE_FILES"),
            identity_cache: false,
        }
    }
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 64 * 1024,
            hash_buffer_size: 1024 * 1024,
        }
    }
}

impl ServerConfig {
    /// `host:port` string suitable for binding
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl AppConfig {
    /// Load configuration from an optional file plus environment overrides.
    ///
    /// A missing file is not an error; defaults and environment variables
    /// still apply.
    pub fn load(path: &Path) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: AppConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the server cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.streaming.chunk_size == 0 {
            return Err(FileError::Config(
                "streaming.chunk_size must be greater than zero".to_string(),
            ));
        }
        if self.streaming.hash_buffer_size == 0 {
            return Err(FileError::Config(
                "streaming.hash_buffer_size must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
