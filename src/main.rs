//! checkstreamd - serves a directory over the checksum-gated HTTP API.
//!
//! Usage: `checkstreamd [config.toml]`. The config path falls back to
//! `$CHECKSTREAM_CONFIG`, then `config/checkstream.toml`.

use std::path::PathBuf;

use anyhow::Context;
use checkstream::core::config::DEFAULT_CONFIG_PATH;
use checkstream::logging::LoggingSystem;
use checkstream::{AppConfig, FileServer};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("CHECKSTREAM_CONFIG").ok())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

    let config = AppConfig::load(&config_path)
        .with_context(|| format!("failed to load configuration from {:?}", config_path))?;

    // Held for the life of the process so the file writer keeps flushing
    let logging_system = match LoggingSystem::init(config.logging.clone()) {
        Ok(system) => Some(system),
        Err(e) => {
            eprintln!("Failed to initialize logging system: {}. Using basic logging.", e);
            LoggingSystem::init_fallback();
            None
        }
    };

    if let Some(system) = &logging_system {
        tracing::debug!(
            level = %system.log_level(),
            log_directory = ?system.log_directory(),
            "logging initialized"
        );
    }

    tracing::info!(
        config = %config_path.display(),
        serve_directory = %config.catalog.serve_directory.display(),
        identity_cache = config.catalog.identity_cache,
        "Starting {} v{}",
        config.server.name,
        env!("CARGO_PKG_VERSION")
    );

    let server = FileServer::new(&config);
    server
        .start(shutdown_signal())
        .await
        .context("file server terminated with an error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
