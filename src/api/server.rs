//! File server implementation
//!
//! Binds the configured address and serves:
//! - `GET /` service name and version
//! - `GET /health`
//! - `GET /api/stats/files/:identifier`
//! - `GET /api/get/file/:checksum/:filename` (with or without trailing slash)

use std::future::Future;
use std::sync::Arc;

use axum::{routing::get, Router};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use super::error::ServeError;
use super::routes::{get_file, get_file_stats, health, index};
use crate::catalog::fetch_api_path;
use crate::core::config::{AppConfig, ServerConfig};
use crate::service::FileService;

/// Shared state for the HTTP handlers
#[derive(Clone)]
pub struct ServerState {
    /// Request orchestrator
    pub service: Arc<FileService>,
    /// Service name reported on `/`
    pub name: Arc<str>,
}

impl ServerState {
    /// Create handler state around `service`
    pub fn new(service: FileService, name: impl Into<Arc<str>>) -> Self {
        Self {
            service: Arc::new(service),
            name: name.into(),
        }
    }
}

/// Checksum-gated file server
pub struct FileServer {
    state: ServerState,
    config: ServerConfig,
}

impl FileServer {
    /// Create a server from application configuration
    pub fn new(config: &AppConfig) -> Self {
        let service = FileService::from_config(config);
        Self {
            state: ServerState::new(service, config.server.name.as_str()),
            config: config.server.clone(),
        }
    }

    /// Server settings
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Get a reference to the server state
    pub fn state(&self) -> &ServerState {
        &self.state
    }

    /// Build the router with all routes and middleware
    pub fn build_router(&self) -> Router {
        build_router(self.state.clone())
    }

    /// Bind the configured address and serve until `shutdown` resolves
    pub async fn start<F>(&self, shutdown: F) -> Result<(), ServeError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = self.config.bind_address();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| ServeError::BindFailed {
                reason: format!("{}: {}", addr, e),
            })?;
        self.serve(listener, shutdown).await
    }

    /// Serve on an already bound listener until `shutdown` resolves
    pub async fn serve<F>(&self, listener: TcpListener, shutdown: F) -> Result<(), ServeError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let local_addr = listener
            .local_addr()
            .map_err(|e| ServeError::Internal {
                reason: e.to_string(),
            })?;

        tracing::info!(
            address = %local_addr,
            serve_directory = %self.state.service.catalog().serve_directory().display(),
            "file server listening"
        );

        axum::serve(listener, self.build_router())
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| ServeError::Internal {
                reason: e.to_string(),
            })?;

        tracing::info!("file server stopped");
        Ok(())
    }

    /// Get the stats URL for an identifier
    pub fn stats_url(&self, identifier: &str) -> String {
        format!(
            "http://{}/api/stats/files/{}",
            self.config.bind_address(),
            identifier
        )
    }

    /// Get the fetch URL for a file with a known checksum
    pub fn file_url(&self, checksum: &str, file_name: &str) -> String {
        format!(
            "http://{}{}",
            self.config.bind_address(),
            fetch_api_path(checksum, file_name)
        )
    }
}

/// Router over `state`
pub fn build_router(state: ServerState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/api/stats/files/:identifier", get(get_file_stats))
        .route("/api/get/file/:checksum/:filename", get(get_file))
        .route("/api/get/file/:checksum/:filename/", get(get_file))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
