//! Request orchestration
//!
//! The two operations the HTTP surface exposes, as one tagged request:
//!
//! - `Fetch`: resolve → stat → checksum gate → range parse → stream
//! - `Stat`: find by identifier → stat → hash
//!
//! Each step runs only after the previous one succeeded, and every failure is
//! terminal for the request.


use std::sync::Arc;

use crate::catalog::{Catalog, FileStats};
use crate::core::config::AppConfig;
use crate::core::error::Result;
use crate::gate::AccessGate;
use crate::identity::{IdentityCache, IdentityComputer};
use crate::metadata::MetadataProvider;
use crate::range::RangeSpec;
use crate::stream::{RangeStreamer, StreamedFile};

/// A client operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileRequest {
    /// Stream a file the client holds a checksum for
    Fetch {
        file_name: String,
        checksum: String,
        range: Option<String>,
    },
    /// Look up size, mtime and checksum by identifier
    Stat { identifier: String },
}

/// Result of a successful [`FileRequest`]
pub enum FileResponse {
    Stream(StreamedFile),
    Stats(FileStats),
}

/// Runs [`FileRequest`]s against one catalog
#[derive(Clone)]
pub struct FileService {
    catalog: Catalog,
    gate: AccessGate,
    streamer: RangeStreamer,
}

impl FileService {
    /// Assemble a service from its parts
    pub fn new(catalog: Catalog, gate: AccessGate, streamer: RangeStreamer) -> Self {
        Self {
            catalog,
            gate,
            streamer,
        }
    }

    /// Build a service from configuration
    pub fn from_config(config: &AppConfig) -> Self {
        let mut identity = IdentityComputer::new(config.streaming.hash_buffer_size);
        if config.catalog.identity_cache {
            identity = identity.with_cache(Arc::new(IdentityCache::new()));
        }

        Self::new(
            Catalog::new(config.catalog.serve_directory.clone(), identity.clone()),
            AccessGate::new(identity),
            RangeStreamer::new(config.streaming.chunk_size),
        )
    }

    /// The catalog this service reads from
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Execute `request`
    pub async fn handle(&self, request: FileRequest) -> Result<FileResponse> {
        match request {
            FileRequest::Fetch {
                file_name,
                checksum,
                range,
            } => self
                .fetch(&file_name, &checksum, range.as_deref())
                .await
                .map(FileResponse::Stream),
            FileRequest::Stat { identifier } => {
                self.stat(&identifier).await.map(FileResponse::Stats)
            }
        }
    }

    /// Stream `file_name` if `checksum` matches its current contents
    pub async fn fetch(
        &self,
        file_name: &str,
        checksum: &str,
        range: Option<&str>,
    ) -> Result<StreamedFile> {
        let path = self.catalog.resolve(file_name)?;
        tracing::info!(path = %path.display(), range = ?range, "fetch requested");

        let metadata = MetadataProvider::stat(&path).await?;
        self.gate
            .authorize(&path, checksum)
            .await
            .into_result(&path)?;

        let range = range
            .map(|header| RangeSpec::parse(header, metadata.size))
            .transpose()?;

        self.streamer.stream(&path, &metadata, range).await
    }

    /// Stats envelope for `identifier`
    pub async fn stat(&self, identifier: &str) -> Result<FileStats> {
        tracing::info!(identifier, "stats requested");
        self.catalog.stats(identifier).await
    }
}
