//! Served-directory catalog
//!
//! Maps client-facing names onto files inside the configured serve
//! directory and builds the stats envelope clients use to learn a file's
//! identity token. Only regular files directly inside the directory are
//! reachable.


use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::core::error::{FileError, Result};
use crate::core::utils::{file_identifier, is_plain_file_name};
use crate::identity::IdentityComputer;
use crate::metadata::{FileMetadata, MetadataProvider};

/// Route prefix of the fetch endpoint
pub const FETCH_API_PREFIX: &str = "/api/get/file";

/// Stats envelope returned by `/api/stats/files/{identifier}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileStats {
    pub file: FileEntry,
    /// Path to fetch the file with its current checksum
    pub get_file_api: String,
}

/// File section of [`FileStats`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    /// Identifier the client asked for
    pub name: String,
    pub size: u64,
    /// RFC 3339 timestamp with millisecond precision
    pub last_modified: String,
    pub md5_checksum: String,
}

/// A file found in the catalog
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    /// Full file name including extension
    pub file_name: String,
    /// Absolute path inside the serve directory
    pub path: PathBuf,
}

/// Lookup over one serve directory
#[derive(Clone)]
pub struct Catalog {
    serve_directory: PathBuf,
    identity: IdentityComputer,
}

impl Catalog {
    /// Create a catalog over `serve_directory`
    pub fn new(serve_directory: impl Into<PathBuf>, identity: IdentityComputer) -> Self {
        Self {
            serve_directory: serve_directory.into(),
            identity,
        }
    }

    /// Directory being served
    pub fn serve_directory(&self) -> &Path {
        &self.serve_directory
    }

    /// Identity computer used for stats
    pub fn identity(&self) -> &IdentityComputer {
        &self.identity
    }

    /// Path for a client-supplied file name.
    ///
    /// The name must be a single plain path component; anything that could
    /// escape the serve directory resolves to [`FileError::NotFound`].
    pub fn resolve(&self, file_name: &str) -> Result<PathBuf> {
        if !is_plain_file_name(file_name) {
            tracing::warn!(file_name, "rejected file name outside the serve directory");
            return Err(FileError::NotFound {
                path: PathBuf::from(file_name),
            });
        }
        Ok(self.serve_directory.join(file_name))
    }

    /// First regular file (by name) whose extension-less name is `identifier`
    pub async fn find(&self, identifier: &str) -> Result<CatalogEntry> {
        let not_found = || FileError::NotFound {
            path: PathBuf::from(identifier),
        };

        let mut entries = tokio::fs::read_dir(&self.serve_directory)
            .await
            .map_err(|e| FileError::from_io(&self.serve_directory, e))?;

        let mut matches = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| FileError::from_io(&self.serve_directory, e))?
        {
            let Ok(file_name) = entry.file_name().into_string() else {
                continue;
            };
            if file_identifier(&file_name) != Some(identifier) {
                continue;
            }
            let is_file = entry
                .file_type()
                .await
                .map(|t| t.is_file())
                .unwrap_or(false);
            if is_file {
                matches.push(file_name);
            }
        }

        matches.sort();
        let file_name = matches.into_iter().next().ok_or_else(not_found)?;
        let path = self.serve_directory.join(&file_name);
        Ok(CatalogEntry { file_name, path })
    }

    /// Stats envelope for `identifier`, hashing the file's current contents
    pub async fn stats(&self, identifier: &str) -> Result<FileStats> {
        let entry = self.find(identifier).await?;
        let metadata = MetadataProvider::stat(&entry.path).await?;
        let checksum = self.identity.compute_file(&entry.path).await?;

        tracing::debug!(
            identifier,
            file_name = %entry.file_name,
            size = metadata.size,
            "built file stats"
        );

        Ok(FileStats {
            file: FileEntry {
                name: identifier.to_string(),
                size: metadata.size,
                last_modified: format_timestamp(&metadata),
                md5_checksum: checksum.to_string(),
            },
            get_file_api: fetch_api_path(checksum.as_str(), &entry.file_name),
        })
    }
}

/// Fetch path for a file with the given checksum
pub fn fetch_api_path(checksum: &str, file_name: &str) -> String {
    format!("{}/{}/{}/", FETCH_API_PREFIX, checksum, file_name)
}

fn format_timestamp(metadata: &FileMetadata) -> String {
    let modified: DateTime<Utc> = metadata.modified_utc();
    modified.to_rfc3339_opts(SecondsFormat::Millis, true)
}
