//! File metadata lookups
//!
//! Size and modification time for a served file, taken from a single
//! `stat` call.

use std::path::Path;
use std::time::SystemTime;

use chrono::{DateTime, Utc};

use crate::core::error::{FileError, Result};

/// Size and modification time of a regular file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileMetadata {
    /// Length in bytes
    pub size: u64,
    /// Last modification time
    pub modified: SystemTime,
}

impl FileMetadata {
    /// Modification time as a UTC timestamp
    pub fn modified_utc(&self) -> DateTime<Utc> {
        DateTime::<Utc>::from(self.modified)
    }
}

/// Reads [`FileMetadata`] from the filesystem
pub struct MetadataProvider;

impl MetadataProvider {
    /// Stat `path`.
    ///
    /// Fails with [`FileError::NotFound`] if nothing exists at `path` or it is
    /// not a regular file, and with [`FileError::Read`] for other OS errors.
    pub async fn stat(path: &Path) -> Result<FileMetadata> {
        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|e| FileError::from_io(path, e))?;

        if !metadata.is_file() {
            return Err(FileError::NotFound {
                path: path.to_path_buf(),
            });
        }

        let modified = metadata
            .modified()
            .map_err(|e| FileError::from_io(path, e))?;

        Ok(FileMetadata {
            size: metadata.len(),
            modified,
        })
    }
}
