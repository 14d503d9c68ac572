//! Error types for checkstream
//!
//! Every failure a request can hit while resolving, hashing, range-parsing or
//! streaming a file is one variant of [`FileError`]. The HTTP layer maps these
//! onto status codes in `api::error`.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Result type alias for checkstream operations
pub type Result<T> = std::result::Result<T, FileError>;

/// Main error type for checkstream
#[derive(Error, Debug)]
pub enum FileError {
    #[error("File not found: {path}")]
    NotFound { path: PathBuf },

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed range header: {header:?}")]
    MalformedRange { header: String, size: u64 },

    #[error("Range {header:?} not satisfiable for {size} bytes")]
    UnsatisfiableRange { header: String, size: u64 },

    #[error("Checksum mismatch")]
    ChecksumMismatch,

    #[error("Configuration error: {0}")]
    Config(String),
}

impl FileError {
    /// Classify an I/O error raised while touching `path`.
    ///
    /// `ErrorKind::NotFound` becomes [`FileError::NotFound`]; everything else
    /// (permission denied, device faults, ...) becomes [`FileError::Read`].
    pub fn from_io(path: &Path, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            FileError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            FileError::Read {
                path: path.to_path_buf(),
                source,
            }
        }
    }

    /// Check if this error means the requested file does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, FileError::NotFound { .. })
    }

    /// Check if this error came from the range header
    pub fn is_range_error(&self) -> bool {
        self.range_total_size().is_some()
    }

    /// Size of the file a rejected range header was checked against
    pub fn range_total_size(&self) -> Option<u64> {
        match self {
            FileError::MalformedRange { size, .. } | FileError::UnsatisfiableRange { size, .. } => {
                Some(*size)
            }
            _ => None,
        }
    }
}

impl From<config::ConfigError> for FileError {
    fn from(err: config::ConfigError) -> Self {
        FileError::Config(err.to_string())
    }
}
