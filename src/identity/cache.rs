//! Identity token cache
//!
//! Entries are keyed by path and validated against the file's modification
//! time and size. A changed mtime or size makes the entry stale; the next
//! lookup misses and the fresh token replaces it.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use dashmap::DashMap;

use super::IdentityToken;
use crate::metadata::FileMetadata;

/// Validity key for a cached token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheKey {
    path: PathBuf,
    modified: SystemTime,
    size: u64,
}

impl CacheKey {
    /// Build a key from a path and the metadata observed for it
    pub fn new(path: &Path, metadata: &FileMetadata) -> Self {
        Self {
            path: path.to_path_buf(),
            modified: metadata.modified,
            size: metadata.size,
        }
    }
}

#[derive(Debug, Clone)]
struct CachedIdentity {
    modified: SystemTime,
    size: u64,
    token: IdentityToken,
}

/// Concurrent (path, mtime, size) → token cache
#[derive(Debug, Default)]
pub struct IdentityCache {
    entries: DashMap<PathBuf, CachedIdentity>,
}

impl IdentityCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Token for `key` if the cached entry is still valid
    pub fn get(&self, key: &CacheKey) -> Option<IdentityToken> {
        self.entries.get(&key.path).and_then(|entry| {
            (entry.modified == key.modified && entry.size == key.size)
                .then(|| entry.token.clone())
        })
    }

    /// Store a token, replacing whatever was cached for the same path
    pub fn insert(&self, key: CacheKey, token: IdentityToken) {
        self.entries.insert(
            key.path,
            CachedIdentity {
                modified: key.modified,
                size: key.size,
                token,
            },
        );
    }

    /// Drop the entry for `path`
    pub fn invalidate(&self, path: &Path) {
        self.entries.remove(path);
    }

    /// Drop every entry
    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Number of cached paths
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
