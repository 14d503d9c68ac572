//! Content identity tokens
//!
//! An identity token is the lowercase hex MD5 digest of a file's complete
//! contents. It asserts "these exact bytes" and is not a secret: clients get
//! it from the stats endpoint and must echo it back to fetch the file.
//!
//! Tokens are recomputed from the bytes on every call unless an
//! [`IdentityCache`] is attached.

mod cache;

pub use cache::{CacheKey, IdentityCache};

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::core::error::{FileError, Result};
use crate::metadata::MetadataProvider;

/// Default read buffer for hashing (1 MiB)
pub const DEFAULT_HASH_BUFFER_SIZE: usize = 1024 * 1024;

/// Hex-encoded content digest of a file
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdentityToken(String);

impl IdentityToken {
    /// Token as it appears on the wire
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Exact, case-sensitive comparison against a client-supplied token
    pub fn matches(&self, client_token: &str) -> bool {
        self.0.as_bytes() == client_token.as_bytes()
    }

    fn from_digest(hasher: Md5) -> Self {
        Self(hex::encode(hasher.finalize()))
    }
}

impl fmt::Display for IdentityToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Computes identity tokens from byte sources
#[derive(Clone)]
pub struct IdentityComputer {
    buffer_size: usize,
    cache: Option<Arc<IdentityCache>>,
}

impl Default for IdentityComputer {
    fn default() -> Self {
        Self::new(DEFAULT_HASH_BUFFER_SIZE)
    }
}

impl IdentityComputer {
    /// Create a computer that reads `buffer_size` bytes per pass
    pub fn new(buffer_size: usize) -> Self {
        Self {
            buffer_size: buffer_size.max(1),
            cache: None,
        }
    }

    /// Attach a token cache keyed by (path, mtime, size)
    pub fn with_cache(mut self, cache: Arc<IdentityCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// The attached cache, if any
    pub fn cache(&self) -> Option<&Arc<IdentityCache>> {
        self.cache.as_ref()
    }

    /// Token for an in-memory byte slice
    pub fn compute_bytes(&self, bytes: &[u8]) -> IdentityToken {
        let mut hasher = Md5::new();
        hasher.update(bytes);
        IdentityToken::from_digest(hasher)
    }

    /// Token for everything readable from `reader`.
    ///
    /// The reader is drained to EOF; any read failure aborts the computation.
    pub async fn compute_reader<R>(&self, reader: &mut R) -> std::io::Result<IdentityToken>
    where
        R: AsyncRead + Unpin,
    {
        let mut hasher = Md5::new();
        let mut buffer = vec![0u8; self.buffer_size];

        loop {
            let n = reader.read(&mut buffer).await?;
            if n == 0 {
                break;
            }
            hasher.update(&buffer[..n]);
        }

        Ok(IdentityToken::from_digest(hasher))
    }

    /// Token for the full contents of the file at `path`
    pub async fn compute_file(&self, path: &Path) -> Result<IdentityToken> {
        let Some(cache) = &self.cache else {
            return self.hash_file(path).await;
        };

        let metadata = MetadataProvider::stat(path).await?;
        let key = CacheKey::new(path, &metadata);
        if let Some(token) = cache.get(&key) {
            tracing::trace!(path = %path.display(), "identity cache hit");
            return Ok(token);
        }

        let token = self.hash_file(path).await?;

        // Only remember the token if the file did not change while it was read
        let after = MetadataProvider::stat(path).await?;
        if CacheKey::new(path, &after) == key {
            cache.insert(key, token.clone());
        }
        Ok(token)
    }

    async fn hash_file(&self, path: &Path) -> Result<IdentityToken> {
        let mut file = tokio::fs::File::open(path)
            .await
            .map_err(|e| FileError::from_io(path, e))?;

        let token = self
            .compute_reader(&mut file)
            .await
            .map_err(|e| FileError::from_io(path, e))?;

        tracing::debug!(path = %path.display(), token = %token, "computed identity token");
        Ok(token)
    }
}
