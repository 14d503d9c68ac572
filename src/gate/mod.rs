//! Checksum gate
//!
//! A fetch is admitted only if the token the client presents equals the token
//! recomputed from the file's current bytes. Recomputing at fetch time, rather
//! than trusting the token handed out by the stats endpoint, means a file that
//! changed in between is refused instead of served under a stale identity.

use std::fmt;
use std::path::Path;

use crate::core::error::FileError;
use crate::identity::IdentityComputer;

/// Why a request was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// The client token differs from the file's token
    ChecksumMismatch,
    /// The file could not be read
    NotFound,
}

impl RejectReason {
    /// Stable machine-readable name
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectReason::ChecksumMismatch => "checksum_mismatch",
            RejectReason::NotFound => "not_found",
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of [`AccessGate::authorize`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    Admitted,
    Rejected(RejectReason),
}

impl AccessDecision {
    /// Whether the request may proceed to streaming
    pub fn is_admitted(&self) -> bool {
        matches!(self, AccessDecision::Admitted)
    }

    /// Convert into a result, mapping rejections onto [`FileError`]
    pub fn into_result(self, path: &Path) -> Result<(), FileError> {
        match self {
            AccessDecision::Admitted => Ok(()),
            AccessDecision::Rejected(RejectReason::ChecksumMismatch) => {
                Err(FileError::ChecksumMismatch)
            }
            AccessDecision::Rejected(RejectReason::NotFound) => Err(FileError::NotFound {
                path: path.to_path_buf(),
            }),
        }
    }
}

/// Admits or rejects fetches by comparing identity tokens
#[derive(Clone, Default)]
pub struct AccessGate {
    identity: IdentityComputer,
}

impl AccessGate {
    /// Create a gate that recomputes tokens with `identity`
    pub fn new(identity: IdentityComputer) -> Self {
        Self { identity }
    }

    /// Decide whether `client_token` grants access to the file at `path`
    pub async fn authorize(&self, path: &Path, client_token: &str) -> AccessDecision {
        let token = match self.identity.compute_file(path).await {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "identity computation failed");
                return AccessDecision::Rejected(RejectReason::NotFound);
            }
        };

        if token.matches(client_token) {
            AccessDecision::Admitted
        } else {
            tracing::info!(path = %path.display(), "client checksum does not match file");
            AccessDecision::Rejected(RejectReason::ChecksumMismatch)
        }
    }
}
