//! checkstream - checksum-gated file server with HTTP range streaming
//!
//! This crate provides:
//! - Content identity tokens (MD5) with an optional (path, mtime, size) cache
//! - Access gating on a client-presented token
//! - Single-range `bytes=start-[end]` parsing and partial-content streaming
//! - A directory catalog with stats lookup by identifier
//! - An axum HTTP API over all of the above

pub mod api;
pub mod catalog;
pub mod core;
pub mod gate;
pub mod identity;
pub mod logging;
pub mod metadata;
pub mod range;
pub mod service;
pub mod stream;

// Re-export commonly used items
pub use crate::core::config::AppConfig;
pub use crate::core::error::{FileError, Result};
pub use api::{build_router, FileServer, ServeError, ServerState};
pub use catalog::{Catalog, FileStats};
pub use gate::{AccessDecision, AccessGate, RejectReason};
pub use identity::{IdentityCache, IdentityComputer, IdentityToken};
pub use metadata::{FileMetadata, MetadataProvider};
pub use range::RangeSpec;
pub use service::{FileRequest, FileResponse, FileService};
pub use stream::{RangeStreamer, StreamResponse, StreamedFile};
