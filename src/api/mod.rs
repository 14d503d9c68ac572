//! Checksum-gated HTTP API
//!
//! Exposes the served directory over HTTP:
//! - Stats lookup by identifier (size, mtime, checksum, fetch path)
//! - Fetch gated on the client presenting the file's current checksum
//! - Single-range partial content for large files
//! - Request tracing via `tower-http`

mod error;
mod routes;
mod server;
#[cfg(test)]
mod tests;

pub use error::{ErrorBody, ServeError};
pub use routes::{get_file, get_file_stats, health, index};
pub use server::{build_router, FileServer, ServerState};
