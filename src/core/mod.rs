//! checkstream core module
//!
//! This module contains the pieces every other module leans on:
//! - Configuration management
//! - Error types and handling
//! - File-name helpers

pub mod config;
pub mod error;
pub mod utils;

// Re-export commonly used items
pub use config::{AppConfig, CatalogConfig, ServerConfig, StreamingConfig};
pub use error::{FileError, Result};
