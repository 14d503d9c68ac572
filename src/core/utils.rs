//! Utility functions for checkstream
//!
//! File-name helpers shared by the catalog and the HTTP layer.

use std::path::{Component, Path};

/// Identifier of a directory entry: its name with the last extension removed.
///
/// Names without a `.` have no identifier and can only be fetched by their
/// full name.
pub fn file_identifier(file_name: &str) -> Option<&str> {
    file_name.rsplit_once('.').map(|(stem, _)| stem)
}

/// Check that `name` is exactly one normal path component.
///
/// Rejects empty names, `.`/`..`, separators and absolute paths so a
/// client-supplied name can never leave the served directory.
pub fn is_plain_file_name(name: &str) -> bool {
    if name.is_empty() || name.contains('/') || name.contains('\\') {
        return false;
    }
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}
