//! HTTP byte-range parsing
//!
//! Only the single-range, start-present subset of RFC 7233 is accepted:
//!
//! ```text
//! Range: bytes=<start>-<end>
//! Range: bytes=<start>-
//! ```
//!
//! Suffix ranges (`bytes=-500`) and multi-range sets (`bytes=0-9,20-29`) are
//! rejected as malformed rather than partially honored.


use std::fmt;

use crate::core::error::{FileError, Result};

const BYTES_UNIT: &str = "bytes=";

/// Inclusive byte interval `[start, end]` inside a file of known size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeSpec {
    start: u64,
    end: u64,
}

impl RangeSpec {
    /// Parse a `Range` header value against a file of `total_size` bytes.
    ///
    /// An omitted end defaults to the last byte; an end past the last byte is
    /// clamped to it. Fails with [`FileError::MalformedRange`] when the value
    /// is not `bytes=<start>-[<end>]`, and with
    /// [`FileError::UnsatisfiableRange`] when `start >= total_size` or
    /// `start > end`.
    pub fn parse(header: &str, total_size: u64) -> Result<Self> {
        let malformed = || FileError::MalformedRange {
            header: header.to_string(),
            size: total_size,
        };
        let unsatisfiable = || FileError::UnsatisfiableRange {
            header: header.to_string(),
            size: total_size,
        };

        let spec = header.trim().strip_prefix(BYTES_UNIT).ok_or_else(malformed)?;
        if spec.contains(',') {
            return Err(malformed());
        }

        let (start, end) = spec.split_once('-').ok_or_else(malformed)?;
        let start = parse_position(start).ok_or_else(malformed)?;
        let end = match end {
            "" => None,
            end => Some(parse_position(end).ok_or_else(malformed)?),
        };

        if start >= total_size {
            return Err(unsatisfiable());
        }
        let last = total_size - 1;
        let end = end.map_or(last, |end| end.min(last));
        if start > end {
            return Err(unsatisfiable());
        }

        Ok(Self { start, end })
    }

    /// First byte offset
    pub fn start(&self) -> u64 {
        self.start
    }

    /// Last byte offset (inclusive)
    pub fn end(&self) -> u64 {
        self.end
    }

    /// Number of bytes covered
    pub fn content_length(&self) -> u64 {
        self.end - self.start + 1
    }

    /// `Content-Range` value for a 206 response
    pub fn content_range(&self, total_size: u64) -> String {
        format!("bytes {}-{}/{}", self.start, self.end, total_size)
    }
}

impl fmt::Display for RangeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// `Content-Range` value for a 416 response
pub fn unsatisfied_content_range(total_size: u64) -> String {
    format!("bytes */{}", total_size)
}

/// Decimal digits only; no sign, no whitespace, no overflow
fn parse_position(s: &str) -> Option<u64> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}
