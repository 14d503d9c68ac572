//! Full and partial content streaming
//!
//! Once a fetch has passed the checksum gate, [`RangeStreamer`] opens the file
//! and produces the response head plus a body that reads the file forward in
//! fixed-size chunks. The whole file is never buffered.
//!
//! Errors after the head has been sent cannot be reported with a status code;
//! the body stream yields an error instead, which makes the transport abort
//! the connection rather than deliver a short body.

mod body;
#[cfg(test)]
mod tests;

pub use body::EmissionStream;

use std::io::SeekFrom;
use std::path::Path;

use axum::body::Body;
use axum::http::header::{ACCEPT_RANGES, CONTENT_LENGTH, CONTENT_RANGE, CONTENT_TYPE};
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio_util::io::ReaderStream;

use crate::core::error::{FileError, Result};
use crate::metadata::FileMetadata;
use crate::range::RangeSpec;

/// Content type of every streamed file
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Default body chunk size (64 KiB)
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Response head for a streamed file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamResponse {
    /// 200 with the whole file
    FullContent { size: u64 },
    /// 206 with bytes `[start, end]`
    PartialContent { start: u64, end: u64, size: u64 },
}

impl StreamResponse {
    /// Head for a file of `size` bytes, optionally restricted to `range`
    pub fn new(size: u64, range: Option<RangeSpec>) -> Self {
        match range {
            None => StreamResponse::FullContent { size },
            Some(range) => StreamResponse::PartialContent {
                start: range.start(),
                end: range.end(),
                size,
            },
        }
    }

    /// HTTP status for this head
    pub fn status(&self) -> StatusCode {
        match self {
            StreamResponse::FullContent { .. } => StatusCode::OK,
            StreamResponse::PartialContent { .. } => StatusCode::PARTIAL_CONTENT,
        }
    }

    /// Offset of the first byte sent
    pub fn offset(&self) -> u64 {
        match self {
            StreamResponse::FullContent { .. } => 0,
            StreamResponse::PartialContent { start, .. } => *start,
        }
    }

    /// Number of body bytes promised by `Content-Length`
    pub fn content_length(&self) -> u64 {
        match self {
            StreamResponse::FullContent { size } => *size,
            StreamResponse::PartialContent { start, end, .. } => end - start + 1,
        }
    }

    /// Total size of the underlying file
    pub fn total_size(&self) -> u64 {
        match self {
            StreamResponse::FullContent { size } | StreamResponse::PartialContent { size, .. } => {
                *size
            }
        }
    }

    /// Header pairs to send with this head
    pub fn headers(&self) -> Vec<(axum::http::HeaderName, HeaderValue)> {
        let mut headers = Vec::with_capacity(4);
        if let StreamResponse::PartialContent { start, end, size } = self {
            let content_range = format!("bytes {}-{}/{}", start, end, size);
            if let Ok(value) = HeaderValue::from_str(&content_range) {
                headers.push((CONTENT_RANGE, value));
            }
            headers.push((ACCEPT_RANGES, HeaderValue::from_static("bytes")));
        }
        headers.push((CONTENT_LENGTH, HeaderValue::from(self.content_length())));
        headers.push((CONTENT_TYPE, HeaderValue::from_static(OCTET_STREAM)));
        headers
    }
}

/// An admitted file ready to be sent: response head plus body stream
pub struct StreamedFile {
    head: StreamResponse,
    body: EmissionStream,
}

impl StreamedFile {
    /// Response head
    pub fn head(&self) -> StreamResponse {
        self.head
    }

    /// Split into head and body stream
    pub fn into_parts(self) -> (StreamResponse, EmissionStream) {
        (self.head, self.body)
    }
}

impl IntoResponse for StreamedFile {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from_stream(self.body));
        *response.status_mut() = self.head.status();
        let headers = response.headers_mut();
        for (name, value) in self.head.headers() {
            headers.insert(name, value);
        }
        response
    }
}

/// Opens files and builds [`StreamedFile`]s
#[derive(Debug, Clone)]
pub struct RangeStreamer {
    chunk_size: usize,
}

impl Default for RangeStreamer {
    fn default() -> Self {
        Self::new(DEFAULT_CHUNK_SIZE)
    }
}

impl RangeStreamer {
    /// Create a streamer that reads `chunk_size` bytes per body chunk
    pub fn new(chunk_size: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
        }
    }

    /// Open `path` and prepare the response for `range` (or the whole file).
    ///
    /// `metadata` must come from a stat of the same path; its size is what the
    /// head advertises. Only open/seek failures are returned here; read
    /// failures surface later through the body stream.
    pub async fn stream(
        &self,
        path: &Path,
        metadata: &FileMetadata,
        range: Option<RangeSpec>,
    ) -> Result<StreamedFile> {
        let head = StreamResponse::new(metadata.size, range);

        let mut file = tokio::fs::File::open(path)
            .await
            .map_err(|e| FileError::from_io(path, e))?;
        if head.offset() > 0 {
            file.seek(SeekFrom::Start(head.offset()))
                .await
                .map_err(|e| FileError::from_io(path, e))?;
        }

        let reader = ReaderStream::with_capacity(file.take(head.content_length()), self.chunk_size);
        let body = EmissionStream::new(reader, path.to_path_buf(), head.content_length());

        tracing::debug!(
            path = %path.display(),
            status = head.status().as_u16(),
            offset = head.offset(),
            length = head.content_length(),
            "streaming file"
        );

        Ok(StreamedFile { head, body })
    }
}
