//! Body stream with emission accounting
//!
//! Wraps the chunked file reader so that a file shrinking mid-stream, a read
//! fault, or a client hanging up is logged with how far the transfer got.

use std::path::PathBuf;
use std::pin::Pin;
use std::task::{Context, Poll};

use axum::body::Bytes;
use futures::Stream;
use tokio::fs::File;
use tokio::io::Take;
use tokio_util::io::ReaderStream;

/// Streams exactly `expected` bytes or ends with an error
pub struct EmissionStream {
    inner: ReaderStream<Take<File>>,
    path: PathBuf,
    expected: u64,
    emitted: u64,
    finished: bool,
}

impl EmissionStream {
    pub(super) fn new(inner: ReaderStream<Take<File>>, path: PathBuf, expected: u64) -> Self {
        Self {
            inner,
            path,
            expected,
            emitted: 0,
            finished: false,
        }
    }

    /// Bytes yielded so far
    pub fn emitted(&self) -> u64 {
        self.emitted
    }

    fn abort(&mut self, error: std::io::Error) -> Poll<Option<std::io::Result<Bytes>>> {
        self.finished = true;
        tracing::warn!(
            path = %self.path.display(),
            emitted = self.emitted,
            expected = self.expected,
            error = %error,
            "stream aborted"
        );
        Poll::Ready(Some(Err(error)))
    }
}

impl Stream for EmissionStream {
    type Item = std::io::Result<Bytes>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.finished {
            return Poll::Ready(None);
        }

        match Pin::new(&mut this.inner).poll_next(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(Some(Ok(chunk))) => {
                this.emitted += chunk.len() as u64;
                Poll::Ready(Some(Ok(chunk)))
            }
            Poll::Ready(Some(Err(e))) => this.abort(e),
            Poll::Ready(None) if this.emitted < this.expected => this.abort(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "file ended before the advertised length",
            )),
            Poll::Ready(None) => {
                this.finished = true;
                tracing::debug!(path = %this.path.display(), bytes = this.emitted, "stream completed");
                Poll::Ready(None)
            }
        }
    }
}

impl Drop for EmissionStream {
    fn drop(&mut self) {
        if !self.finished {
            tracing::debug!(
                path = %self.path.display(),
                emitted = self.emitted,
                expected = self.expected,
                "stream dropped before completion"
            );
        }
    }
}
