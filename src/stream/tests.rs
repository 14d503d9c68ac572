//! Tests for the range streamer

use super::*;
use crate::metadata::MetadataProvider;
use futures::StreamExt;
use tempfile::TempDir;

fn sample_data(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 31 % 256) as u8).collect()
}

async fn setup(len: usize) -> (TempDir, std::path::PathBuf, Vec<u8>, FileMetadata) {
    let dir = TempDir::new().unwrap();
    let data = sample_data(len);
    let path = dir.path().join("payload.bin");
    std::fs::write(&path, &data).unwrap();
    let metadata = MetadataProvider::stat(&path).await.unwrap();
    (dir, path, data, metadata)
}

async fn body_bytes(response: Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

#[test]
fn test_full_content_head() {
    let head = StreamResponse::new(1000, None);
    assert_eq!(head.status(), StatusCode::OK);
    assert_eq!(head.content_length(), 1000);
    assert_eq!(head.offset(), 0);

    let headers = head.headers();
    assert!(headers.iter().all(|(name, _)| name != CONTENT_RANGE));
    assert!(headers
        .iter()
        .any(|(name, value)| name == CONTENT_LENGTH && value == "1000"));
    assert!(headers
        .iter()
        .any(|(name, value)| name == CONTENT_TYPE && value == OCTET_STREAM));
}

#[test]
fn test_partial_content_head() {
    let range = RangeSpec::parse("bytes=100-199", 1000).unwrap();
    let head = StreamResponse::new(1000, Some(range));
    assert_eq!(
        head,
        StreamResponse::PartialContent {
            start: 100,
            end: 199,
            size: 1000
        }
    );
    assert_eq!(head.status(), StatusCode::PARTIAL_CONTENT);
    assert_eq!(head.content_length(), 100);
    assert_eq!(head.total_size(), 1000);

    let headers = head.headers();
    assert!(headers
        .iter()
        .any(|(name, value)| name == CONTENT_RANGE && value == "bytes 100-199/1000"));
    assert!(headers
        .iter()
        .any(|(name, value)| name == ACCEPT_RANGES && value == "bytes"));
    assert!(headers
        .iter()
        .any(|(name, value)| name == CONTENT_LENGTH && value == "100"));
}

#[tokio::test]
async fn test_full_stream_is_byte_identical() {
    let (_dir, path, data, metadata) = setup(200_003).await;

    let streamed = RangeStreamer::new(4096)
        .stream(&path, &metadata, None)
        .await
        .unwrap();
    let response = streamed.into_response();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[CONTENT_LENGTH], "200003");
    assert_eq!(response.headers()[CONTENT_TYPE], OCTET_STREAM);
    assert_eq!(body_bytes(response).await, data);
}

#[tokio::test]
async fn test_partial_stream_returns_requested_bytes() {
    let (_dir, path, data, metadata) = setup(1000).await;
    let range = RangeSpec::parse("bytes=100-199", metadata.size).unwrap();

    let response = RangeStreamer::new(16)
        .stream(&path, &metadata, Some(range))
        .await
        .unwrap()
        .into_response();

    assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
    assert_eq!(response.headers()[CONTENT_RANGE], "bytes 100-199/1000");
    assert_eq!(response.headers()[CONTENT_LENGTH], "100");
    assert_eq!(response.headers()[ACCEPT_RANGES], "bytes");
    assert_eq!(body_bytes(response).await, &data[100..=199]);
}

#[tokio::test]
async fn test_open_ended_stream() {
    let (_dir, path, data, metadata) = setup(1000).await;
    let range = RangeSpec::parse("bytes=900-", metadata.size).unwrap();

    let response = RangeStreamer::default()
        .stream(&path, &metadata, Some(range))
        .await
        .unwrap()
        .into_response();

    assert_eq!(response.headers()[CONTENT_LENGTH], "100");
    assert_eq!(body_bytes(response).await, &data[900..]);
}

#[tokio::test]
async fn test_empty_file_streams_nothing() {
    let (_dir, path, _data, metadata) = setup(0).await;

    let response = RangeStreamer::default()
        .stream(&path, &metadata, None)
        .await
        .unwrap()
        .into_response();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[CONTENT_LENGTH], "0");
    assert!(body_bytes(response).await.is_empty());
}

#[tokio::test]
async fn test_missing_file_fails_before_head() {
    let (dir, _path, _data, metadata) = setup(10).await;
    let result = RangeStreamer::default()
        .stream(&dir.path().join("gone.bin"), &metadata, None)
        .await;
    assert!(matches!(result, Err(FileError::NotFound { .. })));
}

#[tokio::test]
async fn test_truncated_file_aborts_stream() {
    let (_dir, path, _data, metadata) = setup(10_000).await;

    let streamed = RangeStreamer::new(1024)
        .stream(&path, &metadata, None)
        .await
        .unwrap();

    // Shrink the file after the head promised 10_000 bytes
    std::fs::write(&path, sample_data(100)).unwrap();

    let (_head, mut body) = streamed.into_parts();
    let mut total = 0u64;
    let mut saw_error = false;
    while let Some(chunk) = body.next().await {
        match chunk {
            Ok(bytes) => total += bytes.len() as u64,
            Err(e) => {
                assert_eq!(e.kind(), std::io::ErrorKind::UnexpectedEof);
                saw_error = true;
            }
        }
    }

    assert!(saw_error);
    assert!(total < 10_000);
    assert_eq!(body.emitted(), total);
}

#[tokio::test]
async fn test_dropped_body_stops_after_partial_emission() {
    let (dir, path, data, metadata) = setup(10_000).await;

    let streamed = RangeStreamer::new(1024)
        .stream(&path, &metadata, None)
        .await
        .unwrap();
    let (head, mut body) = streamed.into_parts();
    assert_eq!(head.content_length(), 10_000);

    let first = body.next().await.unwrap().unwrap();
    assert_eq!(&first[..], &data[..1024]);
    assert_eq!(body.emitted(), 1024);

    // Client hung up: the body is dropped with the rest unsent
    drop(body);

    std::fs::remove_file(&path).unwrap();
    dir.close().unwrap();
}
