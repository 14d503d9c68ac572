//! Tests for the HTTP API
//!
//! Drives the router in-process with `tower::ServiceExt::oneshot`.

use super::*;
use crate::core::config::AppConfig;
use axum::body::Body;
use axum::http::header::{ACCEPT_RANGES, CONTENT_LENGTH, CONTENT_RANGE, CONTENT_TYPE, RANGE};
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

fn sample_data(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 7 % 256) as u8).collect()
}

fn test_router(files: &[(&str, &[u8])]) -> (TempDir, Router) {
    let dir = TempDir::new().unwrap();
    for (name, data) in files {
        std::fs::write(dir.path().join(name), data).unwrap();
    }
    let mut config = AppConfig::default();
    config.catalog.serve_directory = dir.path().to_path_buf();
    config.server.name = "test-files".to_string();
    config.streaming.chunk_size = 8192;
    let server = FileServer::new(&config);
    (dir, server.build_router())
}

async fn send(router: &Router, uri: &str, range: Option<&str>) -> Response {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(range) = range {
        builder = builder.header(RANGE, range);
    }
    let request = builder.body(Body::empty()).unwrap();
    router.clone().oneshot(request).await.unwrap()
}

async fn body_bytes(response: Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

async fn body_json(response: Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

async fn checksum_for(router: &Router, identifier: &str) -> String {
    let response = send(router, &format!("/api/stats/files/{identifier}"), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await["file"]["md5_checksum"]
        .as_str()
        .unwrap()
        .to_string()
}

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[tokio::test]
    async fn test_index_reports_name_and_version() {
        let (_dir, router) = test_router(&[]);
        let response = send(&router, "/", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let text = String::from_utf8(body_bytes(response).await).unwrap();
        assert_eq!(
            text,
            format!("REST Service test-files\nVersion: {}", env!("CARGO_PKG_VERSION"))
        );
    }

    #[tokio::test]
    async fn test_health() {
        let (_dir, router) = test_router(&[]);
        let response = send(&router, "/health", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_bytes(response).await, b"OK");
    }

    #[tokio::test]
    async fn test_stat_then_fetch_end_to_end() {
        let data = sample_data(500_000);
        let (_dir, router) = test_router(&[("report.pdf", &data)]);

        let response = send(&router, "/api/stats/files/report", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let stats = body_json(response).await;
        let checksum = stats["file"]["md5_checksum"].as_str().unwrap().to_string();
        assert_eq!(stats["file"]["name"], "report");
        assert_eq!(stats["file"]["size"], 500_000);
        assert!(stats["file"]["last_modified"].is_string());
        assert_eq!(
            stats["get_file_api"],
            format!("/api/get/file/{checksum}/report.pdf/")
        );

        let fetch_path = stats["get_file_api"].as_str().unwrap().to_string();
        let response = send(&router, &fetch_path, None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_LENGTH], "500000");
        assert_eq!(response.headers()[CONTENT_TYPE], "application/octet-stream");
        assert_eq!(body_bytes(response).await, data);

        let response = send(
            &router,
            "/api/get/file/0123456789abcdef0123456789abcdef/report.pdf/",
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(response).await;
        assert_eq!(body["error"], "incorrect checksum");
        assert!(body["message"].is_string());
    }

    #[tokio::test]
    async fn test_fetch_without_trailing_slash() {
        let (_dir, router) = test_router(&[("hello.txt", b"hello world")]);
        let response = send(
            &router,
            "/api/get/file/5eb63bbbe01eeed093cb22bb8f5acdc3/hello.txt",
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_bytes(response).await, b"hello world");
    }

    #[tokio::test]
    async fn test_partial_content() {
        let data = sample_data(1000);
        let (_dir, router) = test_router(&[("data.bin", &data)]);
        let checksum = checksum_for(&router, "data").await;

        let uri = format!("/api/get/file/{checksum}/data.bin/");
        let response = send(&router, &uri, Some("bytes=100-199")).await;
        assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
        assert_eq!(response.headers()[CONTENT_RANGE], "bytes 100-199/1000");
        assert_eq!(response.headers()[ACCEPT_RANGES], "bytes");
        assert_eq!(response.headers()[CONTENT_LENGTH], "100");
        assert_eq!(body_bytes(response).await, &data[100..=199]);

        let response = send(&router, &uri, Some("bytes=900-")).await;
        assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
        assert_eq!(response.headers()[CONTENT_RANGE], "bytes 900-999/1000");
        assert_eq!(response.headers()[CONTENT_LENGTH], "100");
        assert_eq!(body_bytes(response).await, &data[900..]);
    }

    #[tokio::test]
    async fn test_unsatisfiable_and_malformed_ranges() {
        let data = sample_data(1000);
        let (_dir, router) = test_router(&[("data.bin", &data)]);
        let checksum = checksum_for(&router, "data").await;
        let uri = format!("/api/get/file/{checksum}/data.bin/");

        for range in ["bytes=1000-1001", "bytes=-500", "bytes=0-1,4-5", "pages=1-2"] {
            let response = send(&router, &uri, Some(range)).await;
            assert_eq!(
                response.status(),
                StatusCode::RANGE_NOT_SATISFIABLE,
                "{range:?}"
            );
            assert_eq!(response.headers()[CONTENT_RANGE], "bytes */1000");
            let body = body_json(response).await;
            assert_eq!(body["error"], "range not satisfiable");
        }
    }

    #[tokio::test]
    async fn test_wrong_checksum_wins_over_bad_range() {
        let (_dir, router) = test_router(&[("hello.txt", b"hello world")]);
        let response = send(
            &router,
            "/api/get/file/nope/hello.txt/",
            Some("bytes=500-"),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.headers().get(CONTENT_RANGE).is_none());
    }

    #[tokio::test]
    async fn test_not_found_cases() {
        let (_dir, router) = test_router(&[("hello.txt", b"hello world")]);

        let response = send(&router, "/api/stats/files/missing", None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["error"], "file not found");

        let response = send(
            &router,
            "/api/get/file/5eb63bbbe01eeed093cb22bb8f5acdc3/missing.txt/",
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        // Encoded traversal decodes to "../hello.txt" inside the path segment
        let response = send(
            &router,
            "/api/get/file/5eb63bbbe01eeed093cb22bb8f5acdc3/..%2Fhello.txt/",
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_unreadable_file_is_not_found_without_path() {
        use std::os::unix::fs::PermissionsExt;

        let (dir, router) = test_router(&[("locked.bin", b"secret bytes")]);
        let path = dir.path().join("locked.bin");
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o000)).unwrap();
        if std::fs::File::open(&path).is_ok() {
            return;
        }

        let response = send(
            &router,
            "/api/get/file/00000000000000000000000000000000/locked.bin/",
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let text = String::from_utf8(body_bytes(response).await).unwrap();
        let body: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(body["error"], "file not found");
        assert!(!text.contains(dir.path().to_string_lossy().as_ref()));
        assert!(!text.contains("locked.bin"));
    }

    #[tokio::test]
    async fn test_concurrent_identical_fetches() {
        let data = sample_data(300_000);
        let (_dir, router) = test_router(&[("movie.mp4", &data)]);
        let checksum = checksum_for(&router, "movie").await;
        let uri = format!("/api/get/file/{checksum}/movie.mp4/");

        let (a, b) = tokio::join!(send(&router, &uri, None), send(&router, &uri, None));
        assert_eq!(a.status(), StatusCode::OK);
        assert_eq!(b.status(), StatusCode::OK);
        let (a, b) = tokio::join!(body_bytes(a), body_bytes(b));
        assert_eq!(a, data);
        assert_eq!(b, data);
    }

    #[tokio::test]
    async fn test_modified_file_invalidates_advertised_checksum() {
        let (dir, router) = test_router(&[("notes.txt", b"first draft")]);
        let checksum = checksum_for(&router, "notes").await;

        std::fs::write(dir.path().join("notes.txt"), b"second draft").unwrap();

        let response = send(&router, &format!("/api/get/file/{checksum}/notes.txt/"), None).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_url_generation() {
        let mut config = AppConfig::default();
        config.server.port = 8080;
        let server = FileServer::new(&config);

        assert_eq!(
            server.stats_url("report"),
            "http://127.0.0.1:8080/api/stats/files/report"
        );
        assert_eq!(
            server.file_url("abc123", "report.pdf"),
            "http://127.0.0.1:8080/api/get/file/abc123/report.pdf/"
        );
    }

    #[tokio::test]
    async fn test_serve_stops_on_shutdown() {
        let (dir, _router) = test_router(&[]);
        let mut config = AppConfig::default();
        config.catalog.serve_directory = dir.path().to_path_buf();
        let server = FileServer::new(&config);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let result = server.serve(listener, async {}).await;
        assert!(result.is_ok());
    }
}
