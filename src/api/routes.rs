//! HTTP handlers
//!
//! Handlers only translate between HTTP and [`FileRequest`]; the work happens
//! in [`crate::service::FileService`].

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap},
    response::{IntoResponse, Response},
    Json,
};

use super::error::ServeError;
use super::server::ServerState;
use crate::service::{FileRequest, FileResponse};

impl IntoResponse for FileResponse {
    fn into_response(self) -> Response {
        match self {
            FileResponse::Stream(file) => file.into_response(),
            FileResponse::Stats(stats) => Json(stats).into_response(),
        }
    }
}

/// Service banner
///
/// Route: GET /
pub async fn index(State(state): State<ServerState>) -> String {
    format!(
        "REST Service {}\nVersion: {}",
        state.name,
        env!("CARGO_PKG_VERSION")
    )
}

/// Liveness probe
///
/// Route: GET /health
pub async fn health() -> &'static str {
    "OK"
}

/// Size, mtime and checksum of a file by identifier
///
/// Route: GET /api/stats/files/:identifier
pub async fn get_file_stats(
    State(state): State<ServerState>,
    Path(identifier): Path<String>,
) -> Result<FileResponse, ServeError> {
    let response = state
        .service
        .handle(FileRequest::Stat { identifier })
        .await?;
    Ok(response)
}

/// Stream a file whose checksum the client already knows
///
/// Route: GET /api/get/file/:checksum/:filename
///
/// Honors a single `Range: bytes=<start>-[<end>]` header.
pub async fn get_file(
    State(state): State<ServerState>,
    Path((checksum, file_name)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<FileResponse, ServeError> {
    let range = headers
        .get(header::RANGE)
        .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned());

    let response = state
        .service
        .handle(FileRequest::Fetch {
            file_name,
            checksum,
            range,
        })
        .await?;
    Ok(response)
}
