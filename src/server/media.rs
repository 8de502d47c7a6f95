use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use tokio_util::io::ReaderStream;

use crate::media::content_type_for;
use crate::server::AppState;
use crate::server::response::{ApiError, StoreResultExt};

/// Streams a stored upload. Paths that don't name a stored file are 404s.
pub async fn download(
    State(state): State<Arc<AppState>>,
    Path((kind, file)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let stored = format!("{kind}/{file}");

    let (reader, size) = state
        .media
        .open(&stored)
        .await
        .api_err("Failed to open media file")?;

    let body = Body::from_stream(ReaderStream::new(reader));

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type_for(&stored))
        .header(header::CONTENT_LENGTH, size)
        .header("X-Content-Type-Options", "nosniff")
        .body(body)
        .or_else(|_| Ok(StatusCode::INTERNAL_SERVER_ERROR.into_response()))
}
