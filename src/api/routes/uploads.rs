//! Upload Routes
//!
//! Serves stored image files.
//!
//! - GET /uploads/:filename - Image bytes with an extension-derived type

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;

/// GET /uploads/:filename
pub async fn serve_upload(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> ApiResult<Response> {
    validate_filename(&filename)?;

    let path = state.store.uploads_dir().join(&filename);

    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ApiError::NotFound(format!("Upload {}", filename)));
        }
        Err(e) => return Err(e.into()),
    };

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, content_type(&filename))],
        Body::from(bytes),
    )
        .into_response())
}

/// Filenames are uuid-with-extension; anything that could walk the
/// filesystem is rejected outright.
fn validate_filename(filename: &str) -> ApiResult<()> {
    if filename.is_empty()
        || filename.contains('/')
        || filename.contains('\\')
        || filename.contains("..")
    {
        return Err(ApiError::Validation("Invalid filename".to_string()));
    }
    Ok(())
}

fn content_type(filename: &str) -> &'static str {
    match filename.rsplit('.').next() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        _ => "application/octet-stream",
    }
}
