//! API Routes
//!
//! Route handlers organized by resource.

pub mod furniture;
pub mod health;
pub mod projects;
pub mod reports;
pub mod uploads;
pub mod users;

use crate::api::base64;
use crate::api::dto::ImagePayload;
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;

/// Decode an inline image payload and persist it to the uploads directory.
///
/// Returns the stored filename. Callers that fail after this point must
/// delete the file again (see the item and project image flows).
pub(crate) fn store_image(state: &AppState, payload: &ImagePayload) -> ApiResult<String> {
    let extension = match payload.format.to_lowercase().as_str() {
        "png" => "png",
        "jpg" | "jpeg" => "jpg",
        other => {
            return Err(ApiError::Validation(format!(
                "Unsupported image format: {}. Use png or jpg",
                other
            )))
        }
    };

    let bytes = base64::decode(&payload.data)
        .map_err(|e| ApiError::Validation(format!("Invalid base64 image data: {}", e)))?;

    if bytes.is_empty() {
        return Err(ApiError::Validation("Image data is empty".to_string()));
    }
    if bytes.len() > state.config.max_upload_bytes {
        return Err(ApiError::Validation(format!(
            "Image exceeds maximum size of {} bytes",
            state.config.max_upload_bytes
        )));
    }

    Ok(state.store.save_upload(&bytes, extension)?)
}
