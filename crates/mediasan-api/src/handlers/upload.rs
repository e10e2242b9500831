use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    Json,
};
use serde::Serialize;

use crate::error::HttpAppError;
use crate::state::AppState;
use crate::utils::upload::extract_multipart_file;

pub const UPLOAD_SUCCESS_MESSAGE: &str = "File uploaded and sanitized successfully";

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: &'static str,
}

/// Upload handler
///
/// Reads the `file` field, validates it against its declared type and
/// magic bytes, then re-encodes it into the sanitized output directory.
///
/// # Errors
/// - `AppError::InvalidInput` - not multipart, or no single `file` field
/// - `AppError::UnsupportedDeclaredType`, `SizeExceeded`,
///   `ContentSignatureMismatch` - upload rejected (400)
/// - `AppError::TranscodeFailure`, `UnsupportedMediaCategory` - sanitizing failed (500)
#[tracing::instrument(skip(state, multipart))]
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, HttpAppError> {
    let candidate = extract_multipart_file(multipart?).await?;

    let outcome = state.pipeline.run(&candidate).await?;

    tracing::info!(
        original_filename = %candidate.original_filename,
        sanitized_path = %outcome.artifact.path.display(),
        mime_type = %candidate.content_type,
        size = candidate.size,
        detected = %outcome.detected,
        bytes_written = outcome.artifact.bytes_written,
        "File uploaded and sanitized"
    );

    Ok(Json(UploadResponse {
        message: UPLOAD_SUCCESS_MESSAGE,
    }))
}
