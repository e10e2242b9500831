//! Multipart extraction for the upload endpoint

use axum::extract::Multipart;
use bytes::Bytes;
use mediasan_core::{AppError, UploadCandidate};

/// Name of the form field carrying the upload.
pub const FILE_FIELD: &str = "file";

/// Extract the single `file` field from a multipart form.
///
/// Other fields are ignored. A second `file` field or a missing one is
/// rejected as invalid input.
pub async fn extract_multipart_file(mut multipart: Multipart) -> Result<UploadCandidate, AppError> {
    let mut file_data: Option<Bytes> = None;
    let mut filename: Option<String> = None;
    let mut content_type: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Failed to read multipart: {}", e)))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        if file_data.is_some() {
            return Err(AppError::InvalidInput(
                "Multiple file fields are not allowed; send exactly one field named 'file'"
                    .to_string(),
            ));
        }
        filename = field.file_name().map(str::to_string);
        content_type = field.content_type().map(str::to_string);

        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::InvalidInput(format!("Failed to read file data: {}", e)))?;
        file_data = Some(data);
    }

    let file_data =
        file_data.ok_or_else(|| AppError::InvalidInput("No file provided".to_string()))?;

    let original_filename = filename.unwrap_or_else(|| "unknown".to_string());
    let content_type = content_type.unwrap_or_else(|| "application/octet-stream".to_string());

    Ok(UploadCandidate::new(file_data, content_type, original_filename))
}
