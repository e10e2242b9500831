//! HTTP error response conversion
//!
//! Handlers return `Result<_, HttpAppError>`; anything convertible into
//! `AppError` can be propagated with `?` and is rendered here with the status,
//! message and log level the error declares for itself.

use axum::{
    extract::multipart::MultipartRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use mediasan_core::{AppError, ErrorMetadata, LogLevel};
use mediasan_processing::PipelineError;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable reason
    pub message: String,
    /// Machine-readable error code for programmatic handling
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
}

/// Wrapper type for AppError to implement IntoResponse
/// This is necessary because of Rust's orphan rules - we can't implement
/// IntoResponse (external trait) for AppError (external type from mediasan-core)
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<anyhow::Error> for HttpAppError {
    fn from(err: anyhow::Error) -> Self {
        HttpAppError(AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        })
    }
}

impl From<PipelineError> for HttpAppError {
    fn from(err: PipelineError) -> Self {
        HttpAppError(err.into())
    }
}

/// Requests that are not a readable multipart body are the client's fault.
impl From<MultipartRejection> for HttpAppError {
    fn from(rejection: MultipartRejection) -> Self {
        HttpAppError(AppError::InvalidInput(format!(
            "Invalid multipart request: {}",
            rejection.body_text()
        )))
    }
}

fn log_error(error: &AppError) {
    let error_type = error.error_type();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_type = error_type, "Request rejected");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_type = error_type, "Request rejected");
        }
        LogLevel::Error => {
            tracing::error!(
                error = %error,
                error_type = error_type,
                details = %error.detailed_message(),
                "Request failed"
            );
        }
    }
}

fn is_production_env() -> bool {
    std::env::var("ENVIRONMENT")
        .or_else(|_| std::env::var("APP_ENV"))
        .map(|env| env.to_lowercase() == "production" || env.to_lowercase() == "prod")
        .unwrap_or(false)
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let app_error = &self.0;

        let status = StatusCode::from_u16(app_error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        log_error(app_error);

        // Encoder output and filesystem paths stay in the logs.
        let body = if is_production_env() || app_error.is_sensitive() {
            ErrorResponse {
                message: app_error.client_message(),
                code: app_error.error_code().to_string(),
                details: None,
                error_type: None,
            }
        } else {
            ErrorResponse {
                message: app_error.client_message(),
                code: app_error.error_code().to_string(),
                details: Some(app_error.detailed_message()),
                error_type: Some(app_error.error_type().to_string()),
            }
        };

        (status, Json(body)).into_response()
    }
}
