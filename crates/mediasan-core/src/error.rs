//! Error types module
//!
//! All failures an upload can end in are unified under [`AppError`]. Each
//! variant self-describes how it is presented over HTTP through
//! [`ErrorMetadata`], so the API layer never decides status codes or
//! client-facing wording on its own.

use std::io;

use crate::models::FormatVerdict;

/// Client-facing message for every sanitizer-stage failure.
pub const SANITIZE_FAILED_MESSAGE: &str = "File sanitization failed";

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for rejected uploads worth noticing
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "FILE_TOO_LARGE")
    fn error_code(&self) -> &'static str;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether internal details must stay out of the response body
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Unsupported declared type: {0}")]
    UnsupportedDeclaredType(String),

    #[error("File too large: {size} bytes (max: {max} bytes)")]
    SizeExceeded { size: usize, max: usize },

    #[error("Content signature mismatch: declared {declared}, detected {detected}")]
    ContentSignatureMismatch {
        declared: String,
        detected: FormatVerdict,
    },

    /// A category the sanitizer cannot handle reached it after validation.
    #[error("No sanitizer for declared type: {0}")]
    UnsupportedMediaCategory(String),

    #[error("Transcode failed for {original_filename} ({category})")]
    TranscodeFailure {
        original_filename: String,
        category: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

/// Static metadata for each variant: (http_status, error_code, sensitive, log_level).
fn app_error_static_metadata(err: &AppError) -> (u16, &'static str, bool, LogLevel) {
    match err {
        AppError::UnsupportedDeclaredType(_) => {
            (400, "UNSUPPORTED_FILE_TYPE", false, LogLevel::Debug)
        }
        AppError::SizeExceeded { .. } => (400, "FILE_TOO_LARGE", false, LogLevel::Debug),
        AppError::ContentSignatureMismatch { .. } => {
            (400, "CONTENT_SIGNATURE_MISMATCH", false, LogLevel::Warn)
        }
        AppError::UnsupportedMediaCategory(_) => {
            (500, "UNSUPPORTED_MEDIA_CATEGORY", true, LogLevel::Error)
        }
        AppError::TranscodeFailure { .. } => (500, "TRANSCODE_FAILED", true, LogLevel::Error),
        AppError::InvalidInput(_) => (400, "INVALID_INPUT", false, LogLevel::Debug),
        AppError::Internal(_) => (500, "INTERNAL_ERROR", true, LogLevel::Error),
        AppError::InternalWithSource { .. } => (500, "INTERNAL_ERROR", true, LogLevel::Error),
    }
}

impl AppError {
    /// Get the error type name for log fields
    pub fn error_type(&self) -> &'static str {
        match self {
            AppError::UnsupportedDeclaredType(_) => "UnsupportedDeclaredType",
            AppError::SizeExceeded { .. } => "SizeExceeded",
            AppError::ContentSignatureMismatch { .. } => "ContentSignatureMismatch",
            AppError::UnsupportedMediaCategory(_) => "UnsupportedMediaCategory",
            AppError::TranscodeFailure { .. } => "TranscodeFailure",
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::Internal(_) | AppError::InternalWithSource { .. } => "Internal",
        }
    }

    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).3
    }

    fn client_message(&self) -> String {
        match self {
            AppError::UnsupportedDeclaredType(_) => {
                "Invalid file type. Only JPG, PNG, GIF, MP4, and MPEG are allowed.".to_string()
            }
            AppError::SizeExceeded { max, .. } => format!(
                "File size exceeds the limit of {}MB.",
                max.div_ceil(1024 * 1024)
            ),
            AppError::ContentSignatureMismatch { .. } => {
                "Invalid file content according to byte check".to_string()
            }
            AppError::UnsupportedMediaCategory(_) | AppError::TranscodeFailure { .. } => {
                SANITIZE_FAILED_MESSAGE.to_string()
            }
            AppError::InvalidInput(msg) => msg.clone(),
            AppError::Internal(_) | AppError::InternalWithSource { .. } => {
                "Internal server error".to_string()
            }
        }
    }
}
