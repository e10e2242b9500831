use mediasan_core::models::ALLOWED_CONTENT_TYPES;
use mediasan_core::{AppError, FormatVerdict, MediaCategory, TypeMatchPolicy, UploadCandidate};

use crate::signature;

/// Reasons an upload is refused before any transcoding happens
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Unsupported declared type: {0}")]
    UnsupportedDeclaredType(String),

    #[error("File too large: {size} bytes (max: {max} bytes)")]
    SizeExceeded { size: usize, max: usize },

    #[error("Content signature mismatch: declared {declared}, detected {detected}")]
    ContentSignatureMismatch {
        declared: String,
        detected: FormatVerdict,
    },
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::UnsupportedDeclaredType(ct) => AppError::UnsupportedDeclaredType(ct),
            ValidationError::SizeExceeded { size, max } => AppError::SizeExceeded { size, max },
            ValidationError::ContentSignatureMismatch { declared, detected } => {
                AppError::ContentSignatureMismatch { declared, detected }
            }
        }
    }
}

/// Upload gatekeeper
///
/// Runs the declared-type, size and content checks in that order and stops at
/// the first failure. Pure and synchronous; never touches the filesystem.
#[derive(Debug, Clone)]
pub struct UploadValidator {
    max_file_size: usize,
    type_match_policy: TypeMatchPolicy,
}

impl UploadValidator {
    pub fn new(max_file_size: usize, type_match_policy: TypeMatchPolicy) -> Self {
        Self {
            max_file_size,
            type_match_policy,
        }
    }

    pub fn max_file_size(&self) -> usize {
        self.max_file_size
    }

    /// Validate a candidate, returning the format detected from its bytes.
    pub fn validate(&self, candidate: &UploadCandidate) -> Result<FormatVerdict, ValidationError> {
        let declared = self.validate_declared_type(&candidate.content_type)?;
        self.validate_size(candidate.size)?;
        let detected = self.validate_signature(&declared, &candidate.data)?;
        self.validate_type_match(&declared, detected)?;
        Ok(detected)
    }

    /// Check the declared MIME type against the allow-list. No case folding,
    /// trimming or parameter stripping: `image/png; x=y` is not `image/png`.
    pub fn validate_declared_type(&self, content_type: &str) -> Result<String, ValidationError> {
        if ALLOWED_CONTENT_TYPES.contains(&content_type) {
            Ok(content_type.to_string())
        } else {
            Err(ValidationError::UnsupportedDeclaredType(
                content_type.to_string(),
            ))
        }
    }

    pub fn validate_size(&self, size: usize) -> Result<(), ValidationError> {
        if size > self.max_file_size {
            return Err(ValidationError::SizeExceeded {
                size,
                max: self.max_file_size,
            });
        }
        Ok(())
    }

    fn validate_signature(
        &self,
        declared: &str,
        data: &[u8],
    ) -> Result<FormatVerdict, ValidationError> {
        match signature::detect(data) {
            FormatVerdict::Unrecognized => Err(ValidationError::ContentSignatureMismatch {
                declared: declared.to_string(),
                detected: FormatVerdict::Unrecognized,
            }),
            verdict => Ok(verdict),
        }
    }

    fn validate_type_match(
        &self,
        declared: &str,
        detected: FormatVerdict,
    ) -> Result<(), ValidationError> {
        let matches = match self.type_match_policy {
            TypeMatchPolicy::Exact => detected.mime_type() == Some(declared),
            TypeMatchPolicy::Category => {
                detected.category().is_some()
                    && detected.category() == MediaCategory::from_content_type(declared)
            }
            TypeMatchPolicy::Off => true,
        };

        if !matches {
            tracing::warn!(
                declared = %declared,
                detected = %detected,
                "Declared type does not match detected content"
            );
            return Err(ValidationError::ContentSignatureMismatch {
                declared: declared.to_string(),
                detected,
            });
        }

        Ok(())
    }
}
