//! Upload pipeline
//!
//! Validation gates sanitization: a rejected candidate is returned as-is and
//! never reaches the sanitizer or the filesystem.

use mediasan_core::{AppError, Config, FormatVerdict, SanitizedArtifact, UploadCandidate};
use std::sync::Arc;

use crate::sanitizer::{MediaSanitizer, SanitizeError};
use crate::validator::{UploadValidator, ValidationError};

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Rejected(#[from] ValidationError),

    #[error(transparent)]
    Sanitize(#[from] SanitizeError),
}

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::Rejected(e) => e.into(),
            PipelineError::Sanitize(e) => e.into(),
        }
    }
}

/// Result of a successful pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub detected: FormatVerdict,
    pub artifact: SanitizedArtifact,
}

#[derive(Clone)]
pub struct UploadPipeline {
    validator: UploadValidator,
    sanitizer: Arc<MediaSanitizer>,
}

impl UploadPipeline {
    pub fn new(validator: UploadValidator, sanitizer: Arc<MediaSanitizer>) -> Self {
        Self {
            validator,
            sanitizer,
        }
    }

    /// Pipeline with the default backends for the given configuration.
    pub fn from_config(config: &Config) -> Self {
        let validator = UploadValidator::new(
            config.sanitizer.max_file_size_bytes,
            config.sanitizer.type_match_policy,
        );
        let sanitizer = Arc::new(MediaSanitizer::from_settings(&config.sanitizer));
        Self::new(validator, sanitizer)
    }

    pub fn validator(&self) -> &UploadValidator {
        &self.validator
    }

    pub fn sanitizer(&self) -> &MediaSanitizer {
        &self.sanitizer
    }

    pub async fn run(&self, candidate: &UploadCandidate) -> Result<PipelineOutcome, PipelineError> {
        let detected = self.validator.validate(candidate).map_err(|e| {
            tracing::debug!(
                original_filename = %candidate.original_filename,
                content_type = %candidate.content_type,
                error = %e,
                "Upload rejected"
            );
            e
        })?;

        let artifact = self.sanitizer.sanitize(candidate).await?;

        Ok(PipelineOutcome { detected, artifact })
    }
}
