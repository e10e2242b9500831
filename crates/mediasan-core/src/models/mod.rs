//! Data models for the upload pipeline
//!
//! `media` holds the closed classifications (declared category, detected
//! format); `upload` holds the values that flow through the pipeline.

mod media;
mod upload;

pub use media::{FormatVerdict, MediaCategory, ALLOWED_CONTENT_TYPES};
pub use upload::{SanitizedArtifact, UploadCandidate};
