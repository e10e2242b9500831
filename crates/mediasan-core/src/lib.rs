//! Mediasan Core Library
//!
//! This crate provides the domain models, error types and configuration shared
//! by the processing pipeline and the HTTP surface.

pub mod config;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use config::{BaseConfig, Config, SanitizerSettings, TypeMatchPolicy};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{FormatVerdict, MediaCategory, SanitizedArtifact, UploadCandidate};
