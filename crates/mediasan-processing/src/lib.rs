//! Content inspection and re-encoding for untrusted uploads.
//!
//! The flow is [`signature::detect`] → [`UploadValidator`] →
//! [`MediaSanitizer`], tied together by [`UploadPipeline`].

pub mod backend;
pub mod pipeline;
pub mod sanitizer;
pub mod signature;
pub mod validator;

pub use backend::{AvTranscoder, FfmpegTranscoder, ImageReencoder, PngReencoder, TranscodeProfile};
pub use pipeline::{PipelineError, PipelineOutcome, UploadPipeline};
pub use sanitizer::{MediaSanitizer, SanitizeError, SanitizerConfig};
pub use signature::detect;
pub use validator::{UploadValidator, ValidationError};
