use bytes::Bytes;
use serde::Serialize;
use std::path::PathBuf;

use super::media::MediaCategory;

/// A single uploaded file, fully buffered in memory.
///
/// Built once per request from the multipart body and never mutated.
#[derive(Clone, Debug)]
pub struct UploadCandidate {
    pub data: Bytes,
    /// MIME type declared by the client; not trusted.
    pub content_type: String,
    /// Declared size in bytes.
    pub size: usize,
    pub original_filename: String,
}

impl UploadCandidate {
    /// Candidate whose declared size is the buffer length.
    pub fn new(
        data: impl Into<Bytes>,
        content_type: impl Into<String>,
        original_filename: impl Into<String>,
    ) -> Self {
        let data = data.into();
        Self {
            size: data.len(),
            data,
            content_type: content_type.into(),
            original_filename: original_filename.into(),
        }
    }
}

/// A re-encoded file written to the sanitized output directory.
#[derive(Clone, Debug, Serialize)]
pub struct SanitizedArtifact {
    pub path: PathBuf,
    pub category: MediaCategory,
    pub extension: &'static str,
    pub bytes_written: u64,
}

impl SanitizedArtifact {
    /// File name component of the output path.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}
