//! Media sanitizer
//!
//! Re-encodes validated uploads into one canonical format per category:
//! images become PNG, video becomes H.264/AAC MP4 and audio becomes MP3.
//! Nothing from the original container survives except decoded media.
//!
//! Audio and video are staged to a uniquely named temp file first, since the
//! encoder works on paths. Output is written next to its final location under
//! a hidden `.partial-` name and renamed into place only once complete.

use anyhow::{anyhow, Context};
use mediasan_core::{MediaCategory, SanitizedArtifact, SanitizerSettings, UploadCandidate};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tempfile::{Builder, NamedTempFile};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::backend::{AvTranscoder, FfmpegTranscoder, ImageReencoder, PngReencoder, TranscodeProfile};
use mediasan_core::AppError;

const TEMP_INPUT_PREFIX: &str = "temp_";
const PARTIAL_OUTPUT_PREFIX: &str = ".partial-";
const MAX_BASE_NAME_LEN: usize = 128;
const FALLBACK_BASE_NAME: &str = "file";

#[derive(Debug, thiserror::Error)]
pub enum SanitizeError {
    /// Declared type has no category; validation should already have refused it.
    #[error("No sanitizer for declared type: {0}")]
    UnsupportedDeclaredType(String),

    #[error("{category} transcode failed for {original_filename}")]
    TranscodeFailure {
        category: MediaCategory,
        original_filename: String,
        #[source]
        source: anyhow::Error,
    },
}

impl From<SanitizeError> for AppError {
    fn from(err: SanitizeError) -> Self {
        match err {
            SanitizeError::UnsupportedDeclaredType(ct) => AppError::UnsupportedMediaCategory(ct),
            SanitizeError::TranscodeFailure {
                category,
                original_filename,
                source,
            } => AppError::TranscodeFailure {
                original_filename,
                category: category.to_string(),
                source,
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct SanitizerConfig {
    pub output_dir: PathBuf,
    pub temp_dir: PathBuf,
    pub unique_output_names: bool,
    pub transcode_timeout: Duration,
    pub max_concurrent_transcodes: usize,
}

impl SanitizerConfig {
    pub fn new(output_dir: impl Into<PathBuf>, temp_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            temp_dir: temp_dir.into(),
            unique_output_names: false,
            transcode_timeout: Duration::from_secs(120),
            max_concurrent_transcodes: 2,
        }
    }
}

impl From<&SanitizerSettings> for SanitizerConfig {
    fn from(settings: &SanitizerSettings) -> Self {
        Self {
            output_dir: settings.sanitized_dir.clone(),
            temp_dir: settings.temp_dir.clone(),
            unique_output_names: settings.unique_output_names,
            transcode_timeout: settings.transcode_timeout,
            max_concurrent_transcodes: settings.max_concurrent_transcodes,
        }
    }
}

pub struct MediaSanitizer {
    config: SanitizerConfig,
    image: Arc<dyn ImageReencoder>,
    av: Arc<dyn AvTranscoder>,
    permits: Arc<Semaphore>,
}

impl MediaSanitizer {
    pub fn new(
        config: SanitizerConfig,
        image: Arc<dyn ImageReencoder>,
        av: Arc<dyn AvTranscoder>,
    ) -> Self {
        let permits = Arc::new(Semaphore::new(config.max_concurrent_transcodes.max(1)));
        Self {
            config,
            image,
            av,
            permits,
        }
    }

    /// Sanitizer wired to the `image` crate and the configured ffmpeg binary.
    pub fn from_settings(settings: &SanitizerSettings) -> Self {
        let image = Arc::new(PngReencoder::new(settings.max_image_dimension));
        let av = Arc::new(
            FfmpegTranscoder::new(settings.ffmpeg_path.clone()).with_debug(settings.debug_ffmpeg),
        );
        Self::new(SanitizerConfig::from(settings), image, av)
    }

    pub fn config(&self) -> &SanitizerConfig {
        &self.config
    }

    /// Create the output and temp directories if they do not exist.
    pub async fn prepare(&self) -> anyhow::Result<()> {
        for dir in [&self.config.output_dir, &self.config.temp_dir] {
            tokio::fs::create_dir_all(dir)
                .await
                .with_context(|| format!("Failed to create directory {}", dir.display()))?;
        }
        Ok(())
    }

    /// Re-encode a validated upload into its category's canonical format.
    #[tracing::instrument(
        skip(self, candidate),
        fields(
            original_filename = %candidate.original_filename,
            content_type = %candidate.content_type,
            size = candidate.size
        )
    )]
    pub async fn sanitize(
        &self,
        candidate: &UploadCandidate,
    ) -> Result<SanitizedArtifact, SanitizeError> {
        let category = MediaCategory::from_content_type(&candidate.content_type)
            .ok_or_else(|| SanitizeError::UnsupportedDeclaredType(candidate.content_type.clone()))?;

        let output_path = self.output_path(&candidate.original_filename, category);

        let result = match category {
            MediaCategory::Image => self.sanitize_image(candidate, &output_path).await,
            MediaCategory::Video | MediaCategory::Audio => {
                self.sanitize_av(candidate, category, &output_path).await
            }
        };

        match result {
            Ok(bytes_written) => {
                tracing::debug!(
                    path = %output_path.display(),
                    bytes_written,
                    "Sanitized output written"
                );
                Ok(SanitizedArtifact {
                    path: output_path,
                    category,
                    extension: category.canonical_extension(),
                    bytes_written,
                })
            }
            Err(source) => Err(SanitizeError::TranscodeFailure {
                category,
                original_filename: candidate.original_filename.clone(),
                source,
            }),
        }
    }

    /// Canonical output path for an upload.
    pub fn output_path(&self, original_filename: &str, category: MediaCategory) -> PathBuf {
        let mut base = output_base_name(original_filename);
        if self.config.unique_output_names {
            base = format!("{}-{}", base, uuid::Uuid::new_v4());
        }
        self.config
            .output_dir
            .join(format!("{}.{}", base, category.canonical_extension()))
    }

    async fn sanitize_image(
        &self,
        candidate: &UploadCandidate,
        output_path: &Path,
    ) -> anyhow::Result<u64> {
        let permit = self.acquire_permit().await?;

        // Held by the blocking task, so a timed-out decode still occupies its slot.
        let image = Arc::clone(&self.image);
        let data = candidate.data.clone();
        let decode = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            image.reencode_png(&data)
        });

        let png = self
            .with_timeout(async move {
                decode
                    .await
                    .context("Image re-encode task panicked")
                    .and_then(|reencoded| reencoded)
            })
            .await?;

        let staged = self.stage_output(MediaCategory::Image.canonical_extension())?;
        tokio::fs::write(staged.path(), &png)
            .await
            .context("Failed to write sanitized image")?;
        persist(staged, output_path)?;

        Ok(png.len() as u64)
    }

    async fn sanitize_av(
        &self,
        candidate: &UploadCandidate,
        category: MediaCategory,
        output_path: &Path,
    ) -> anyhow::Result<u64> {
        let profile = TranscodeProfile::for_category(category)
            .ok_or_else(|| anyhow!("No transcode profile for {}", category))?;

        let _permit = self.acquire_permit().await?;

        // Removed on drop if anything below bails out early.
        let input = Builder::new()
            .prefix(TEMP_INPUT_PREFIX)
            .suffix(&format!(".{}", profile.extension()))
            .tempfile_in(&self.config.temp_dir)
            .with_context(|| {
                format!(
                    "Failed to create temp input in {}",
                    self.config.temp_dir.display()
                )
            })?;
        tokio::fs::write(input.path(), &candidate.data)
            .await
            .context("Failed to stage upload to temp file")?;

        let staged = self.stage_output(profile.extension())?;

        let outcome = self
            .with_timeout(self.av.transcode(input.path(), staged.path(), &profile))
            .await;

        let input_path = input.path().to_path_buf();
        let cleanup = input.close();
        if let Err(ref e) = cleanup {
            tracing::error!(
                path = %input_path.display(),
                error = %e,
                "Failed to remove staged temp input"
            );
        }

        outcome?;
        cleanup.with_context(|| format!("Failed to remove temp input {}", input_path.display()))?;

        let bytes_written = tokio::fs::metadata(staged.path())
            .await
            .context("Failed to stat transcoder output")?
            .len();
        if bytes_written == 0 {
            return Err(anyhow!("Transcoder produced an empty {} file", profile.extension()));
        }

        persist(staged, output_path)?;
        Ok(bytes_written)
    }

    fn stage_output(&self, extension: &str) -> anyhow::Result<NamedTempFile> {
        Builder::new()
            .prefix(PARTIAL_OUTPUT_PREFIX)
            .suffix(&format!(".{}", extension))
            .tempfile_in(&self.config.output_dir)
            .with_context(|| {
                format!(
                    "Failed to create staged output in {}",
                    self.config.output_dir.display()
                )
            })
    }

    async fn acquire_permit(&self) -> anyhow::Result<OwnedSemaphorePermit> {
        Arc::clone(&self.permits)
            .acquire_owned()
            .await
            .map_err(|_| anyhow!("Transcode limiter closed"))
    }

    async fn with_timeout<T, F>(&self, fut: F) -> anyhow::Result<T>
    where
        F: Future<Output = anyhow::Result<T>>,
    {
        tokio::time::timeout(self.config.transcode_timeout, fut)
            .await
            .map_err(|_| {
                anyhow!(
                    "Transcode timed out after {}s",
                    self.config.transcode_timeout.as_secs_f32()
                )
            })?
    }
}

fn persist(staged: NamedTempFile, output_path: &Path) -> anyhow::Result<()> {
    staged
        .persist(output_path)
        .map_err(|e| e.error)
        .with_context(|| format!("Failed to move output into {}", output_path.display()))?;
    Ok(())
}

/// Filesystem-safe base name derived from a client-supplied filename.
///
/// Keeps only the final path component, drops its extension, and replaces
/// everything outside `[A-Za-z0-9._-]`. Leading dots are removed so the
/// result can never be hidden, `.` or `..`.
pub fn output_base_name(original_filename: &str) -> String {
    let last = original_filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();

    let stem = match last.rfind('.') {
        Some(idx) if idx > 0 => &last[..idx],
        _ => last,
    };

    let cleaned: String = stem
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .take(MAX_BASE_NAME_LEN)
        .collect();

    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        FALLBACK_BASE_NAME.to_string()
    } else {
        cleaned.to_string()
    }
}
