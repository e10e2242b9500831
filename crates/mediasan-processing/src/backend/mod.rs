//! Re-encoding backends used by the sanitizer.
//!
//! The sanitizer only talks to these traits, so tests can swap in fakes and
//! deployments can point at a different encoder binary.

mod ffmpeg;
mod png;

pub use self::ffmpeg::FfmpegTranscoder;
pub use self::png::PngReencoder;

use async_trait::async_trait;
use mediasan_core::MediaCategory;
use std::path::Path;

/// Decode an image buffer and re-encode it as PNG.
///
/// Synchronous and CPU bound; the sanitizer runs it on the blocking pool.
pub trait ImageReencoder: Send + Sync {
    fn reencode_png(&self, data: &[u8]) -> anyhow::Result<Vec<u8>>;
}

/// File-to-file audio/video transcoder.
#[async_trait]
pub trait AvTranscoder: Send + Sync {
    /// Transcode `input` into `output` according to `profile`.
    ///
    /// `output` may already exist (empty) and must be overwritten.
    async fn transcode(
        &self,
        input: &Path,
        output: &Path,
        profile: &TranscodeProfile,
    ) -> anyhow::Result<()>;
}

/// Target encoding for a file-based transcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranscodeProfile {
    /// H.264 video and AAC audio in an MP4 container
    Mp4H264Aac,
    /// MP3 audio only
    Mp3Lame,
}

impl TranscodeProfile {
    pub fn for_category(category: MediaCategory) -> Option<Self> {
        match category {
            MediaCategory::Video => Some(Self::Mp4H264Aac),
            MediaCategory::Audio => Some(Self::Mp3Lame),
            MediaCategory::Image => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Mp4H264Aac => "mp4",
            Self::Mp3Lame => "mp3",
        }
    }

    /// Demuxer forced on the staged input; matches the format detection accepted.
    pub fn input_format(self) -> &'static str {
        match self {
            Self::Mp4H264Aac => "mp4",
            Self::Mp3Lame => "mp3",
        }
    }

    /// Encoder arguments placed between the input and the output path.
    pub fn encoder_args(self) -> &'static [&'static str] {
        match self {
            Self::Mp4H264Aac => &["-c:v", "libx264", "-c:a", "aac", "-f", "mp4"],
            Self::Mp3Lame => &["-vn", "-c:a", "libmp3lame", "-f", "mp3"],
        }
    }
}
