use serde::{Deserialize, Serialize};
use std::fmt;

/// Declared MIME types accepted at the door, compared byte for byte.
pub const ALLOWED_CONTENT_TYPES: [&str; 5] = [
    "image/jpeg",
    "image/png",
    "image/gif",
    "video/mp4",
    "audio/mpeg",
];

/// Media category, derived from the declared MIME type prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaCategory {
    Image,
    Video,
    Audio,
}

impl MediaCategory {
    /// Classify a declared MIME type by its top-level prefix.
    ///
    /// Returns `None` for anything outside `image/`, `video/` and `audio/`;
    /// callers decide how to reject it.
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        match content_type.split_once('/') {
            Some(("image", subtype)) if !subtype.is_empty() => Some(Self::Image),
            Some(("video", subtype)) if !subtype.is_empty() => Some(Self::Video),
            Some(("audio", subtype)) if !subtype.is_empty() => Some(Self::Audio),
            _ => None,
        }
    }

    /// Extension of the canonical output format for this category.
    pub fn canonical_extension(self) -> &'static str {
        match self {
            Self::Image => "png",
            Self::Video => "mp4",
            Self::Audio => "mp3",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
            Self::Audio => "audio",
        }
    }
}

impl fmt::Display for MediaCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Format identified from the bytes of an upload.
///
/// Anything other than `Unrecognized` means the buffer carries that format's
/// structural signature; it says nothing about the rest of the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatVerdict {
    Jpeg,
    Png,
    Gif,
    Mp3,
    Mp4,
    Unrecognized,
}

impl FormatVerdict {
    /// MIME type a client should have declared for this format.
    pub fn mime_type(self) -> Option<&'static str> {
        match self {
            Self::Jpeg => Some("image/jpeg"),
            Self::Png => Some("image/png"),
            Self::Gif => Some("image/gif"),
            Self::Mp3 => Some("audio/mpeg"),
            Self::Mp4 => Some("video/mp4"),
            Self::Unrecognized => None,
        }
    }

    pub fn category(self) -> Option<MediaCategory> {
        match self {
            Self::Jpeg | Self::Png | Self::Gif => Some(MediaCategory::Image),
            Self::Mp3 => Some(MediaCategory::Audio),
            Self::Mp4 => Some(MediaCategory::Video),
            Self::Unrecognized => None,
        }
    }

    pub fn is_recognized(self) -> bool {
        !matches!(self, Self::Unrecognized)
    }
}

impl fmt::Display for FormatVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Jpeg => "JPEG",
            Self::Png => "PNG",
            Self::Gif => "GIF",
            Self::Mp3 => "MP3",
            Self::Mp4 => "MP4",
            Self::Unrecognized => "unrecognized",
        };
        f.write_str(name)
    }
}
