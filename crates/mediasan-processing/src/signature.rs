//! Magic-byte format detection.
//!
//! Checks run in a fixed priority order (MP3, MP4, JPEG, PNG, GIF) and the
//! first match wins, so a polyglot buffer always gets the same verdict.

use mediasan_core::FormatVerdict;

const PNG_SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
const BOX_HEADER_LEN: usize = 8;
const LARGE_BOX_HEADER_LEN: usize = 16;

/// Identify the format of `data` from its structural signature.
pub fn detect(data: &[u8]) -> FormatVerdict {
    if is_mp3(data) {
        FormatVerdict::Mp3
    } else if is_mp4(data) {
        FormatVerdict::Mp4
    } else if is_jpeg(data) {
        FormatVerdict::Jpeg
    } else if is_png(data) {
        FormatVerdict::Png
    } else if is_gif(data) {
        FormatVerdict::Gif
    } else {
        FormatVerdict::Unrecognized
    }
}

/// ID3v2 tag or an MPEG audio frame sync at offset 0.
pub fn is_mp3(data: &[u8]) -> bool {
    let id3 = data.len() > 3 && &data[..3] == b"ID3";
    let frame_sync = data.len() > 4 && data[0] == 0xFF && (data[1] & 0xE0) == 0xE0;
    id3 || frame_sync
}

/// `ftyp` as the first box type and a `moov` box somewhere in the top-level chain.
pub fn is_mp4(data: &[u8]) -> bool {
    data.len() >= 12 && &data[4..8] == b"ftyp" && has_moov_box(data)
}

/// Walk top-level ISO-BMFF boxes looking for `moov`.
///
/// Every step advances by at least one box header, so the walk ends after at
/// most `len / 8` iterations. A size that cannot advance (0, 2..=7, or a
/// 64-bit size below 16) or that overflows stops the walk.
pub fn has_moov_box(data: &[u8]) -> bool {
    let mut offset = 0usize;

    while let Some(header_end) = offset.checked_add(BOX_HEADER_LEN) {
        if header_end > data.len() {
            break;
        }

        let size = u32::from_be_bytes([
            data[offset],
            data[offset + 1],
            data[offset + 2],
            data[offset + 3],
        ]);
        if &data[offset + 4..header_end] == b"moov" {
            return true;
        }

        let box_len = match size {
            1 => match read_large_size(data, offset) {
                Some(large) if large >= LARGE_BOX_HEADER_LEN as u64 => large,
                _ => return false,
            },
            0 | 2..=7 => return false,
            n => u64::from(n),
        };

        offset = match usize::try_from(box_len)
            .ok()
            .and_then(|len| offset.checked_add(len))
        {
            Some(next) => next,
            None => return false,
        };
    }

    false
}

fn read_large_size(data: &[u8], offset: usize) -> Option<u64> {
    let start = offset.checked_add(BOX_HEADER_LEN)?;
    let end = offset.checked_add(LARGE_BOX_HEADER_LEN)?;
    let bytes: [u8; 8] = data.get(start..end)?.try_into().ok()?;
    Some(u64::from_be_bytes(bytes))
}

/// SOI at the start and EOI at the end; the middle is not inspected.
pub fn is_jpeg(data: &[u8]) -> bool {
    data.len() > 2 && data[..2] == [0xFF, 0xD8] && data[data.len() - 2..] == [0xFF, 0xD9]
}

pub fn is_png(data: &[u8]) -> bool {
    data.len() > 8 && data[..8] == PNG_SIGNATURE
}

pub fn is_gif(data: &[u8]) -> bool {
    data.len() > 6 && (&data[..6] == b"GIF87a" || &data[..6] == b"GIF89a")
}
