//! Test fixtures: image, audio and video blobs.

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::io::Cursor;

fn encode(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x * 7 % 256) as u8, (y * 13 % 256) as u8, 200])
    });
    let mut buf = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut buf), format)
        .unwrap();
    buf
}

/// Real PNG that decodes cleanly.
pub fn create_test_png(width: u32, height: u32) -> Vec<u8> {
    encode(width, height, ImageFormat::Png)
}

/// Real baseline JPEG.
pub fn create_test_jpeg(width: u32, height: u32) -> Vec<u8> {
    encode(width, height, ImageFormat::Jpeg)
}

/// JPEG SOI/EOI markers around pseudo-random filler.
pub fn jpeg_markers_around_noise(len: usize) -> Vec<u8> {
    let mut state: u32 = 0x2545_F491;
    let mut data = vec![0xFF, 0xD8];
    for _ in 0..len {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        data.push((state & 0xFF) as u8);
    }
    data.extend_from_slice(&[0xFF, 0xD9]);
    data
}

/// PNG signature followed by zeros, `len` bytes in total.
pub fn png_signature_buffer(len: usize) -> Vec<u8> {
    let mut data = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
    data.resize(len, 0);
    data
}

/// PNG signature followed by bytes that are not valid chunks.
pub fn corrupt_png() -> Vec<u8> {
    let mut data = png_signature_buffer(8);
    data.extend_from_slice(&[0xAB; 256]);
    data
}

fn mp4_box(kind: &[u8; 4], payload: &[u8]) -> Vec<u8> {
    let mut out = ((payload.len() + 8) as u32).to_be_bytes().to_vec();
    out.extend_from_slice(kind);
    out.extend_from_slice(payload);
    out
}

/// `ftyp` + empty `moov`; structurally an MP4 with no media.
pub fn minimal_mp4() -> Vec<u8> {
    let mut data = mp4_box(b"ftyp", b"isom\0\0\x02\0isomiso2mp41");
    data.extend(mp4_box(b"moov", &[]));
    data
}

/// ID3v2 header followed by padding.
pub fn id3_audio() -> Vec<u8> {
    let mut data = b"ID3\x04\x00\x00\x00\x00\x00\x00".to_vec();
    data.resize(256, 0);
    data
}
