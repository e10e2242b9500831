use anyhow::Context;
use image::{DynamicImage, ImageFormat, ImageReader, Limits};
use std::io::Cursor;

use super::ImageReencoder;

/// Re-encodes any decodable JPEG/PNG/GIF into a fresh PNG.
///
/// Only pixel data survives: ancillary chunks, EXIF, comments and trailing
/// bytes are dropped. Animated GIFs keep their first frame.
#[derive(Debug, Clone)]
pub struct PngReencoder {
    max_dimension: u32,
}

impl PngReencoder {
    pub fn new(max_dimension: u32) -> Self {
        Self { max_dimension }
    }

    fn decode(&self, data: &[u8]) -> anyhow::Result<DynamicImage> {
        let mut limits = Limits::default();
        limits.max_image_width = Some(self.max_dimension);
        limits.max_image_height = Some(self.max_dimension);

        let mut reader = ImageReader::new(Cursor::new(data))
            .with_guessed_format()
            .context("Failed to read image header")?;
        reader.limits(limits);
        reader.decode().context("Failed to decode image")
    }

    fn encode(img: &DynamicImage) -> anyhow::Result<Vec<u8>> {
        let mut out = Vec::new();
        img.write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
            .context("Failed to encode PNG")?;
        Ok(out)
    }
}

impl ImageReencoder for PngReencoder {
    fn reencode_png(&self, data: &[u8]) -> anyhow::Result<Vec<u8>> {
        let img = self.decode(data)?;
        Self::encode(&img)
    }
}
