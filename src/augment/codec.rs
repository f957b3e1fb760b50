use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{DynamicImage, RgbaImage};
use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};

/// Encoding used for captured and augmented images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum OutputFormat {
    /// Lossy, `quality` in 1-100.
    Jpeg { quality: u8 },
    Png,
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::Jpeg { quality: 92 }
    }
}

impl OutputFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Jpeg { .. } => "image/jpeg",
            Self::Png => "image/png",
        }
    }
}

/// Encoded image bytes plus the dimensions they decode to.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedImage {
    pub bytes: Vec<u8>,
    pub format: OutputFormat,
    pub width: u32,
    pub height: u32,
}

impl EncodedImage {
    pub fn decode(&self) -> Result<RgbaImage> {
        decode(&self.bytes)
    }
}

/// Decode PNG or JPEG bytes into an RGBA buffer.
pub fn decode(bytes: &[u8]) -> Result<RgbaImage> {
    image::load_from_memory(bytes)
        .map(|img| img.to_rgba8())
        .map_err(PipelineError::Decode)
}

/// Encode an RGBA buffer. JPEG drops the alpha channel.
pub fn encode(image: &RgbaImage, format: OutputFormat) -> Result<EncodedImage> {
    let mut buf = Vec::new();
    match format {
        OutputFormat::Jpeg { quality } => {
            let rgb = DynamicImage::ImageRgba8(image.clone()).into_rgb8();
            let encoder = JpegEncoder::new_with_quality(&mut buf, quality.clamp(1, 100));
            rgb.write_with_encoder(encoder)
                .map_err(PipelineError::Encode)?;
        }
        OutputFormat::Png => {
            let encoder = PngEncoder::new(&mut buf);
            image
                .write_with_encoder(encoder)
                .map_err(PipelineError::Encode)?;
        }
    }
    Ok(EncodedImage {
        bytes: buf,
        format,
        width: image.width(),
        height: image.height(),
    })
}
