//! Still-image encoding of finished canvases.

use crate::util::{FrameFitError, FrameFitResult};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{DynamicImage, ExtendedColorType, ImageEncoder, RgbaImage};
use serde::{Deserialize, Serialize};

/// Default JPEG quality, on the 1..=100 scale.
pub const DEFAULT_JPEG_QUALITY: u8 = 92;

/// Encoded output format.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum OutputFormat {
    /// Lossy JPEG; alpha is dropped.
    Jpeg { quality: u8 },
    /// Lossless PNG with alpha.
    Png,
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::Jpeg {
            quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

impl OutputFormat {
    /// Conventional file extension.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Jpeg { .. } => "jpg",
            Self::Png => "png",
        }
    }

    /// MIME type for transport.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Jpeg { .. } => "image/jpeg",
            Self::Png => "image/png",
        }
    }
}

/// A flattened, encoded composite.
#[derive(Clone, Debug, PartialEq)]
pub struct CompositeImage {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub format: OutputFormat,
}

pub(crate) fn encode(canvas: RgbaImage, format: OutputFormat) -> FrameFitResult<CompositeImage> {
    let (width, height) = canvas.dimensions();
    let mut bytes = Vec::new();
    let result = match format {
        OutputFormat::Jpeg { quality } => {
            let rgb = DynamicImage::ImageRgba8(canvas).to_rgb8();
            JpegEncoder::new_with_quality(&mut bytes, quality.clamp(1, 100)).encode_image(&rgb)
        }
        OutputFormat::Png => PngEncoder::new(&mut bytes).write_image(
            canvas.as_raw(),
            width,
            height,
            ExtendedColorType::Rgba8,
        ),
    };
    result.map_err(|err| FrameFitError::Encode {
        reason: err.to_string(),
    })?;
    Ok(CompositeImage {
        bytes,
        width,
        height,
        format,
    })
}
