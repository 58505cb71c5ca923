//! Raster encoding for export.
//!
//! Supports PNG (lossless, quality ignored), JPEG (quality mapped to the
//! encoder's 1-100 scale) and WebP. The `image` crate only ships a lossless
//! WebP encoder, so WebP output ignores quality as well.

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::codecs::webp::WebPEncoder;
use image::{ExtendedColorType, ImageEncoder, RgbaImage};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lowest accepted export quality.
pub const MIN_QUALITY: f32 = 0.5;

/// Highest accepted export quality.
pub const MAX_QUALITY: f32 = 1.0;

/// Errors that can occur during encoding.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Width or height is zero
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    /// The encoder rejected the raster
    #[error("{format} encoding failed: {message}")]
    EncodingFailed {
        format: ExportFormat,
        message: String,
    },
}

/// Output formats offered by the export encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Png,
    Jpeg,
    WebP,
}

impl ExportFormat {
    /// File extension, also used in the artifact name.
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpeg => "jpeg",
            ExportFormat::WebP => "webp",
        }
    }

    /// MIME type of the encoded bytes.
    pub fn mime(self) -> &'static str {
        match self {
            ExportFormat::Png => "image/png",
            ExportFormat::Jpeg => "image/jpeg",
            ExportFormat::WebP => "image/webp",
        }
    }

    /// Parse a format name as used by the front end (`png`, `jpeg`/`jpg`, `webp`).
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "png" => Some(ExportFormat::Png),
            "jpeg" | "jpg" => Some(ExportFormat::Jpeg),
            "webp" => Some(ExportFormat::WebP),
            _ => None,
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

/// Clamp an export quality into `[MIN_QUALITY, MAX_QUALITY]`.
///
/// NaN maps to the highest quality.
pub fn clamp_quality(quality: f32) -> f32 {
    if quality.is_nan() {
        return MAX_QUALITY;
    }
    quality.clamp(MIN_QUALITY, MAX_QUALITY)
}

/// Map a `[0.5, 1.0]` quality onto the JPEG encoder's 1-100 scale.
pub fn jpeg_quality(quality: f32) -> u8 {
    ((clamp_quality(quality) * 100.0).round() as u8).clamp(1, 100)
}

/// Encode an RGBA raster in the requested format.
///
/// # Arguments
///
/// * `raster` - Composited RGBA pixels
/// * `format` - Output format
/// * `quality` - Export quality; clamped into `[0.5, 1.0]`, used only for JPEG
///
/// # Errors
///
/// Returns `EncodeError::InvalidDimensions` for an empty raster and
/// `EncodeError::EncodingFailed` if the codec fails.
pub fn encode_raster(
    raster: &RgbaImage,
    format: ExportFormat,
    quality: f32,
) -> Result<Vec<u8>, EncodeError> {
    let (width, height) = raster.dimensions();
    if width == 0 || height == 0 {
        return Err(EncodeError::InvalidDimensions { width, height });
    }

    let mut buffer = Vec::new();
    let failed = |e: image::ImageError| EncodeError::EncodingFailed {
        format,
        message: e.to_string(),
    };

    match format {
        ExportFormat::Png => PngEncoder::new(&mut buffer)
            .write_image(raster.as_raw(), width, height, ExtendedColorType::Rgba8)
            .map_err(failed)?,
        ExportFormat::Jpeg => {
            let rgb = flatten_alpha(raster, [255, 255, 255]);
            JpegEncoder::new_with_quality(&mut buffer, jpeg_quality(quality))
                .write_image(&rgb, width, height, ExtendedColorType::Rgb8)
                .map_err(failed)?
        }
        ExportFormat::WebP => WebPEncoder::new_lossless(&mut buffer)
            .write_image(raster.as_raw(), width, height, ExtendedColorType::Rgba8)
            .map_err(failed)?,
    }

    tracing::debug!(%format, width, height, bytes = buffer.len(), "Encoded raster");
    Ok(buffer)
}

/// Composite RGBA pixels over an opaque matte colour and drop the alpha channel.
fn flatten_alpha(raster: &RgbaImage, matte: [u8; 3]) -> Vec<u8> {
    let mut rgb = Vec::with_capacity(raster.as_raw().len() / 4 * 3);
    for chunk in raster.as_raw().chunks_exact(4) {
        let alpha = chunk[3] as u32;
        for c in 0..3 {
            let v = (chunk[c] as u32 * alpha + matte[c] as u32 * (255 - alpha) + 127) / 255;
            rgb.push(v as u8);
        }
    }
    rgb
}
