//! Raster decoding for PNG, JPEG and WebP input.

use std::io::Cursor;

use image::{ImageReader, RgbaImage};

use super::{DecodeError, SourceFormat};

/// Detect which accepted format a byte stream holds.
///
/// # Errors
///
/// Returns `DecodeError::InvalidFormat` if the magic bytes are not recognized
/// and `DecodeError::UnsupportedFormat` for recognized but rejected formats.
pub fn detect_format(bytes: &[u8]) -> Result<SourceFormat, DecodeError> {
    let format = image::guess_format(bytes).map_err(|_| DecodeError::InvalidFormat)?;
    SourceFormat::from_image_format(format)
        .ok_or_else(|| DecodeError::UnsupportedFormat(format!("{format:?}").to_lowercase()))
}

/// Decode PNG, JPEG or WebP bytes into an RGBA raster.
///
/// # Arguments
///
/// * `bytes` - Raw file bytes
///
/// # Returns
///
/// The decoded raster at its natural size, converted to 8-bit RGBA.
///
/// # Errors
///
/// Returns `DecodeError::UnsupportedFormat` for anything other than the three
/// accepted formats and `DecodeError::CorruptedFile` if decoding fails.
pub fn decode_image(bytes: &[u8]) -> Result<RgbaImage, DecodeError> {
    let format = detect_format(bytes)?;

    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;

    let img = reader
        .decode()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;

    let rgba = img.into_rgba8();
    if rgba.width() == 0 || rgba.height() == 0 {
        return Err(DecodeError::EmptyImage {
            width: rgba.width(),
            height: rgba.height(),
        });
    }

    tracing::debug!(
        ?format,
        width = rgba.width(),
        height = rgba.height(),
        "Decoded source image"
    );
    Ok(rgba)
}
