//! Raster resizing used when an image is snapshotted at its displayed size.
//!
//! All functions return new rasters without modifying the input.

use image::RgbaImage;

use super::{DecodeError, FilterType};

/// Resize a raster to exact dimensions.
///
/// # Arguments
///
/// * `image` - The source raster
/// * `width` - Target width in pixels
/// * `height` - Target height in pixels
/// * `filter` - Interpolation filter to use
///
/// # Errors
///
/// Returns `DecodeError::EmptyImage` if either target dimension is zero.
pub fn resize(
    image: &RgbaImage,
    width: u32,
    height: u32,
    filter: FilterType,
) -> Result<RgbaImage, DecodeError> {
    if width == 0 || height == 0 {
        return Err(DecodeError::EmptyImage { width, height });
    }

    // Fast path: if dimensions match, just clone
    if image.dimensions() == (width, height) {
        return Ok(image.clone());
    }

    Ok(image::imageops::resize(
        image,
        width,
        height,
        filter.to_image_filter(),
    ))
}

/// Dimensions of a `width x height` raster drawn at the given scale.
///
/// Rounds to whole pixels and never returns a zero dimension.
pub fn scaled_dimensions(width: u32, height: u32, scale_x: f64, scale_y: f64) -> (u32, u32) {
    let w = (width as f64 * scale_x.abs()).round();
    let h = (height as f64 * scale_y.abs()).round();
    let w = if w.is_finite() { w.max(1.0) as u32 } else { 1 };
    let h = if h.is_finite() { h.max(1.0) as u32 } else { 1 };
    (w, h)
}
