//! Pixel-accurate extraction of a canvas-space box from a rendered raster.
//!
//! # Coordinate System
//!
//! - Box coordinates are canvas pixels, origin at the top-left corner
//! - Fractional coordinates are rounded to the nearest pixel
//! - The box origin is clamped into `[0, dimension)`, the far edge to the
//!   raster bounds, so boxes past an edge are truncated to the visible part

use image::RgbaImage;
use serde::{Deserialize, Serialize};

/// Axis-aligned box in canvas pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropBox {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

/// A crop box resolved to whole pixels inside a raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CropBox {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Resolve the box to pixels inside a `raster_width x raster_height` raster.
    ///
    /// The result always lies within the raster and is at least 1x1.
    pub fn to_pixels(&self, raster_width: u32, raster_height: u32) -> PixelRect {
        let (x, width) = resolve_axis(self.left, self.width, raster_width);
        let (y, height) = resolve_axis(self.top, self.height, raster_height);
        PixelRect {
            x,
            y,
            width,
            height,
        }
    }
}

/// Resolve one axis: returns `(start, length)` with `length >= 1`.
fn resolve_axis(origin: f64, extent: f64, limit: u32) -> (u32, u32) {
    let limit = limit.max(1) as i64;
    let origin = finite_round(origin);
    let extent = finite_round(extent).max(0);

    let start = origin.clamp(0, limit - 1);
    let end = origin.saturating_add(extent).min(limit);
    let length = (end - start).max(1);

    (start as u32, length as u32)
}

fn finite_round(v: f64) -> i64 {
    if v.is_finite() {
        v.round() as i64
    } else {
        0
    }
}

/// Extract a canvas-space box from a raster.
///
/// # Arguments
///
/// * `raster` - Rendered scene, sized to the viewport
/// * `crop` - Box in canvas pixel coordinates
///
/// # Returns
///
/// A new raster holding exactly the pixels inside the box.
///
/// # Behavior
///
/// - A box fully inside produces `round(width) x round(height)` pixels
/// - A box partly outside is truncated to the visible intersection
/// - Minimum output dimension is 1x1 pixels
///
/// # Example
///
/// ```
/// use easel_core::transform::{crop_raster, CropBox};
///
/// let raster = image::RgbaImage::new(800, 450);
/// let cropped = crop_raster(&raster, CropBox::new(40.0, 40.0, 300.0, 200.0));
/// assert_eq!(cropped.dimensions(), (300, 200));
/// ```
pub fn crop_raster(raster: &RgbaImage, crop: CropBox) -> RgbaImage {
    let rect = crop.to_pixels(raster.width(), raster.height());

    // Fast path: full crop returns a clone
    if rect.x == 0 && rect.y == 0 && (rect.width, rect.height) == raster.dimensions() {
        return raster.clone();
    }

    let src_stride = raster.width() as usize * 4;
    let row_len = rect.width as usize * 4;
    let src = raster.as_raw();
    let mut output = Vec::with_capacity(row_len * rect.height as usize);

    // Copy pixel data row by row for efficiency
    for y in rect.y..rect.y + rect.height {
        let start = y as usize * src_stride + rect.x as usize * 4;
        output.extend_from_slice(&src[start..start + row_len]);
    }

    RgbaImage::from_raw(rect.width, rect.height, output)
        .unwrap_or_else(|| RgbaImage::new(rect.width, rect.height))
}


// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn dimensions_strategy() -> impl Strategy<Value = (u32, u32)> {
        (1u32..=120, 1u32..=120)
    }

    fn box_strategy() -> impl Strategy<Value = CropBox> {
        (-200.0f64..=300.0, -200.0f64..=300.0, 0.0f64..=400.0, 0.0f64..=400.0)
            .prop_map(|(l, t, w, h)| CropBox::new(l, t, w, h))
    }

    proptest! {
        /// Property: Output is never empty and never exceeds the raster.
        #[test]
        fn prop_output_bounded((width, height) in dimensions_strategy(), crop in box_strategy()) {
            let img = RgbaImage::new(width, height);
            let result = crop_raster(&img, crop);
            prop_assert!(result.width() >= 1 && result.height() >= 1);
            prop_assert!(result.width() <= width && result.height() <= height);
            prop_assert_eq!(result.as_raw().len(), (result.width() * result.height() * 4) as usize);
        }

        /// Property: Boxes fully inside produce round(w) x round(h) (minimum 1x1).
        #[test]
        fn prop_inside_box_exact(
            (width, height) in (50u32..=200, 50u32..=200),
            fx in 0.0f64..=0.5, fy in 0.0f64..=0.5,
            fw in 0.0f64..=0.5, fh in 0.0f64..=0.5,
        ) {
            let crop = CropBox::new(
                (fx * width as f64).floor(),
                (fy * height as f64).floor(),
                fw * width as f64,
                fh * height as f64,
            );
            let result = crop_raster(&RgbaImage::new(width, height), crop);
            prop_assert_eq!(result.width(), (crop.width.round() as u32).max(1));
            prop_assert_eq!(result.height(), (crop.height.round() as u32).max(1));
        }

        /// Property: Cropping is deterministic.
        #[test]
        fn prop_crop_is_deterministic((width, height) in dimensions_strategy(), crop in box_strategy()) {
            let img = RgbaImage::from_fn(width, height, |x, y| image::Rgba([x as u8, y as u8, 7, 255]));
            prop_assert_eq!(crop_raster(&img, crop), crop_raster(&img, crop));
        }
    }
}
