//! Non-destructive filter stack.
//!
//! Filters are applied to RGBA pixel data, always starting from the
//! untouched source raster, so rebuilding the stack never accumulates.
//!
//! ## Filter Order
//! 1. Brightness
//! 2. Contrast
//! 3. Saturation
//! 4. Blur
//! 5. Grayscale
//! 6. Sepia
//! 7. Invert

use image::RgbaImage;
use serde::{Deserialize, Serialize};

use crate::FilterParams;

/// Blur sigma as a fraction of the longest image edge at `Blur(1.0)`.
const BLUR_SIGMA_PER_EDGE: f32 = 0.05;

/// Sigmas below this produce no visible change and are skipped.
const MIN_BLUR_SIGMA: f32 = 0.5;

/// A single pixel filter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "level", rename_all = "lowercase")]
pub enum Filter {
    /// Additive brightness shift (-1 to 1)
    Brightness(f32),
    /// Contrast around mid-gray (-1 to 1)
    Contrast(f32),
    /// Saturation relative to the strongest channel (-1 to 1)
    Saturation(f32),
    /// Blur strength (0 to 1), an almost-Gaussian box blur
    Blur(f32),
    Grayscale,
    Sepia,
    Invert,
}

/// Clamp a value into a range, treating NaN as the neutral value 0.
#[inline]
pub fn clamp_level(value: f32, min: f32, max: f32) -> f32 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(min, max)
}

/// Build the ordered filter stack for a set of control values.
///
/// Numeric levels are clamped to their documented ranges; entries at their
/// neutral value are omitted.
///
/// # Example
/// ```
/// use easel_core::{filters::{build_filter_stack, Filter}, FilterParams};
///
/// let mut params = FilterParams::default();
/// params.grayscale = true;
/// params.invert = true;
/// assert_eq!(build_filter_stack(&params), vec![Filter::Grayscale, Filter::Invert]);
/// ```
pub fn build_filter_stack(params: &FilterParams) -> Vec<Filter> {
    let params = params.clamped();
    let mut stack = Vec::new();

    if params.brightness != 0.0 {
        stack.push(Filter::Brightness(params.brightness));
    }
    if params.contrast != 0.0 {
        stack.push(Filter::Contrast(params.contrast));
    }
    if params.saturation != 0.0 {
        stack.push(Filter::Saturation(params.saturation));
    }
    if params.blur != 0.0 {
        stack.push(Filter::Blur(params.blur));
    }
    if params.grayscale {
        stack.push(Filter::Grayscale);
    }
    if params.sepia {
        stack.push(Filter::Sepia);
    }
    if params.invert {
        stack.push(Filter::Invert);
    }

    stack
}

/// Apply a filter stack to a source raster, returning a new raster.
///
/// The source is never modified. An empty stack returns an exact copy.
pub fn apply_filters(source: &RgbaImage, filters: &[Filter]) -> RgbaImage {
    let mut output = source.clone();

    for filter in filters {
        match *filter {
            Filter::Blur(level) => {
                let (w, h) = output.dimensions();
                let sigma = level * w.max(h) as f32 * BLUR_SIGMA_PER_EDGE;
                // Three box passes: cost is linear in pixels whatever the sigma
                if sigma >= MIN_BLUR_SIGMA {
                    output = image::imageops::fast_blur(&output, sigma);
                }
            }
            other => apply_pixel_filter(&mut output, other),
        }
    }

    output
}

/// Apply a per-pixel filter in place. Alpha is never modified.
fn apply_pixel_filter(raster: &mut RgbaImage, filter: Filter) {
    let contrast_factor = match filter {
        Filter::Contrast(level) => contrast_factor(level),
        _ => 1.0,
    };

    for chunk in raster.chunks_exact_mut(4) {
        let rgb = [chunk[0] as f32, chunk[1] as f32, chunk[2] as f32];

        let out = match filter {
            Filter::Brightness(level) => apply_brightness(rgb, level),
            Filter::Contrast(_) => apply_contrast(rgb, contrast_factor),
            Filter::Saturation(level) => apply_saturation(rgb, level),
            Filter::Grayscale => apply_grayscale(rgb),
            Filter::Sepia => apply_sepia(rgb),
            Filter::Invert => apply_invert(rgb),
            // Blur is a neighbourhood filter, handled in `apply_filters`
            Filter::Blur(_) => rgb,
        };

        chunk[0] = to_u8(out[0]);
        chunk[1] = to_u8(out[1]);
        chunk[2] = to_u8(out[2]);
    }
}

#[inline]
fn to_u8(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

/// Apply brightness.
///
/// Formula: `output = input + level * 255`
#[inline]
fn apply_brightness(rgb: [f32; 3], level: f32) -> [f32; 3] {
    let shift = (level * 255.0).round();
    [rgb[0] + shift, rgb[1] + shift, rgb[2] + shift]
}

/// Contrast multiplier for a level in [-1, 1].
///
/// Formula: `f = 259 (255k + 255) / (255 (259 - 255k))`
#[inline]
fn contrast_factor(level: f32) -> f32 {
    let k = level * 255.0;
    (259.0 * (k + 255.0)) / (255.0 * (259.0 - k))
}

/// Apply contrast around the 8-bit midpoint 128.
#[inline]
fn apply_contrast(rgb: [f32; 3], factor: f32) -> [f32; 3] {
    [
        factor * (rgb[0] - 128.0) + 128.0,
        factor * (rgb[1] - 128.0) + 128.0,
        factor * (rgb[2] - 128.0) + 128.0,
    ]
}

/// Apply saturation.
///
/// Each channel moves toward (negative level) or away from (positive level)
/// the strongest channel: `c + (max - c) * -level`.
#[inline]
fn apply_saturation(rgb: [f32; 3], level: f32) -> [f32; 3] {
    let adjust = -level;
    let max = rgb[0].max(rgb[1]).max(rgb[2]);
    [
        rgb[0] + (max - rgb[0]) * adjust,
        rgb[1] + (max - rgb[1]) * adjust,
        rgb[2] + (max - rgb[2]) * adjust,
    ]
}

/// Channel average.
#[inline]
fn apply_grayscale(rgb: [f32; 3]) -> [f32; 3] {
    let avg = (rgb[0] + rgb[1] + rgb[2]) / 3.0;
    [avg, avg, avg]
}

#[inline]
fn apply_sepia(rgb: [f32; 3]) -> [f32; 3] {
    let [r, g, b] = rgb;
    [
        0.393 * r + 0.769 * g + 0.189 * b,
        0.349 * r + 0.686 * g + 0.168 * b,
        0.272 * r + 0.534 * g + 0.131 * b,
    ]
}

#[inline]
fn apply_invert(rgb: [f32; 3]) -> [f32; 3] {
    [255.0 - rgb[0], 255.0 - rgb[1], 255.0 - rgb[2]]
}


// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use image::Rgba;
    use proptest::prelude::*;

    fn params_strategy() -> impl Strategy<Value = FilterParams> {
        (
            -2.0f32..=2.0,
            -2.0f32..=2.0,
            -2.0f32..=2.0,
            -0.5f32..=1.5,
            any::<bool>(),
            any::<bool>(),
            any::<bool>(),
        )
            .prop_map(
                |(brightness, contrast, saturation, blur, grayscale, sepia, invert)| {
                    FilterParams {
                        brightness,
                        contrast,
                        saturation,
                        blur,
                        grayscale,
                        sepia,
                        invert,
                    }
                },
            )
    }

    fn test_image() -> RgbaImage {
        RgbaImage::from_fn(12, 9, |x, y| {
            Rgba([(x * 21) as u8, (y * 28) as u8, ((x * y) % 256) as u8, 255])
        })
    }

    proptest! {
        /// Property: Rebuilding from the same params yields identical pixels.
        #[test]
        fn prop_filters_idempotent(params in params_strategy()) {
            let img = test_image();
            let once = apply_filters(&img, &build_filter_stack(&params));
            let twice = apply_filters(&img, &build_filter_stack(&params));
            prop_assert_eq!(once, twice);
        }

        /// Property: Stack never exceeds seven entries and never holds neutral levels.
        #[test]
        fn prop_stack_minimal(params in params_strategy()) {
            let stack = build_filter_stack(&params);
            prop_assert!(stack.len() <= 7);
            for filter in stack {
                match filter {
                    Filter::Brightness(v) | Filter::Contrast(v) | Filter::Saturation(v) => {
                        prop_assert!(v != 0.0 && (-1.0..=1.0).contains(&v));
                    }
                    Filter::Blur(v) => prop_assert!(v > 0.0 && v <= 1.0),
                    _ => {}
                }
            }
        }

        /// Property: Alpha channel is never modified by per-pixel filters.
        #[test]
        fn prop_alpha_preserved(alpha in 0u8..=255, invert in any::<bool>()) {
            let img = RgbaImage::from_pixel(3, 3, Rgba([90, 40, 200, alpha]));
            let mut params = FilterParams::default();
            params.brightness = 0.3;
            params.sepia = true;
            params.invert = invert;
            let out = apply_filters(&img, &build_filter_stack(&params));
            for p in out.pixels() {
                prop_assert_eq!(p[3], alpha);
            }
        }
    }
}
