//! Background matting capability.
//!
//! A matte takes a rendered raster and a foreground threshold and returns
//! the same raster with background pixels made transparent. The threshold
//! is a cutoff on the foreground probability: pixels scoring below it fade
//! out.
//!
//! Real segmentation models live outside this crate. [`BorderColorMatte`]
//! is a simple colour-distance matte for flat backgrounds and headless use.

use image::{Rgba, RgbaImage};
use thiserror::Error;

/// Errors raised by a matte.
#[derive(Debug, Error)]
pub enum MatteError {
    /// The matting backend reported a failure.
    #[error("Background removal failed: {0}")]
    Failed(String),

    /// The matte returned a raster with no pixels.
    #[error("Background removal returned an empty image")]
    EmptyResult,
}

/// Produces an alpha matte for a raster.
#[allow(async_fn_in_trait)]
pub trait Matte {
    async fn matte(&self, raster: RgbaImage, threshold: f32) -> Result<RgbaImage, MatteError>;
}

/// Adapts a synchronous function into a [`Matte`].
#[derive(Debug, Clone, Copy)]
pub struct FnMatte<F>(pub F);

impl<F> Matte for FnMatte<F>
where
    F: Fn(RgbaImage, f32) -> Result<RgbaImage, MatteError>,
{
    async fn matte(&self, raster: RgbaImage, threshold: f32) -> Result<RgbaImage, MatteError> {
        (self.0)(raster, threshold)
    }
}

/// Matte that treats the average border colour as background.
///
/// # Algorithm
///
/// 1. Average every pixel on the outer edge to get the background colour
/// 2. For each pixel, `score = clamp(distance / spread, 0, 1)` where
///    `distance` is the RGB distance to the background normalised to [0, 1]
/// 3. `alpha *= smoothstep(threshold - feather, threshold + feather, score)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BorderColorMatte {
    /// Normalised colour distance that counts as fully foreground.
    pub spread: f32,
    /// Half-width of the soft edge around the threshold.
    pub feather: f32,
}

impl Default for BorderColorMatte {
    fn default() -> Self {
        Self {
            spread: 0.3,
            feather: 0.1,
        }
    }
}

impl BorderColorMatte {
    /// Run the matte synchronously.
    pub fn apply(&self, mut raster: RgbaImage, threshold: f32) -> Result<RgbaImage, MatteError> {
        let (width, height) = raster.dimensions();
        if width == 0 || height == 0 {
            return Err(MatteError::EmptyResult);
        }

        let threshold = if threshold.is_finite() {
            threshold.clamp(0.0, 1.0)
        } else {
            0.5
        };
        let spread = self.spread.max(f32::EPSILON);
        let feather = self.feather.max(0.0);
        let background = border_mean(&raster);

        let max_distance = (3.0f32).sqrt() * 255.0;
        for pixel in raster.pixels_mut() {
            let distance = color_distance(*pixel, background) / max_distance;
            let score = (distance / spread).clamp(0.0, 1.0);
            let keep = smoothstep(threshold - feather, threshold + feather, score);
            pixel[3] = (pixel[3] as f32 * keep).round() as u8;
        }

        tracing::debug!(
            width,
            height,
            threshold,
            background = ?background,
            "Applied border colour matte"
        );
        Ok(raster)
    }
}

impl Matte for BorderColorMatte {
    async fn matte(&self, raster: RgbaImage, threshold: f32) -> Result<RgbaImage, MatteError> {
        self.apply(raster, threshold)
    }
}

/// Mean RGB of the outermost pixel ring.
fn border_mean(raster: &RgbaImage) -> [f32; 3] {
    let (width, height) = raster.dimensions();
    let mut sum = [0.0f64; 3];
    let mut count = 0u64;

    for (x, y, pixel) in raster.enumerate_pixels() {
        if x == 0 || y == 0 || x == width - 1 || y == height - 1 {
            for c in 0..3 {
                sum[c] += pixel[c] as f64;
            }
            count += 1;
        }
    }

    let count = count.max(1) as f64;
    [
        (sum[0] / count) as f32,
        (sum[1] / count) as f32,
        (sum[2] / count) as f32,
    ]
}

fn color_distance(pixel: Rgba<u8>, background: [f32; 3]) -> f32 {
    let dr = pixel[0] as f32 - background[0];
    let dg = pixel[1] as f32 - background[1];
    let db = pixel[2] as f32 - background[2];
    (dr * dr + dg * dg + db * db).sqrt()
}

fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    if edge1 <= edge0 {
        return if x >= edge0 { 1.0 } else { 0.0 };
    }
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}
