//! Geometry between canvas space and source-pixel space.
//!
//! # Coordinate System
//!
//! - Canvas space: what is displayed, in viewport pixels, origin top-left
//! - Source space: the image's natural resolution
//! - An image placed with center origin at `(left, top)` and scale `s`
//!   covers `[left - W*s/2, left + W*s/2]` horizontally
//!
//! The fit engine maps source space into canvas space; the crop extractor
//! maps a canvas-space box back into pixels of a rendered raster.

mod crop;
mod fit;

pub use crop::{crop_raster, CropBox, PixelRect};
pub use fit::{fit, Placement, Viewport, DEFAULT_MIN_VIEWPORT_HEIGHT};
