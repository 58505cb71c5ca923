//! Image decoding for Easel.
//!
//! This module provides functionality for:
//! - Decoding PNG, JPEG and WebP uploads into RGBA rasters
//! - Resizing rasters (used for displayed-size snapshots)
//!
//! # Examples
//!
//! ```ignore
//! use easel_core::decode::decode_image;
//!
//! let bytes = std::fs::read("photo.png").unwrap();
//! let image = decode_image(&bytes).unwrap();
//! println!("Decoded {}x{} image", image.width(), image.height());
//! ```

mod raster;
mod resize;
mod types;

pub use raster::{decode_image, detect_format};
pub use resize::{resize, scaled_dimensions};
pub use types::{DecodeError, FilterType, SourceFormat};
