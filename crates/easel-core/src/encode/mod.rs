//! Image encoding for Easel export.
//!
//! This module provides functionality for:
//! - Encoding composited rasters to PNG, JPEG or WebP
//! - Normalizing the export quality parameter
//!
//! # Examples
//!
//! ```ignore
//! use easel_core::encode::{encode_raster, ExportFormat};
//!
//! let raster = image::RgbaImage::new(100, 100);
//! let bytes = encode_raster(&raster, ExportFormat::Jpeg, 0.92).unwrap();
//! println!("Encoded {} bytes", bytes.len());
//! ```

mod raster;

pub use raster::{
    clamp_quality, encode_raster, jpeg_quality, EncodeError, ExportFormat, MAX_QUALITY,
    MIN_QUALITY,
};
