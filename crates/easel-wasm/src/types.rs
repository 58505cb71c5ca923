//! WASM-compatible wrapper types for rasters and exports.
//!
//! This module provides JavaScript-friendly types that wrap the core Easel types,
//! handling the conversion between Rust and JavaScript data representations.

use easel_core::image::RgbaImage;
use easel_core::ExportArtifact;
use wasm_bindgen::prelude::*;

/// An RGBA raster wrapper for JavaScript.
///
/// Pixels are row-major RGBA, 4 bytes per pixel, which is the layout of
/// `ImageData.data` on a 2D canvas.
///
/// # Memory Management
///
/// The pixel data is stored in WASM memory. When you call `pixels()`, a copy is made
/// to JavaScript memory as a `Uint8Array`.
#[wasm_bindgen]
pub struct JsRaster {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

#[wasm_bindgen]
impl JsRaster {
    /// Create a raster from dimensions and RGBA pixel data.
    #[wasm_bindgen(constructor)]
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> JsRaster {
        JsRaster {
            width,
            height,
            pixels,
        }
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of bytes in the pixel buffer (width * height * 4)
    #[wasm_bindgen(getter)]
    pub fn byte_length(&self) -> usize {
        self.pixels.len()
    }

    /// Returns RGBA pixel data as Uint8Array (a copy).
    pub fn pixels(&self) -> Vec<u8> {
        self.pixels.clone()
    }
}

impl JsRaster {
    pub(crate) fn from_image(image: RgbaImage) -> Self {
        Self {
            width: image.width(),
            height: image.height(),
            pixels: image.into_raw(),
        }
    }

    /// Build a core raster, checking the buffer length.
    pub(crate) fn into_image(self) -> Result<RgbaImage, JsValue> {
        raster_from_parts(self.width, self.height, self.pixels)
    }
}

/// Build an `RgbaImage` from JS-supplied parts.
pub(crate) fn raster_from_parts(
    width: u32,
    height: u32,
    pixels: Vec<u8>,
) -> Result<RgbaImage, JsValue> {
    let expected = width as usize * height as usize * 4;
    if pixels.len() != expected {
        return Err(JsValue::from_str(&format!(
            "Pixel buffer has {} bytes, expected {} for {}x{} RGBA",
            pixels.len(),
            expected,
            width,
            height
        )));
    }
    RgbaImage::from_raw(width, height, pixels)
        .ok_or_else(|| JsValue::from_str("Invalid raster dimensions"))
}

/// An encoded export for JavaScript, ready to wrap in a `Blob`.
#[wasm_bindgen]
pub struct JsExport {
    file_name: String,
    mime: String,
    bytes: Vec<u8>,
}

#[wasm_bindgen]
impl JsExport {
    /// Suggested download name, `edited.<ext>`
    #[wasm_bindgen(getter)]
    pub fn file_name(&self) -> String {
        self.file_name.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn mime(&self) -> String {
        self.mime.clone()
    }

    /// Encoded bytes as Uint8Array (a copy).
    pub fn bytes(&self) -> Vec<u8> {
        self.bytes.clone()
    }
}

impl From<ExportArtifact> for JsExport {
    fn from(artifact: ExportArtifact) -> Self {
        Self {
            file_name: artifact.file_name,
            mime: artifact.mime.to_string(),
            bytes: artifact.bytes,
        }
    }
}


/// Error paths build a `JsValue`, which needs a wasm32 target.
#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_wrong_buffer_length_rejected() {
        assert!(raster_from_parts(2, 2, vec![0u8; 15]).is_err());
    }
}
