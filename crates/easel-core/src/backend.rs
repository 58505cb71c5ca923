//! Capability interfaces between the editor and its rendering surface.
//!
//! The editor never touches a display. It asks a [`Renderer`] for rasters
//! and a [`Codec`] for bytes, which keeps every operation runnable headless.
//! [`crate::render::CpuRenderer`] and [`ImageCodec`] are the default
//! implementations.

use image::RgbaImage;
use thiserror::Error;

use crate::decode::{self, DecodeError};
use crate::encode::{self, EncodeError, ExportFormat};
use crate::scene::{ImageObject, Scene};

/// Errors raised by a renderer.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Font bytes could not be parsed.
    #[error("Invalid font data: {0}")]
    InvalidFont(String),

    /// Resampling the image failed.
    #[error("Resampling failed: {0}")]
    Resample(#[from] DecodeError),
}

/// What to include when rendering a scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderOptions {
    /// Draw the crop selection rectangle (on-screen preview only).
    pub draw_selection: bool,
}

impl RenderOptions {
    /// Options for crop, export and enhancement rasters: no selection.
    pub fn composite() -> Self {
        Self {
            draw_selection: false,
        }
    }

    /// Options for the interactive preview.
    pub fn preview() -> Self {
        Self {
            draw_selection: true,
        }
    }
}

/// Renders scene content to rasters.
pub trait Renderer {
    /// Composite the whole scene into a raster sized to its viewport.
    fn render_scene(&self, scene: &Scene, options: RenderOptions)
        -> Result<RgbaImage, RenderError>;

    /// Render a single image object (with its filters) at `width x height`.
    fn render_image(
        &self,
        image: &ImageObject,
        width: u32,
        height: u32,
    ) -> Result<RgbaImage, RenderError>;
}

/// Converts between encoded bytes and rasters.
pub trait Codec {
    fn decode(&self, bytes: &[u8]) -> Result<RgbaImage, DecodeError>;

    fn encode(
        &self,
        raster: &RgbaImage,
        format: ExportFormat,
        quality: f32,
    ) -> Result<Vec<u8>, EncodeError>;
}

/// Codec backed by the `image` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageCodec;

impl Codec for ImageCodec {
    fn decode(&self, bytes: &[u8]) -> Result<RgbaImage, DecodeError> {
        decode::decode_image(bytes)
    }

    fn encode(
        &self,
        raster: &RgbaImage,
        format: ExportFormat,
        quality: f32,
    ) -> Result<Vec<u8>, EncodeError> {
        encode::encode_raster(raster, format, quality)
    }
}
