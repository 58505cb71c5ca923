//! Easel Core - Image editor compositing and transform pipeline
//!
//! This crate holds everything the Easel editor does to pixels: the scene
//! model (one image plus overlays), the non-destructive filter stack, the
//! fit engine, crop rasterization, background removal, export encoding and
//! the client side of the remote enhancement endpoint.
//!
//! Start with [`Editor`]; it runs headless on the CPU by default.

pub mod backend;
pub mod config;
pub mod data_uri;
pub mod decode;
pub mod editor;
pub mod encode;
pub mod enhance;
pub mod error;
pub mod filters;
pub mod matte;
pub mod operation;
pub mod render;
pub mod scene;
pub mod transform;

// Hosts exchange rasters as `image::RgbaImage`
pub use image;

pub use backend::{Codec, ImageCodec, RenderError, RenderOptions, Renderer};
pub use config::EditorConfig;
pub use editor::{BackgroundJob, Editor, EnhanceJob, ExportArtifact};
pub use encode::ExportFormat;
pub use error::EditorError;
pub use filters::Filter;
pub use matte::{BorderColorMatte, Matte, MatteError};
pub use operation::{Commit, OperationKind, OperationState, Ticket};
pub use render::CpuRenderer;
pub use scene::{Overlay, OverlayId};
pub use transform::Viewport;

use filters::clamp_level;

/// DejaVu Sans, for tests that draw text.
#[cfg(test)]
pub(crate) const TEST_FONT: &[u8] = include_bytes!("../tests/fixtures/DejaVuSans.ttf");

/// Filter control values, one per slider or toggle
#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct FilterParams {
    /// Brightness (-1 to 1)
    pub brightness: f32,
    /// Contrast (-1 to 1)
    pub contrast: f32,
    /// Saturation (-1 to 1)
    pub saturation: f32,
    /// Blur strength (0 to 1)
    pub blur: f32,
    pub grayscale: bool,
    pub sepia: bool,
    pub invert: bool,
}

impl FilterParams {
    /// Create a new FilterParams with neutral values
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if all values are at their defaults
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    /// Clamp numeric levels into their ranges. NaN becomes neutral.
    pub fn clamped(&self) -> Self {
        Self {
            brightness: clamp_level(self.brightness, -1.0, 1.0),
            contrast: clamp_level(self.contrast, -1.0, 1.0),
            saturation: clamp_level(self.saturation, -1.0, 1.0),
            blur: clamp_level(self.blur, 0.0, 1.0),
            ..*self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_params_default() {
        let params = FilterParams::new();
        assert!(params.is_default());
    }

    #[test]
    fn test_filter_params_not_default() {
        let mut params = FilterParams::new();
        params.sepia = true;
        assert!(!params.is_default());
    }

    #[test]
    fn test_filter_params_clamped() {
        let params = FilterParams {
            brightness: 2.0,
            contrast: -5.0,
            saturation: f32::NAN,
            blur: -0.5,
            invert: true,
            ..FilterParams::default()
        };
        let clamped = params.clamped();
        assert_eq!(clamped.brightness, 1.0);
        assert_eq!(clamped.contrast, -1.0);
        assert_eq!(clamped.saturation, 0.0);
        assert_eq!(clamped.blur, 0.0);
        assert!(clamped.invert);
    }

    #[test]
    fn test_filter_params_partial_json() {
        let params: FilterParams = serde_json::from_str(r#"{"blur": 0.5, "grayscale": true}"#).unwrap();
        assert_eq!(params.blur, 0.5);
        assert!(params.grayscale);
        assert_eq!(params.brightness, 0.0);
    }
}
