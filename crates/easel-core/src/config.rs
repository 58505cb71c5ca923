//! Editor configuration.
//!
//! Every field has a default, so a partial JSON document (or `{}`) is a
//! valid configuration.

use serde::{Deserialize, Serialize};

use crate::encode::ExportFormat;
use crate::error::EditorError;
use crate::transform::DEFAULT_MIN_VIEWPORT_HEIGHT;

/// Tunable defaults for an [`crate::Editor`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Canvas background, RGBA.
    pub background: [u8; 4],
    /// Lower bound on the viewport height when sizing from a parent width.
    pub min_viewport_height: u32,
    /// Viewport height over width.
    pub viewport_aspect: f64,
    /// Foreground cutoff passed to the matte.
    pub matte_threshold: f32,
    pub export_format: ExportFormat,
    pub export_quality: f32,
    pub text: TextDefaults,
    pub crop: CropDefaults,
    /// Path (or absolute URL) of the enhancement endpoint.
    pub enhance_url: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            background: [255, 255, 255, 255],
            min_viewport_height: DEFAULT_MIN_VIEWPORT_HEIGHT,
            viewport_aspect: 9.0 / 16.0,
            matte_threshold: 0.6,
            export_format: ExportFormat::Png,
            export_quality: 0.92,
            text: TextDefaults::default(),
            crop: CropDefaults::default(),
            enhance_url: "/api/ai/enhance".into(),
        }
    }
}

impl EditorConfig {
    /// Parse a JSON configuration; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, EditorError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Defaults for newly added text boxes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextDefaults {
    pub content: String,
    pub font_size: f32,
    pub fill: [u8; 4],
}

impl Default for TextDefaults {
    fn default() -> Self {
        Self {
            content: "Your text".into(),
            font_size: 36.0,
            // #111827
            fill: [17, 24, 39, 255],
        }
    }
}

/// Defaults for a new crop selection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CropDefaults {
    /// Offset of the selection from the top-left corner, and the margin kept
    /// on the far sides when the viewport is small.
    pub inset: f64,
    pub width: f64,
    pub height: f64,
}

impl Default for CropDefaults {
    fn default() -> Self {
        Self {
            inset: 40.0,
            width: 300.0,
            height: 200.0,
        }
    }
}

impl CropDefaults {
    /// Initial selection rectangle `(left, top, width, height)` for a
    /// viewport, each side at least 1 pixel.
    pub fn selection_rect(&self, viewport_width: u32, viewport_height: u32) -> (f64, f64, f64, f64) {
        let margin = self.inset * 2.0;
        let width = self.width.min(viewport_width as f64 - margin).max(1.0);
        let height = self.height.min(viewport_height as f64 - margin).max(1.0);
        (self.inset, self.inset, width, height)
    }
}
