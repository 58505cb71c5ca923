//! Overlay objects drawn above the image.

use serde::{Deserialize, Serialize};

use crate::transform::CropBox;

/// Stable handle to an overlay slot in the scene arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OverlayId(pub(crate) usize);

impl OverlayId {
    pub fn index(self) -> usize {
        self.0
    }

    /// Rebuild an id from its index, for hosts that hold ids as numbers.
    /// An index that was never handed out simply matches no overlay.
    pub fn from_index(index: usize) -> Self {
        Self(index)
    }
}

impl std::fmt::Display for OverlayId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A text label, positioned by its center.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBox {
    pub text: String,
    pub left: f64,
    pub top: f64,
    /// Font size in canvas pixels
    pub font_size: f32,
    /// RGBA fill colour
    pub fill: [u8; 4],
}

/// The transient crop selection rectangle, positioned by its top-left corner.
///
/// `width`/`height` are the unscaled size; resize handles change the scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropSelection {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    pub scale_x: f64,
    pub scale_y: f64,
}

impl CropSelection {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
            scale_x: 1.0,
            scale_y: 1.0,
        }
    }

    /// Bounding box in canvas pixels, with the handle scale applied.
    pub fn bounding_box(&self) -> CropBox {
        CropBox::new(
            self.left,
            self.top,
            self.width * self.scale_x.abs(),
            self.height * self.scale_y.abs(),
        )
    }
}

/// Anything drawn on top of the image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Overlay {
    Text(TextBox),
    CropSelection(CropSelection),
}

impl Overlay {
    pub fn as_text(&self) -> Option<&TextBox> {
        match self {
            Overlay::Text(text) => Some(text),
            Overlay::CropSelection(_) => None,
        }
    }

    /// Move the overlay's anchor point.
    pub fn move_to(&mut self, left: f64, top: f64) {
        match self {
            Overlay::Text(text) => {
                text.left = left;
                text.top = top;
            }
            Overlay::CropSelection(sel) => {
                sel.left = left;
                sel.top = top;
            }
        }
    }
}
