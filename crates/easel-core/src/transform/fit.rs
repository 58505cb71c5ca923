//! Fit engine: uniform scale-and-center placement of an image in the viewport.
//!
//! # Algorithm
//!
//! For a source of `W x H` pixels and a viewport of `Vw x Vh`:
//! ```text
//! scale = min(Vw / W, Vh / H)
//! center = (Vw / 2, Vh / 2)
//! ```
//! The scale is uniform, so the aspect ratio is preserved, and images smaller
//! than the viewport are scaled up until they touch an edge.

use serde::{Deserialize, Serialize};

/// Default minimum viewport height in canvas pixels.
pub const DEFAULT_MIN_VIEWPORT_HEIGHT: u32 = 420;

/// On-screen rendering surface size in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    /// Create a viewport; zero dimensions are clamped to 1.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
        }
    }

    /// Size the viewport from the width of its parent element.
    ///
    /// `height = max(min_height, floor(width * aspect))`, where `aspect` is
    /// height over width (9/16 by default).
    pub fn from_parent_width(parent_width: u32, min_height: u32, aspect: f64) -> Self {
        let aspect = if aspect.is_finite() && aspect > 0.0 {
            aspect
        } else {
            9.0 / 16.0
        };
        let scaled = (parent_width as f64 * aspect).floor() as u32;
        Self::new(parent_width, scaled.max(min_height))
    }

    /// Center point of the viewport.
    pub fn center(&self) -> (f64, f64) {
        (self.width as f64 / 2.0, self.height as f64 / 2.0)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        // 16:9 at the minimum height
        Self::new(746, DEFAULT_MIN_VIEWPORT_HEIGHT)
    }
}

/// Result of a fit: center position and uniform scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub left: f64,
    pub top: f64,
    pub scale: f64,
}

/// Compute the fit placement for a `width x height` source.
///
/// Zero source dimensions are treated as 1 pixel so the result is always a
/// finite, positive scale.
///
/// # Example
///
/// ```
/// use easel_core::transform::{fit, Viewport};
///
/// let placement = fit(2000, 1000, Viewport::new(800, 450));
/// assert!((placement.scale - 0.4).abs() < 1e-9);
/// assert_eq!((placement.left, placement.top), (400.0, 225.0));
/// ```
pub fn fit(width: u32, height: u32, viewport: Viewport) -> Placement {
    let src_w = width.max(1) as f64;
    let src_h = height.max(1) as f64;
    let vw = viewport.width.max(1) as f64;
    let vh = viewport.height.max(1) as f64;

    let scale = (vw / src_w).min(vh / src_h);
    let (left, top) = (vw / 2.0, vh / 2.0);

    Placement { left, top, scale }
}


// ============================================================================
// Property-Based Tests
// ============================================================================
