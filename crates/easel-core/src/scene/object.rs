//! The active image object: source raster, filter stack and placement.

use image::RgbaImage;
use serde::{Deserialize, Serialize};

use crate::filters::{apply_filters, Filter};
use crate::transform::{CropBox, Placement};

/// Horizontal anchor of an object's `left` coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OriginX {
    Left,
    #[default]
    Center,
    Right,
}

/// Vertical anchor of an object's `top` coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OriginY {
    Top,
    #[default]
    Center,
    Bottom,
}

impl OriginX {
    /// Fraction of the object's width that lies left of `left`.
    pub fn fraction(self) -> f64 {
        match self {
            OriginX::Left => 0.0,
            OriginX::Center => 0.5,
            OriginX::Right => 1.0,
        }
    }
}

impl OriginY {
    /// Fraction of the object's height that lies above `top`.
    pub fn fraction(self) -> f64 {
        match self {
            OriginY::Top => 0.0,
            OriginY::Center => 0.5,
            OriginY::Bottom => 1.0,
        }
    }
}

/// The image being edited.
///
/// Holds the untouched source raster and a filtered copy that is recomputed
/// whenever the filter stack is replaced. Placement is fully described by
/// `left`/`top`, the origin and the two scale factors.
#[derive(Debug, Clone)]
pub struct ImageObject {
    source: RgbaImage,
    filtered: RgbaImage,
    filters: Vec<Filter>,
    pub left: f64,
    pub top: f64,
    pub origin_x: OriginX,
    pub origin_y: OriginY,
    pub scale_x: f64,
    pub scale_y: f64,
}

impl ImageObject {
    /// Create an image at natural size (scale 1) with a center origin at (0, 0).
    pub fn new(source: RgbaImage) -> Self {
        Self {
            filtered: source.clone(),
            source,
            filters: Vec::new(),
            left: 0.0,
            top: 0.0,
            origin_x: OriginX::Center,
            origin_y: OriginY::Center,
            scale_x: 1.0,
            scale_y: 1.0,
        }
    }

    /// Natural (source) size in pixels.
    pub fn natural_size(&self) -> (u32, u32) {
        self.source.dimensions()
    }

    /// The unfiltered source raster.
    pub fn source(&self) -> &RgbaImage {
        &self.source
    }

    /// The source raster with the current filter stack applied.
    pub fn pixels(&self) -> &RgbaImage {
        &self.filtered
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    /// Replace the filter stack wholesale and recompute the filtered raster.
    pub fn set_filters(&mut self, filters: Vec<Filter>) {
        self.filtered = apply_filters(&self.source, &filters);
        self.filters = filters;
        tracing::debug!(filters = self.filters.len(), "Recomputed filtered raster");
    }

    /// Set a uniform scale.
    pub fn scale(&mut self, scale: f64) {
        self.scale_x = scale;
        self.scale_y = scale;
    }

    /// Apply a fit placement: center origin, uniform scale.
    pub fn place(&mut self, placement: Placement) {
        self.left = placement.left;
        self.top = placement.top;
        self.origin_x = OriginX::Center;
        self.origin_y = OriginY::Center;
        self.scale(placement.scale);
    }

    /// Displayed size in canvas pixels.
    pub fn displayed_size(&self) -> (f64, f64) {
        let (w, h) = self.natural_size();
        (w as f64 * self.scale_x, h as f64 * self.scale_y)
    }

    /// Axis-aligned bounds in canvas space.
    pub fn bounds(&self) -> CropBox {
        let (w, h) = self.displayed_size();
        CropBox::new(
            self.left - w * self.origin_x.fraction(),
            self.top - h * self.origin_y.fraction(),
            w,
            h,
        )
    }

    /// Copy position and origin from another object.
    pub fn copy_position(&mut self, other: &ImageObject) {
        self.left = other.left;
        self.top = other.top;
        self.origin_x = other.origin_x;
        self.origin_y = other.origin_y;
    }
}
