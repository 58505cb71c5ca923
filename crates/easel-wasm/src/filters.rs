//! Filter control WASM bindings.
//!
//! This module provides JavaScript bindings for the FilterParams type,
//! allowing the filter sliders and toggles to be driven from TypeScript.

use crate::types::JsRaster;
use easel_core::filters::{apply_filters as apply_filter_stack, build_filter_stack};
use wasm_bindgen::prelude::*;

/// Filter controls wrapper for JavaScript
#[wasm_bindgen]
pub struct FilterParams {
    inner: easel_core::FilterParams,
}

#[wasm_bindgen]
impl FilterParams {
    /// Create filter controls with neutral values
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            inner: easel_core::FilterParams::new(),
        }
    }

    /// Get brightness (-1 to 1)
    #[wasm_bindgen(getter)]
    pub fn brightness(&self) -> f32 {
        self.inner.brightness
    }

    #[wasm_bindgen(setter)]
    pub fn set_brightness(&mut self, value: f32) {
        self.inner.brightness = value;
    }

    /// Get contrast (-1 to 1)
    #[wasm_bindgen(getter)]
    pub fn contrast(&self) -> f32 {
        self.inner.contrast
    }

    #[wasm_bindgen(setter)]
    pub fn set_contrast(&mut self, value: f32) {
        self.inner.contrast = value;
    }

    /// Get saturation (-1 to 1)
    #[wasm_bindgen(getter)]
    pub fn saturation(&self) -> f32 {
        self.inner.saturation
    }

    #[wasm_bindgen(setter)]
    pub fn set_saturation(&mut self, value: f32) {
        self.inner.saturation = value;
    }

    /// Get blur strength (0 to 1)
    #[wasm_bindgen(getter)]
    pub fn blur(&self) -> f32 {
        self.inner.blur
    }

    #[wasm_bindgen(setter)]
    pub fn set_blur(&mut self, value: f32) {
        self.inner.blur = value;
    }

    #[wasm_bindgen(getter)]
    pub fn grayscale(&self) -> bool {
        self.inner.grayscale
    }

    #[wasm_bindgen(setter)]
    pub fn set_grayscale(&mut self, value: bool) {
        self.inner.grayscale = value;
    }

    #[wasm_bindgen(getter)]
    pub fn sepia(&self) -> bool {
        self.inner.sepia
    }

    #[wasm_bindgen(setter)]
    pub fn set_sepia(&mut self, value: bool) {
        self.inner.sepia = value;
    }

    #[wasm_bindgen(getter)]
    pub fn invert(&self) -> bool {
        self.inner.invert
    }

    #[wasm_bindgen(setter)]
    pub fn set_invert(&mut self, value: bool) {
        self.inner.invert = value;
    }

    /// Check if every control is neutral
    pub fn is_default(&self) -> bool {
        self.inner.is_default()
    }

    /// Serialize to a JS object for storage
    pub fn to_json(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.inner).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Deserialize from a JS object
    pub fn from_json(value: JsValue) -> Result<FilterParams, JsValue> {
        let inner: easel_core::FilterParams =
            serde_wasm_bindgen::from_value(value).map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(Self { inner })
    }
}

impl Default for FilterParams {
    fn default() -> Self {
        Self::new()
    }
}

impl FilterParams {
    pub(crate) fn inner(&self) -> &easel_core::FilterParams {
        &self.inner
    }
}

/// Apply a filter stack to a standalone raster.
///
/// Useful for thumbnails of each filter; the editor applies filters to its
/// own image through `JsEditor.set_filters`.
///
/// # Example (TypeScript)
/// ```typescript
/// const params = new FilterParams();
/// params.sepia = true;
/// const preview = apply_filters(thumbnail, params);
/// ```
#[wasm_bindgen]
pub fn apply_filters(raster: JsRaster, params: &FilterParams) -> Result<JsRaster, JsValue> {
    let source = raster.into_image()?;
    let stack = build_filter_stack(params.inner());
    Ok(JsRaster::from_image(apply_filter_stack(&source, &stack)))
}
