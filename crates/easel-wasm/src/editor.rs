//! Editor WASM bindings.
//!
//! `JsEditor` owns a core [`Editor`] and exposes its operations to the front
//! end. The front end draws `render_preview()` into its canvas.
//!
//! Background removal and enhancement run in JavaScript (a segmentation
//! model and a `fetch`), so they are split in two:
//!
//! ```typescript
//! const snapshot = editor.begin_background_removal();
//! const matted = await segment(snapshot, editor.matte_threshold);
//! editor.finish_background_removal(matted.width, matted.height, matted.pixels);
//!
//! const body = editor.begin_enhancement("sharper");
//! const res = await fetch(editor.enhance_url, { method: "POST", body: JSON.stringify(body) });
//! editor.finish_enhancement(res.status, await res.text());
//! ```
//!
//! If the JS side fails, `fail_pending(message)` releases the editor.

use easel_core::enhance::{classify_response, EnhanceError};
use easel_core::{
    Commit, CpuRenderer, Editor, EditorConfig, ExportFormat, ImageCodec, MatteError,
    OperationKind, OverlayId, Ticket, Viewport,
};
use wasm_bindgen::prelude::*;

use crate::filters::FilterParams;
use crate::types::{raster_from_parts, JsExport, JsRaster};

fn to_js(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// The image editor, for JavaScript.
#[wasm_bindgen]
pub struct JsEditor {
    inner: Editor,
    pending: Option<Ticket>,
}

#[wasm_bindgen]
impl JsEditor {
    /// Create an editor.
    ///
    /// `config` is a partial `EditorConfig` object (or `undefined`);
    /// `font` is a TTF/OTF file used for text overlays.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue, font: Option<Vec<u8>>) -> Result<JsEditor, JsValue> {
        let config: EditorConfig = if config.is_undefined() || config.is_null() {
            EditorConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config).map_err(to_js)?
        };
        let renderer = match font {
            Some(bytes) => CpuRenderer::with_font_bytes(bytes).map_err(to_js)?,
            None => CpuRenderer::new(),
        };
        Ok(Self::from_editor(Editor::with_backends(config, renderer, ImageCodec)))
    }

    #[wasm_bindgen(getter)]
    pub fn has_image(&self) -> bool {
        self.inner.has_image()
    }

    #[wasm_bindgen(getter)]
    pub fn is_busy(&self) -> bool {
        self.inner.is_busy()
    }

    #[wasm_bindgen(getter)]
    pub fn viewport_width(&self) -> u32 {
        self.inner.viewport().width
    }

    #[wasm_bindgen(getter)]
    pub fn viewport_height(&self) -> u32 {
        self.inner.viewport().height
    }

    #[wasm_bindgen(getter)]
    pub fn matte_threshold(&self) -> f32 {
        self.inner.config().matte_threshold
    }

    #[wasm_bindgen(getter)]
    pub fn enhance_url(&self) -> String {
        self.inner.config().enhance_url.clone()
    }

    /// Load PNG, JPEG or WebP bytes.
    pub fn load(&mut self, bytes: &[u8]) -> Result<(), JsValue> {
        self.inner.load_bytes(bytes).map_err(to_js)
    }

    /// Load raw RGBA pixels.
    pub fn load_pixels(&mut self, width: u32, height: u32, pixels: Vec<u8>) -> Result<(), JsValue> {
        let raster = raster_from_parts(width, height, pixels)?;
        self.inner.load_raster(raster).map_err(to_js)
    }

    /// Size the viewport from the parent element's width and refit.
    pub fn resize(&mut self, parent_width: u32) {
        self.inner.resize_to_parent(parent_width);
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.inner.set_viewport(Viewport::new(width, height));
    }

    pub fn fit(&mut self) {
        self.inner.fit_to_canvas();
    }

    /// Fails while background removal or enhancement is pending.
    pub fn set_filters(&mut self, params: &FilterParams) -> Result<(), JsValue> {
        self.inner.set_filters(*params.inner()).map_err(to_js)
    }

    /// Add a text box at the viewport center; returns its id.
    pub fn add_text(&mut self, text: Option<String>) -> Result<u32, JsValue> {
        let id = match text {
            Some(text) => self.inner.add_text_with(&text),
            None => self.inner.add_text(),
        }
        .map_err(to_js)?;
        Ok(id.index() as u32)
    }

    pub fn set_text(&mut self, id: u32, text: &str) -> Result<(), JsValue> {
        self.inner.set_text(overlay(id), text).map_err(to_js)
    }

    pub fn move_overlay(&mut self, id: u32, left: f64, top: f64) -> Result<(), JsValue> {
        self.inner.move_overlay(overlay(id), left, top).map_err(to_js)
    }

    pub fn remove_overlay(&mut self, id: u32) -> Result<(), JsValue> {
        self.inner.remove_overlay(overlay(id)).map(|_| ()).map_err(to_js)
    }

    /// Show the crop selection; returns its overlay id.
    pub fn start_crop(&mut self) -> Result<u32, JsValue> {
        let id = self.inner.start_crop().map_err(to_js)?;
        Ok(id.index() as u32)
    }

    pub fn set_crop_selection(
        &mut self,
        left: f64,
        top: f64,
        width: f64,
        height: f64,
    ) -> Result<(), JsValue> {
        self.inner
            .set_crop_selection(left, top, width, height)
            .map_err(to_js)
    }

    pub fn scale_crop_selection(&mut self, scale_x: f64, scale_y: f64) -> Result<(), JsValue> {
        self.inner
            .scale_crop_selection(scale_x, scale_y)
            .map_err(to_js)
    }

    pub fn cancel_crop(&mut self) -> bool {
        self.inner.cancel_crop()
    }

    /// Crop to the selection. Returns false if there was no selection.
    pub fn apply_crop(&mut self) -> Result<bool, JsValue> {
        let commit = self.inner.apply_crop().map_err(to_js)?;
        Ok(commit == Commit::Applied)
    }

    /// Render the on-screen preview, crop selection included.
    pub fn render_preview(&self) -> Result<JsRaster, JsValue> {
        let raster = self.inner.render_preview().map_err(to_js)?;
        Ok(JsRaster::from_image(raster))
    }

    /// Export the composite. `format` is `png`, `jpeg` or `webp`; quality
    /// defaults to the configured value.
    pub fn export(&self, format: Option<String>, quality: Option<f32>) -> Result<JsExport, JsValue> {
        let config = self.inner.config();
        let format = match format {
            Some(name) => ExportFormat::parse(&name)
                .ok_or_else(|| to_js(format!("Unsupported export format: {name}")))?,
            None => config.export_format,
        };
        let quality = quality.unwrap_or(config.export_quality);
        let artifact = self.inner.export(format, quality).map_err(to_js)?;
        Ok(artifact.into())
    }

    /// Snapshot the image for matting. The editor stays busy until
    /// `finish_background_removal` or `fail_pending`.
    pub fn begin_background_removal(&mut self) -> Result<JsRaster, JsValue> {
        let job = self.inner.begin_background_removal().map_err(to_js)?;
        let (ticket, raster, _) = job.into_parts();
        self.pending = Some(ticket);
        Ok(JsRaster::from_image(raster))
    }

    /// Commit the matted pixels. Returns false if the result was discarded.
    pub fn finish_background_removal(
        &mut self,
        width: u32,
        height: u32,
        pixels: Vec<u8>,
    ) -> Result<bool, JsValue> {
        let ticket = self.take_pending(OperationKind::BackgroundRemoval)?;
        let result = raster_from_parts(width, height, pixels)
            .map_err(|_| MatteError::Failed("matte returned a malformed pixel buffer".into()));
        let commit = self
            .inner
            .finish_background_removal(ticket, result)
            .map_err(to_js)?;
        Ok(commit == Commit::Applied)
    }

    /// Prepare the enhancement request body as a JS object.
    pub fn begin_enhancement(&mut self, prompt: Option<String>) -> Result<JsValue, JsValue> {
        let job = self.inner.begin_enhancement(prompt).map_err(to_js)?;
        let (ticket, request) = job.into_parts();
        match serde_wasm_bindgen::to_value(&request) {
            Ok(body) => {
                self.pending = Some(ticket);
                Ok(body)
            }
            Err(e) => {
                self.inner.cancel_pending();
                Err(to_js(e))
            }
        }
    }

    /// Commit the endpoint's response. Returns false if it was discarded.
    pub fn finish_enhancement(&mut self, status: u16, body: &str) -> Result<bool, JsValue> {
        let ticket = self.take_pending(OperationKind::Enhancement)?;
        let result = classify_response(status, body);
        let commit = self
            .inner
            .finish_enhancement(ticket, result)
            .map_err(to_js)?;
        Ok(commit == Commit::Applied)
    }

    /// Report that the JS side of the pending operation failed. The scene is
    /// left as it was.
    pub fn fail_pending(&mut self, message: String) {
        let Some(ticket) = self.pending.take() else {
            return;
        };
        #[cfg(target_arch = "wasm32")]
        web_sys::console::warn_1(&JsValue::from_str(&format!(
            "{} failed: {message}",
            ticket.kind()
        )));
        // The returned error is the failure being reported
        let _ = match ticket.kind() {
            OperationKind::BackgroundRemoval => self
                .inner
                .finish_background_removal(ticket, Err(MatteError::Failed(message))),
            OperationKind::Enhancement => self.inner.finish_enhancement(
                ticket,
                Err(EnhanceError::InvalidResponse(message)),
            ),
            OperationKind::Crop => Ok(Commit::NothingToDo),
        };
    }

    /// Abandon the pending operation; a late result will be discarded.
    pub fn cancel_pending(&mut self) {
        self.pending = None;
        self.inner.cancel_pending();
    }

    /// Remove the image, overlays and filters.
    pub fn clear(&mut self) {
        self.pending = None;
        self.inner.clear();
    }
}

impl JsEditor {
    pub(crate) fn from_editor(inner: Editor) -> Self {
        Self {
            inner,
            pending: None,
        }
    }

    fn take_pending(&mut self, kind: OperationKind) -> Result<Ticket, JsValue> {
        match self.pending {
            Some(ticket) if ticket.kind() == kind => {
                self.pending = None;
                Ok(ticket)
            }
            _ => Err(to_js(format!("No {kind} in progress"))),
        }
    }
}

fn overlay(id: u32) -> OverlayId {
    OverlayId::from_index(id as usize)
}
