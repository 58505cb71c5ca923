//! The editor: scene state, filter controls and the operation gate.
//!
//! All user actions go through [`Editor`]. Synchronous edits (load, fit,
//! filters, overlays) apply immediately. Operations that replace the active
//! image hold the [`OperationGate`] while they run; the async ones are split
//! into `begin_*` / `finish_*` so the work itself never borrows the editor.

mod background;
mod crop;
mod enhance;
mod export;

pub use background::BackgroundJob;
pub use enhance::EnhanceJob;
pub use export::ExportArtifact;

use image::{Rgba, RgbaImage};

use crate::backend::{Codec, ImageCodec, RenderOptions, Renderer};
use crate::config::EditorConfig;
use crate::decode::DecodeError;
use crate::error::EditorError;
use crate::filters::{build_filter_stack, Filter};
use crate::operation::{OperationGate, OperationKind, OperationState};
use crate::render::CpuRenderer;
use crate::scene::{ImageObject, Overlay, OverlayId, Scene, TextBox};
use crate::transform::{fit, Viewport};
use crate::FilterParams;

/// Interactive image editor.
///
/// `R` draws the scene and `C` converts between bytes and rasters; the
/// defaults run entirely on the CPU.
#[derive(Debug)]
pub struct Editor<R = CpuRenderer, C = ImageCodec> {
    config: EditorConfig,
    scene: Scene,
    params: FilterParams,
    gate: OperationGate,
    renderer: R,
    codec: C,
}

impl Editor {
    /// Create an editor with the CPU renderer (no font) and `image` codec.
    pub fn new(config: EditorConfig) -> Self {
        Self::with_backends(config, CpuRenderer::new(), ImageCodec)
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl<R: Renderer, C: Codec> Editor<R, C> {
    pub fn with_backends(config: EditorConfig, renderer: R, codec: C) -> Self {
        let scene = Scene::new(Viewport::default(), Rgba(config.background));
        Self {
            config,
            scene,
            params: FilterParams::default(),
            gate: OperationGate::new(),
            renderer,
            codec,
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn viewport(&self) -> Viewport {
        self.scene.viewport()
    }

    pub fn has_image(&self) -> bool {
        self.scene.has_image()
    }

    pub fn active_image(&self) -> Option<&ImageObject> {
        self.scene.image()
    }

    /// The control values behind the current filter stack.
    pub fn filter_params(&self) -> FilterParams {
        self.params
    }

    /// The filter stack on the active image (empty without one).
    pub fn filter_stack(&self) -> &[Filter] {
        self.scene.image().map(ImageObject::filters).unwrap_or_default()
    }

    pub fn state(&self) -> OperationState {
        self.gate.state()
    }

    pub fn is_busy(&self) -> bool {
        self.gate.is_busy()
    }

    /// Abandon the in-flight operation. Its result will be discarded when it
    /// arrives.
    pub fn cancel_pending(&mut self) -> Option<OperationKind> {
        self.gate.cancel()
    }

    // --- Loading ---------------------------------------------------------

    /// Decode PNG, JPEG or WebP bytes and make them the active image.
    ///
    /// The scene is only touched once decoding has succeeded.
    pub fn load_bytes(&mut self, bytes: &[u8]) -> Result<(), EditorError> {
        self.ensure_idle()?;
        let raster = self.codec.decode(bytes)?;
        self.install_image(raster);
        Ok(())
    }

    /// Make an already decoded raster the active image.
    pub fn load_raster(&mut self, raster: RgbaImage) -> Result<(), EditorError> {
        self.ensure_idle()?;
        let (width, height) = raster.dimensions();
        if width == 0 || height == 0 {
            return Err(DecodeError::EmptyImage { width, height }.into());
        }
        self.install_image(raster);
        Ok(())
    }

    /// Clear the scene and install `raster` fitted to the viewport, with the
    /// current filter controls applied.
    fn install_image(&mut self, raster: RgbaImage) {
        let (width, height) = raster.dimensions();
        let mut image = ImageObject::new(raster);
        image.set_filters(build_filter_stack(&self.params));
        image.place(fit(width, height, self.scene.viewport()));

        self.scene.clear();
        self.scene.set_background(Rgba(self.config.background));
        self.scene.replace_image(image);
        tracing::info!(width, height, "Loaded image");
    }

    // --- Viewport and fit ------------------------------------------------

    /// Resize the viewport to a parent width and refit the image.
    pub fn resize_to_parent(&mut self, parent_width: u32) {
        let viewport = Viewport::from_parent_width(
            parent_width,
            self.config.min_viewport_height,
            self.config.viewport_aspect,
        );
        self.set_viewport(viewport);
    }

    /// Set the viewport size and refit the image.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        let viewport = Viewport::new(viewport.width, viewport.height);
        self.scene.set_viewport(viewport);
        tracing::debug!(width = viewport.width, height = viewport.height, "Viewport resized");
        self.fit_to_canvas();
    }

    /// Scale the image uniformly to fit the viewport and center it.
    /// No-op without an image.
    pub fn fit_to_canvas(&mut self) {
        let viewport = self.scene.viewport();
        if let Some(image) = self.scene.image_mut() {
            let (width, height) = image.natural_size();
            let placement = fit(width, height, viewport);
            image.place(placement);
            tracing::debug!(
                scale = placement.scale,
                left = placement.left,
                top = placement.top,
                "Fitted image"
            );
        }
    }

    // --- Filters ---------------------------------------------------------

    /// Replace the filter stack from control values.
    ///
    /// Values are clamped and kept even without an image, so they apply to
    /// the next one loaded. Rejected while an operation is replacing the
    /// image, since its result resets the controls.
    pub fn set_filters(&mut self, params: FilterParams) -> Result<(), EditorError> {
        self.ensure_idle()?;
        self.params = params.clamped();
        if let Some(image) = self.scene.image_mut() {
            image.set_filters(build_filter_stack(&self.params));
        }
        Ok(())
    }

    // --- Overlays --------------------------------------------------------

    /// Add a text box with the configured defaults at the viewport center.
    pub fn add_text(&mut self) -> Result<OverlayId, EditorError> {
        let content = self.config.text.content.clone();
        self.add_text_with(&content)
    }

    /// Add a text box with the given content at the viewport center.
    pub fn add_text_with(&mut self, content: &str) -> Result<OverlayId, EditorError> {
        if !self.scene.has_image() {
            return Err(EditorError::NoImage);
        }
        let (left, top) = self.scene.viewport().center();
        let id = self.scene.add_text(TextBox {
            text: content.to_string(),
            left,
            top,
            font_size: self.config.text.font_size,
            fill: self.config.text.fill,
        });
        tracing::debug!(%id, "Added text overlay");
        Ok(id)
    }

    /// Move an overlay's anchor.
    pub fn move_overlay(&mut self, id: OverlayId, left: f64, top: f64) -> Result<(), EditorError> {
        let overlay = self
            .scene
            .overlay_mut(id)
            .ok_or(EditorError::UnknownOverlay(id))?;
        overlay.move_to(left, top);
        Ok(())
    }

    /// Replace the content of a text overlay.
    pub fn set_text(&mut self, id: OverlayId, text: &str) -> Result<(), EditorError> {
        match self.scene.overlay_mut(id) {
            Some(Overlay::Text(t)) => {
                t.text = text.to_string();
                Ok(())
            }
            Some(_) => Err(EditorError::NotText(id)),
            None => Err(EditorError::UnknownOverlay(id)),
        }
    }

    pub fn remove_overlay(&mut self, id: OverlayId) -> Result<Overlay, EditorError> {
        self.scene
            .remove_overlay(id)
            .ok_or(EditorError::UnknownOverlay(id))
    }

    /// Remove the image, every overlay and the filter controls.
    ///
    /// An in-flight operation is cancelled; its result will be discarded.
    pub fn clear(&mut self) {
        if let Some(kind) = self.gate.cancel() {
            tracing::warn!(%kind, "Cleared editor with an operation in flight");
        }
        self.scene.clear();
        self.params = FilterParams::default();
        tracing::info!("Cleared editor");
    }

    // --- Rendering -------------------------------------------------------

    /// Render the on-screen preview, including the crop selection.
    pub fn render_preview(&self) -> Result<RgbaImage, EditorError> {
        Ok(self.renderer.render_scene(&self.scene, RenderOptions::preview())?)
    }

    /// Render the scene as exported: everything except the crop selection.
    pub fn render_composite(&self) -> Result<RgbaImage, EditorError> {
        Ok(self
            .renderer
            .render_scene(&self.scene, RenderOptions::composite())?)
    }

    fn ensure_idle(&self) -> Result<(), EditorError> {
        match self.gate.state() {
            OperationState::Idle => Ok(()),
            OperationState::Busy(kind) => Err(EditorError::Busy(kind)),
        }
    }
}
