//! Crop selection lifecycle and crop application.

use crate::backend::{Codec, Renderer};
use crate::error::EditorError;
use crate::operation::{Commit, OperationKind};
use crate::scene::{CropSelection, ImageObject, OverlayId};
use crate::transform::{crop_raster, fit};
use crate::FilterParams;

use super::Editor;

impl<R: Renderer, C: Codec> Editor<R, C> {
    /// Add the crop selection with the configured default rectangle.
    pub fn start_crop(&mut self) -> Result<OverlayId, EditorError> {
        self.ensure_idle()?;
        if !self.scene.has_image() {
            return Err(EditorError::NoImage);
        }
        let viewport = self.scene.viewport();
        let (left, top, width, height) = self
            .config
            .crop
            .selection_rect(viewport.width, viewport.height);

        let id = self
            .scene
            .insert_selection(CropSelection::new(left, top, width, height))
            .ok_or(EditorError::CropInProgress)?;
        tracing::debug!(%id, left, top, width, height, "Started crop");
        Ok(id)
    }

    /// Move and resize the crop selection. Resets the handle scale.
    pub fn set_crop_selection(
        &mut self,
        left: f64,
        top: f64,
        width: f64,
        height: f64,
    ) -> Result<(), EditorError> {
        let selection = self.scene.selection_mut().ok_or(EditorError::NoSelection)?;
        *selection = CropSelection::new(left, top, width, height);
        Ok(())
    }

    /// Set the selection's handle scale, as dragging a resize handle does.
    pub fn scale_crop_selection(&mut self, scale_x: f64, scale_y: f64) -> Result<(), EditorError> {
        let selection = self.scene.selection_mut().ok_or(EditorError::NoSelection)?;
        selection.scale_x = scale_x;
        selection.scale_y = scale_y;
        Ok(())
    }

    /// Remove the crop selection without rasterizing anything.
    /// Returns whether there was one.
    pub fn cancel_crop(&mut self) -> bool {
        let cancelled = self.scene.take_selection().is_some();
        if cancelled {
            tracing::debug!("Cancelled crop");
        }
        cancelled
    }

    /// Replace the image with the selected region of the composited scene.
    ///
    /// The result is fitted to the viewport. Overlays and filters are baked
    /// into the new raster, so both are dropped. Without a selection this
    /// does nothing.
    pub fn apply_crop(&mut self) -> Result<Commit, EditorError> {
        self.ensure_idle()?;
        let Some((_, selection)) = self.scene.selection() else {
            return Ok(Commit::NothingToDo);
        };
        let bbox = selection.bounding_box();

        let ticket = self
            .gate
            .begin(OperationKind::Crop)
            .map_err(EditorError::Busy)?;

        let composite = match self.render_composite() {
            Ok(composite) => composite,
            Err(e) => {
                self.gate.finish(ticket);
                tracing::warn!(error = %e, "Crop render failed");
                return Err(e);
            }
        };
        let cropped = crop_raster(&composite, bbox);
        let (width, height) = cropped.dimensions();

        let mut image = ImageObject::new(cropped);
        image.place(fit(width, height, self.scene.viewport()));

        self.scene.clear_overlays();
        self.scene.replace_image(image);
        self.params = FilterParams::default();
        self.gate.finish(ticket);

        tracing::info!(
            left = bbox.left,
            top = bbox.top,
            width,
            height,
            "Applied crop"
        );
        Ok(Commit::Applied)
    }
}
