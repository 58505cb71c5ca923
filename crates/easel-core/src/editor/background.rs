//! Background removal: snapshot, matte, swap.

use image::RgbaImage;

use crate::backend::{Codec, Renderer};
use crate::decode::scaled_dimensions;
use crate::error::EditorError;
use crate::matte::{Matte, MatteError};
use crate::operation::{Commit, OperationKind, Ticket};
use crate::scene::ImageObject;
use crate::FilterParams;

use super::Editor;

/// A background removal waiting for its matte.
///
/// Holds the image as displayed (filters applied, at its on-screen size) and
/// owns everything it needs, so the editor stays free while it runs.
#[derive(Debug)]
pub struct BackgroundJob {
    ticket: Ticket,
    raster: RgbaImage,
    threshold: f32,
}

impl BackgroundJob {
    pub fn ticket(&self) -> Ticket {
        self.ticket
    }

    pub fn raster(&self) -> &RgbaImage {
        &self.raster
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Split the job, for hosts that run the matte themselves.
    pub fn into_parts(self) -> (Ticket, RgbaImage, f32) {
        (self.ticket, self.raster, self.threshold)
    }

    /// Run the matte. Returns the ticket alongside the result.
    pub async fn run<M: Matte>(self, matte: &M) -> (Ticket, Result<RgbaImage, MatteError>) {
        let result = matte.matte(self.raster, self.threshold).await;
        (self.ticket, result)
    }
}

impl<R: Renderer, C: Codec> Editor<R, C> {
    /// Claim the gate and snapshot the active image for matting.
    pub fn begin_background_removal(&mut self) -> Result<BackgroundJob, EditorError> {
        self.ensure_idle()?;
        let Some(image) = self.scene.image() else {
            return Err(EditorError::NoImage);
        };
        let (natural_w, natural_h) = image.natural_size();
        let (width, height) = scaled_dimensions(natural_w, natural_h, image.scale_x, image.scale_y);

        let raster = self
            .renderer
            .render_image(image, width, height)
            .inspect_err(|e| tracing::warn!(error = %e, "Background removal snapshot failed"))?;

        let ticket = self
            .gate
            .begin(OperationKind::BackgroundRemoval)
            .map_err(EditorError::Busy)?;
        tracing::debug!(width, height, "Snapshotted image for background removal");

        Ok(BackgroundJob {
            ticket,
            raster,
            threshold: self.config.matte_threshold,
        })
    }

    /// Commit a matte result.
    ///
    /// The new image keeps the old one's position, origin and on-screen
    /// size. Its scale is recomputed rather than copied from the old image:
    /// the matte ran at displayed resolution, so the old scale would apply
    /// twice. On failure the scene is untouched and the error is returned.
    /// A result for a cancelled or superseded job is discarded.
    pub fn finish_background_removal(
        &mut self,
        ticket: Ticket,
        result: Result<RgbaImage, MatteError>,
    ) -> Result<Commit, EditorError> {
        if !self.gate.finish(ticket) {
            tracing::warn!("Discarding stale background removal result");
            return Ok(Commit::Discarded);
        }

        let raster = match result {
            Ok(raster) if raster.width() > 0 && raster.height() > 0 => raster,
            Ok(_) => {
                tracing::warn!("Background removal returned an empty image");
                return Err(MatteError::EmptyResult.into());
            }
            Err(e) => {
                tracing::warn!(error = %e, "Background removal failed");
                return Err(e.into());
            }
        };

        let Some(prior) = self.scene.image() else {
            return Ok(Commit::Discarded);
        };
        let (shown_w, shown_h) = prior.displayed_size();
        let (width, height) = raster.dimensions();

        let mut image = ImageObject::new(raster);
        image.copy_position(prior);
        image.scale_x = shown_w / width as f64;
        image.scale_y = shown_h / height as f64;

        self.scene.replace_image(image);
        self.params = FilterParams::default();
        tracing::info!(width, height, "Removed background");
        Ok(Commit::Applied)
    }

    /// Run a full background removal with `matte`.
    pub async fn remove_background<M: Matte>(&mut self, matte: &M) -> Result<Commit, EditorError> {
        let job = self.begin_background_removal()?;
        let (ticket, result) = job.run(matte).await;
        self.finish_background_removal(ticket, result)
    }
}
