//! Remote enhancement of the composited scene.

use crate::backend::{Codec, Renderer};
use crate::data_uri::{decode_data_uri, encode_data_uri};
use crate::encode::ExportFormat;
use crate::enhance::{EnhanceError, EnhanceRequest, Enhancer};
use crate::error::EditorError;
use crate::operation::{Commit, OperationKind, Ticket};
use crate::FilterParams;

use super::Editor;

/// An enhancement request waiting for the endpoint.
#[derive(Debug, Clone)]
pub struct EnhanceJob {
    ticket: Ticket,
    request: EnhanceRequest,
}

impl EnhanceJob {
    pub fn ticket(&self) -> Ticket {
        self.ticket
    }

    /// The request body, with the composite as a PNG data URI.
    pub fn request(&self) -> &EnhanceRequest {
        &self.request
    }

    pub fn into_parts(self) -> (Ticket, EnhanceRequest) {
        (self.ticket, self.request)
    }

    /// Send the request. Returns the ticket alongside the result.
    pub async fn run<E: Enhancer>(self, enhancer: &E) -> (Ticket, Result<String, EnhanceError>) {
        let result = enhancer.enhance(&self.request).await;
        (self.ticket, result)
    }
}

impl<R: Renderer, C: Codec> Editor<R, C> {
    /// Claim the gate and encode the composite for the enhancement endpoint.
    pub fn begin_enhancement(&mut self, prompt: Option<String>) -> Result<EnhanceJob, EditorError> {
        self.ensure_idle()?;
        if !self.scene.has_image() {
            return Err(EditorError::NoImage);
        }

        let composite = self.render_composite()?;
        let png = self.codec.encode(&composite, ExportFormat::Png, 1.0)?;
        let image = encode_data_uri(ExportFormat::Png.mime(), &png);

        let ticket = self
            .gate
            .begin(OperationKind::Enhancement)
            .map_err(EditorError::Busy)?;
        tracing::debug!(
            bytes = png.len(),
            has_prompt = prompt.is_some(),
            "Prepared enhancement request"
        );

        Ok(EnhanceJob {
            ticket,
            request: EnhanceRequest { image, prompt },
        })
    }

    /// Commit an enhancement result.
    ///
    /// The returned image already contains every overlay, so the scene is
    /// cleared and the new image loaded and fitted in its place. On failure
    /// the scene is untouched.
    pub fn finish_enhancement(
        &mut self,
        ticket: Ticket,
        result: Result<String, EnhanceError>,
    ) -> Result<Commit, EditorError> {
        if !self.gate.finish(ticket) {
            tracing::warn!("Discarding stale enhancement result");
            return Ok(Commit::Discarded);
        }

        let raster = result
            .map_err(EditorError::from)
            .and_then(|uri| Ok(decode_data_uri(&uri)?))
            .and_then(|data| Ok(self.codec.decode(&data.bytes)?))
            .inspect_err(|e| tracing::warn!(error = %e, "Enhancement failed"))?;

        self.params = FilterParams::default();
        self.install_image(raster);
        tracing::info!("Applied enhancement");
        Ok(Commit::Applied)
    }

    /// Run a full enhancement round trip through `enhancer`.
    pub async fn enhance<E: Enhancer>(
        &mut self,
        enhancer: &E,
        prompt: Option<String>,
    ) -> Result<Commit, EditorError> {
        let job = self.begin_enhancement(prompt)?;
        let (ticket, result) = job.run(enhancer).await;
        self.finish_enhancement(ticket, result)
    }
}

#[cfg(test)]
mod tests {
    use image::{Rgba, RgbaImage};

    use super::super::tests::{editor_800x450, solid};
    use super::*;
    use crate::encode::encode_raster;

    /// Answers with a fixed raster and records the prompt it saw.
    struct FixedEnhancer {
        answer: Result<String, u16>,
        seen: std::sync::Mutex<Option<EnhanceRequest>>,
    }

    impl FixedEnhancer {
        fn replying(raster: &RgbaImage) -> Self {
            let png = encode_raster(raster, ExportFormat::Png, 1.0).unwrap();
            Self {
                answer: Ok(encode_data_uri("image/png", &png)),
                seen: Default::default(),
            }
        }

        fn failing(status: u16) -> Self {
            Self {
                answer: Err(status),
                seen: Default::default(),
            }
        }
    }

    impl Enhancer for FixedEnhancer {
        async fn enhance(&self, request: &EnhanceRequest) -> Result<String, EnhanceError> {
            *self.seen.lock().unwrap() = Some(request.clone());
            match &self.answer {
                Ok(uri) => Ok(uri.clone()),
                Err(status) => crate::enhance::classify_response(*status, "not configured"),
            }
        }
    }

    #[tokio::test]
    async fn test_enhance_replaces_scene() {
        let mut editor = editor_800x450();
        editor.load_raster(solid(100, 100, [0, 0, 0, 255])).unwrap();
        editor.add_text().unwrap();

        let enhancer = FixedEnhancer::replying(&solid(400, 200, [9, 8, 7, 255]));
        let commit = editor
            .enhance(&enhancer, Some("brighter".to_string()))
            .await
            .unwrap();
        assert_eq!(commit, Commit::Applied);
        assert!(!editor.is_busy());

        let image = editor.active_image().unwrap();
        assert_eq!(image.natural_size(), (400, 200));
        assert!((image.scale_x - 2.0).abs() < 1e-12);
        assert_eq!(editor.scene().overlays().count(), 0);

        let seen = enhancer.seen.lock().unwrap().clone().unwrap();
        assert_eq!(seen.prompt.as_deref(), Some("brighter"));
        assert!(seen.image.starts_with("data:image/png;base64,"));
    }

    #[tokio::test]
    async fn test_request_carries_composite() {
        let mut editor = editor_800x450();
        editor.load_raster(solid(100, 100, [0, 0, 0, 255])).unwrap();
        let job = editor.begin_enhancement(None).unwrap();

        let data = decode_data_uri(&job.request().image).unwrap();
        let composite = crate::decode::decode_image(&data.bytes).unwrap();
        assert_eq!(composite.dimensions(), (800, 450));
        // Background either side of the fitted square
        assert_eq!(composite.get_pixel(10, 10), &Rgba([255, 255, 255, 255]));
        assert_eq!(composite.get_pixel(400, 225), &Rgba([0, 0, 0, 255]));
    }

    #[tokio::test]
    async fn test_not_configured_leaves_scene() {
        let mut editor = editor_800x450();
        editor.load_raster(solid(100, 100, [0, 0, 0, 255])).unwrap();
        let text = editor.add_text().unwrap();

        let err = editor
            .enhance(&FixedEnhancer::failing(501), None)
            .await
            .unwrap_err();
        assert!(matches!(err, EditorError::Enhance(EnhanceError::NotConfigured(_))));
        assert!(!editor.is_busy());
        assert_eq!(editor.active_image().unwrap().natural_size(), (100, 100));
        assert!(editor.scene().overlay(text).is_some());
    }

    #[test]
    fn test_bad_data_uri_leaves_scene() {
        let mut editor = editor_800x450();
        editor.load_raster(solid(100, 100, [0, 0, 0, 255])).unwrap();
        let ticket = editor.begin_enhancement(None).unwrap().ticket();

        let err = editor
            .finish_enhancement(ticket, Ok("data:image/png;base64,AAAA".to_string()))
            .unwrap_err();
        assert!(matches!(err, EditorError::Decode(_)));
        assert_eq!(editor.active_image().unwrap().natural_size(), (100, 100));
        assert!(!editor.is_busy());
    }

    #[test]
    fn test_cancelled_result_discarded() {
        let mut editor = editor_800x450();
        editor.load_raster(solid(100, 100, [0, 0, 0, 255])).unwrap();
        let ticket = editor.begin_enhancement(None).unwrap().ticket();
        editor.cancel_pending();

        let png = encode_raster(&solid(2, 2, [0, 0, 0, 255]), ExportFormat::Png, 1.0).unwrap();
        let commit = editor
            .finish_enhancement(ticket, Ok(encode_data_uri("image/png", &png)))
            .unwrap();
        assert_eq!(commit, Commit::Discarded);
        assert_eq!(editor.active_image().unwrap().natural_size(), (100, 100));
    }

    #[test]
    fn test_no_image() {
        let mut editor = editor_800x450();
        assert!(matches!(
            editor.begin_enhancement(None),
            Err(EditorError::NoImage)
        ));
    }
}
