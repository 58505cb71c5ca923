//! Export of the composited scene.

use std::path::{Path, PathBuf};

use crate::backend::{Codec, Renderer};
use crate::encode::ExportFormat;
use crate::error::EditorError;

use super::Editor;

/// An encoded export, ready to hand to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    /// `edited.<ext>`
    pub file_name: String,
    pub mime: &'static str,
    pub format: ExportFormat,
    pub bytes: Vec<u8>,
}

impl ExportArtifact {
    fn new(format: ExportFormat, bytes: Vec<u8>) -> Self {
        Self {
            file_name: format!("edited.{}", format.extension()),
            mime: format.mime(),
            format,
            bytes,
        }
    }

    /// Write the artifact into `dir` under its file name.
    pub fn save(&self, dir: impl AsRef<Path>) -> Result<PathBuf, EditorError> {
        let path = dir.as_ref().join(&self.file_name);
        std::fs::write(&path, &self.bytes)
            .inspect_err(|e| tracing::warn!(path = %path.display(), error = %e, "Saving export failed"))?;
        tracing::info!(path = %path.display(), bytes = self.bytes.len(), "Saved export");
        Ok(path)
    }
}

impl<R: Renderer, C: Codec> Editor<R, C> {
    /// Encode the composited scene (without the crop selection).
    ///
    /// Quality is clamped into `[0.5, 1.0]` and only affects JPEG.
    pub fn export(&self, format: ExportFormat, quality: f32) -> Result<ExportArtifact, EditorError> {
        let composite = self.render_composite()?;
        let bytes = self.codec.encode(&composite, format, quality)?;
        tracing::debug!(%format, quality, bytes = bytes.len(), "Exported scene");
        Ok(ExportArtifact::new(format, bytes))
    }

    /// Export with the configured format and quality.
    pub fn export_default(&self) -> Result<ExportArtifact, EditorError> {
        self.export(self.config.export_format, self.config.export_quality)
    }
}

#[cfg(test)]
mod tests {
    use image::Rgba;

    use super::super::tests::{editor_800x450, editor_with_font, inked, solid};
    use super::*;
    use crate::decode::decode_image;

    fn gradient_editor() -> Editor {
        let mut editor = editor_800x450();
        let raster = image::RgbaImage::from_fn(160, 90, |x, y| {
            Rgba([(x * 3 % 256) as u8, (y * 5 % 256) as u8, ((x ^ y) % 256) as u8, 255])
        });
        editor.load_raster(raster).unwrap();
        editor
    }

    #[test]
    fn test_png_ignores_quality() {
        let editor = gradient_editor();
        let low = editor.export(ExportFormat::Png, 0.5).unwrap();
        let high = editor.export(ExportFormat::Png, 1.0).unwrap();
        assert_eq!(low.bytes, high.bytes);
        assert_eq!(low.file_name, "edited.png");
        assert_eq!(low.mime, "image/png");
    }

    #[test]
    fn test_jpeg_quality_changes_bytes() {
        let editor = gradient_editor();
        let low = editor.export(ExportFormat::Jpeg, 0.5).unwrap();
        let high = editor.export(ExportFormat::Jpeg, 1.0).unwrap();
        assert_ne!(low.bytes, high.bytes);
        assert_eq!(decode_image(&low.bytes).unwrap().dimensions(), (800, 450));
        assert_eq!(decode_image(&high.bytes).unwrap().dimensions(), (800, 450));
        assert_eq!(high.file_name, "edited.jpeg");
    }

    #[test]
    fn test_webp_export() {
        let editor = gradient_editor();
        let artifact = editor.export(ExportFormat::WebP, 0.92).unwrap();
        assert_eq!(artifact.file_name, "edited.webp");
        assert_eq!(artifact.mime, "image/webp");
        assert_eq!(decode_image(&artifact.bytes).unwrap().dimensions(), (800, 450));
    }

    #[test]
    fn test_export_excludes_selection() {
        let mut editor = editor_800x450();
        editor.load_raster(solid(10, 10, [0, 0, 0, 255])).unwrap();
        let before = editor.export(ExportFormat::Png, 1.0).unwrap();
        editor.start_crop().unwrap();
        let after = editor.export(ExportFormat::Png, 1.0).unwrap();
        assert_eq!(before.bytes, after.bytes);
    }

    #[test]
    fn test_export_includes_text() {
        let mut editor = editor_with_font();
        editor.load_raster(solid(1600, 900, [255, 255, 255, 255])).unwrap();
        let before = decode_image(&editor.export(ExportFormat::Png, 1.0).unwrap().bytes).unwrap();
        assert_eq!(inked(&before), 0);

        editor.add_text_with("Hello").unwrap();
        let after = decode_image(&editor.export(ExportFormat::Png, 1.0).unwrap().bytes).unwrap();
        assert!(inked(&after) > 50);
        // Drawn around the viewport center
        let near_center = image::imageops::crop_imm(&after, 300, 175, 200, 100).to_image();
        assert_eq!(inked(&near_center), inked(&after));
    }

    #[test]
    fn test_export_default_uses_config() {
        let editor = gradient_editor();
        let artifact = editor.export_default().unwrap();
        assert_eq!(artifact.format, ExportFormat::Png);
    }

    #[test]
    fn test_save_writes_file() {
        let editor = gradient_editor();
        let artifact = editor.export(ExportFormat::Png, 1.0).unwrap();
        let dir = std::env::temp_dir().join(format!("easel-export-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        let path = artifact.save(&dir).unwrap();
        assert_eq!(path.file_name().unwrap(), "edited.png");
        assert_eq!(std::fs::read(&path).unwrap(), artifact.bytes);
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_save_into_missing_dir_fails() {
        let editor = gradient_editor();
        let artifact = editor.export(ExportFormat::Png, 1.0).unwrap();
        let dir = std::env::temp_dir().join(format!("easel-missing-{}/nested", std::process::id()));

        assert!(matches!(artifact.save(&dir), Err(EditorError::Io(_))));
    }
}
