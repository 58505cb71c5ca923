//! Software compositor.
//!
//! Draws, in order: the background colour, the active image (filtered,
//! placed by its origin and scale), then overlays in insertion order.
//!
//! # Algorithm
//!
//! The image is drawn by inverse mapping: for every canvas pixel whose
//! center falls inside the image's displayed bounds, the matching source
//! position is
//! ```text
//! src_x = (dst_x + 0.5 - bounds.left) / scale_x - 0.5
//! src_y = (dst_y + 0.5 - bounds.top) / scale_y - 0.5
//! ```
//! and sampled bilinearly with edge clamping, then blended source-over.
//! At scale 1 on whole-pixel bounds this copies source pixels exactly.

use ab_glyph::{Font, FontArc, PxScale, ScaleFont};
use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_text_mut, text_size};

use crate::backend::{RenderError, RenderOptions, Renderer};
use crate::decode::{self, FilterType};
use crate::scene::{CropSelection, ImageObject, Overlay, Scene, TextBox};

/// Selection fill, blue at 10% opacity.
const SELECTION_FILL: Rgba<u8> = Rgba([59, 130, 246, 26]);

/// Selection stroke colour.
const SELECTION_STROKE: Rgba<u8> = Rgba([37, 99, 235, 255]);

const SELECTION_STROKE_WIDTH: i64 = 2;

/// CPU renderer built on the `image` and `imageproc` crates.
///
/// Text overlays need a font. Without one they are skipped.
#[derive(Clone, Default)]
pub struct CpuRenderer {
    font: Option<FontArc>,
}

impl std::fmt::Debug for CpuRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CpuRenderer")
            .field("has_font", &self.font.is_some())
            .finish()
    }
}

impl CpuRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_font(font: FontArc) -> Self {
        Self { font: Some(font) }
    }

    /// Load a TrueType/OpenType font for text overlays.
    pub fn with_font_bytes(bytes: Vec<u8>) -> Result<Self, RenderError> {
        let font = FontArc::try_from_vec(bytes).map_err(|e| RenderError::InvalidFont(e.to_string()))?;
        Ok(Self::with_font(font))
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }
}

impl Renderer for CpuRenderer {
    fn render_scene(
        &self,
        scene: &Scene,
        options: RenderOptions,
    ) -> Result<RgbaImage, RenderError> {
        let viewport = scene.viewport();
        let mut canvas = RgbaImage::from_pixel(viewport.width, viewport.height, scene.background());

        if let Some(image) = scene.image() {
            draw_image(&mut canvas, image);
        }

        for (id, overlay) in scene.overlays() {
            match overlay {
                Overlay::Text(text) => match &self.font {
                    Some(font) => draw_text_box(&mut canvas, font, text),
                    None => tracing::debug!(%id, "No font loaded, skipping text overlay"),
                },
                Overlay::CropSelection(sel) if options.draw_selection => {
                    draw_selection(&mut canvas, sel)
                }
                Overlay::CropSelection(_) => {}
            }
        }

        Ok(canvas)
    }

    fn render_image(
        &self,
        image: &ImageObject,
        width: u32,
        height: u32,
    ) -> Result<RgbaImage, RenderError> {
        let (natural_w, natural_h) = image.natural_size();
        // Shrinking keeps edges crisp for the matte; growing stays smooth
        let filter = if width < natural_w || height < natural_h {
            FilterType::Lanczos3
        } else {
            FilterType::Bilinear
        };
        Ok(decode::resize(image.pixels(), width, height, filter)?)
    }
}

/// Draw an image object onto the canvas at its placement.
fn draw_image(canvas: &mut RgbaImage, image: &ImageObject) {
    let (sx, sy) = (image.scale_x, image.scale_y);
    if !(sx.is_finite() && sy.is_finite() && sx > 0.0 && sy > 0.0) {
        tracing::warn!(sx, sy, "Skipping image with degenerate scale");
        return;
    }

    let pixels = image.pixels();
    let bounds = image.bounds();
    let (cw, ch) = (canvas.width() as i64, canvas.height() as i64);

    // Canvas pixels whose centers fall inside the bounds
    let x_start = ((bounds.left - 0.5).ceil() as i64).clamp(0, cw);
    let x_end = ((bounds.left + bounds.width - 0.5).ceil() as i64).clamp(0, cw);
    let y_start = ((bounds.top - 0.5).ceil() as i64).clamp(0, ch);
    let y_end = ((bounds.top + bounds.height - 0.5).ceil() as i64).clamp(0, ch);

    for y in y_start..y_end {
        let src_y = (y as f64 + 0.5 - bounds.top) / sy - 0.5;
        for x in x_start..x_end {
            let src_x = (x as f64 + 0.5 - bounds.left) / sx - 0.5;
            let src = sample_bilinear(pixels, src_x, src_y);
            let dst = canvas.get_pixel_mut(x as u32, y as u32);
            *dst = blend_over(*dst, src);
        }
    }
}

/// Sample a pixel using bilinear interpolation, clamping to the edges.
fn sample_bilinear(image: &RgbaImage, x: f64, y: f64) -> Rgba<u8> {
    let max_x = image.width().saturating_sub(1) as f64;
    let max_y = image.height().saturating_sub(1) as f64;
    let x = x.clamp(0.0, max_x);
    let y = y.clamp(0.0, max_y);

    let x0 = x.floor();
    let y0 = y.floor();
    let fx = x - x0;
    let fy = y - y0;

    let (x0, y0) = (x0 as u32, y0 as u32);
    let x1 = (x0 + 1).min(max_x as u32);
    let y1 = (y0 + 1).min(max_y as u32);

    // Exact hit, no interpolation needed
    if fx == 0.0 && fy == 0.0 {
        return *image.get_pixel(x0, y0);
    }

    let p00 = image.get_pixel(x0, y0);
    let p10 = image.get_pixel(x1, y0);
    let p01 = image.get_pixel(x0, y1);
    let p11 = image.get_pixel(x1, y1);

    let mut result = [0u8; 4];
    for (i, out) in result.iter_mut().enumerate() {
        let v = p00[i] as f64 * (1.0 - fx) * (1.0 - fy)
            + p10[i] as f64 * fx * (1.0 - fy)
            + p01[i] as f64 * (1.0 - fx) * fy
            + p11[i] as f64 * fx * fy;
        *out = v.round().clamp(0.0, 255.0) as u8;
    }
    Rgba(result)
}

/// Source-over compositing of straight-alpha pixels.
fn blend_over(dst: Rgba<u8>, src: Rgba<u8>) -> Rgba<u8> {
    match src[3] {
        255 => return src,
        0 => return dst,
        _ => {}
    }

    let sa = src[3] as f32 / 255.0;
    let da = dst[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);

    let mut out = [0u8; 4];
    for c in 0..3 {
        let v = (src[c] as f32 * sa + dst[c] as f32 * da * (1.0 - sa)) / out_a;
        out[c] = v.round().clamp(0.0, 255.0) as u8;
    }
    out[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
    Rgba(out)
}

/// Draw a text box centered on its anchor. Lines split on `\n`.
fn draw_text_box(canvas: &mut RgbaImage, font: &FontArc, text: &TextBox) {
    if text.text.is_empty() || text.font_size <= 0.0 {
        return;
    }

    let scale = PxScale::from(text.font_size);
    let scaled = font.as_scaled(scale);
    let line_height = (scaled.height() + scaled.line_gap()).ceil() as i32;
    let lines: Vec<&str> = text.text.lines().collect();
    let block_height = line_height * lines.len() as i32;
    let top = (text.top - block_height as f64 / 2.0).round() as i32;
    let color = Rgba(text.fill);

    for (i, line) in lines.iter().enumerate() {
        let (w, _) = text_size(scale, font, line);
        let x = (text.left - w as f64 / 2.0).round() as i32;
        draw_text_mut(canvas, color, x, top + i as i32 * line_height, scale, font, line);
    }
}

/// Draw the crop selection: translucent fill plus a solid stroke.
fn draw_selection(canvas: &mut RgbaImage, selection: &CropSelection) {
    let bbox = selection.bounding_box();
    let (cw, ch) = (canvas.width() as i64, canvas.height() as i64);

    let x0 = (bbox.left.round() as i64).clamp(0, cw);
    let y0 = (bbox.top.round() as i64).clamp(0, ch);
    let x1 = ((bbox.left + bbox.width).round() as i64).clamp(0, cw);
    let y1 = ((bbox.top + bbox.height).round() as i64).clamp(0, ch);

    let left = bbox.left.round() as i64;
    let top = bbox.top.round() as i64;
    let right = (bbox.left + bbox.width).round() as i64;
    let bottom = (bbox.top + bbox.height).round() as i64;

    for y in y0..y1 {
        for x in x0..x1 {
            let on_stroke = x < left + SELECTION_STROKE_WIDTH
                || x >= right - SELECTION_STROKE_WIDTH
                || y < top + SELECTION_STROKE_WIDTH
                || y >= bottom - SELECTION_STROKE_WIDTH;
            let dst = canvas.get_pixel_mut(x as u32, y as u32);
            *dst = if on_stroke {
                SELECTION_STROKE
            } else {
                blend_over(*dst, SELECTION_FILL)
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::OriginX;
    use crate::transform::{fit, Viewport};

    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

    fn scene(width: u32, height: u32) -> Scene {
        Scene::new(Viewport::new(width, height), WHITE)
    }

    fn checker(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x * 10) as u8, (y * 10) as u8, ((x + y) % 2 * 255) as u8, 255])
        })
    }

    #[test]
    fn test_empty_scene_is_background() {
        let out = CpuRenderer::new()
            .render_scene(&scene(20, 10), RenderOptions::composite())
            .unwrap();
        assert_eq!(out.dimensions(), (20, 10));
        assert!(out.pixels().all(|p| *p == WHITE));
    }

    #[test]
    fn test_unit_scale_copies_pixels_exactly() {
        let mut scene = scene(20, 20);
        let source = checker(10, 6);
        let mut image = ImageObject::new(source.clone());
        // Center at (10, 10): bounds start at (5, 7)
        image.left = 10.0;
        image.top = 10.0;
        scene.replace_image(image);

        let out = CpuRenderer::new()
            .render_scene(&scene, RenderOptions::composite())
            .unwrap();
        for y in 0..6 {
            for x in 0..10 {
                assert_eq!(out.get_pixel(x + 5, y + 7), source.get_pixel(x, y));
            }
        }
        assert_eq!(out.get_pixel(4, 7), &WHITE);
        assert_eq!(out.get_pixel(15, 7), &WHITE);
    }

    #[test]
    fn test_fitted_image_covers_letterbox() {
        let mut scene = scene(800, 450);
        let mut image = ImageObject::new(RgbaImage::from_pixel(2000, 1000, Rgba([0, 0, 0, 255])));
        image.place(fit(2000, 1000, scene.viewport()));
        scene.replace_image(image);

        let out = CpuRenderer::new()
            .render_scene(&scene, RenderOptions::composite())
            .unwrap();
        // Letterbox bands above and below the 800x400 image
        assert_eq!(out.get_pixel(400, 10), &WHITE);
        assert_eq!(out.get_pixel(400, 440), &WHITE);
        assert_eq!(out.get_pixel(0, 25), &Rgba([0, 0, 0, 255]));
        assert_eq!(out.get_pixel(799, 424), &Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn test_image_partly_offscreen() {
        let mut scene = scene(10, 10);
        let mut image = ImageObject::new(RgbaImage::from_pixel(10, 10, Rgba([1, 2, 3, 255])));
        image.origin_x = OriginX::Left;
        image.left = 5.0;
        image.top = 5.0;
        scene.replace_image(image);

        let out = CpuRenderer::new()
            .render_scene(&scene, RenderOptions::composite())
            .unwrap();
        assert_eq!(out.get_pixel(4, 5), &WHITE);
        assert_eq!(out.get_pixel(5, 5), &Rgba([1, 2, 3, 255]));
        assert_eq!(out.get_pixel(9, 9), &Rgba([1, 2, 3, 255]));
    }

    #[test]
    fn test_transparent_pixels_show_background() {
        let mut scene = scene(4, 4);
        let mut image = ImageObject::new(RgbaImage::from_pixel(4, 4, Rgba([0, 0, 0, 0])));
        image.left = 2.0;
        image.top = 2.0;
        scene.replace_image(image);

        let out = CpuRenderer::new()
            .render_scene(&scene, RenderOptions::composite())
            .unwrap();
        assert!(out.pixels().all(|p| *p == WHITE));
    }

    #[test]
    fn test_selection_only_in_preview() {
        let mut scene = scene(50, 50);
        scene.insert_selection(CropSelection::new(10.0, 10.0, 20.0, 20.0));
        let renderer = CpuRenderer::new();

        let composite = renderer
            .render_scene(&scene, RenderOptions::composite())
            .unwrap();
        assert!(composite.pixels().all(|p| *p == WHITE));

        let preview = renderer.render_scene(&scene, RenderOptions::preview()).unwrap();
        assert_eq!(preview.get_pixel(10, 10), &SELECTION_STROKE);
        let inner = preview.get_pixel(20, 20);
        assert!(inner[0] < 255 && inner[2] > inner[0]);
        assert_eq!(preview.get_pixel(35, 35), &WHITE);
    }

    #[test]
    fn test_text_skipped_without_font() {
        let mut scene = scene(30, 30);
        scene.add_text(TextBox {
            text: "Hi".to_string(),
            left: 15.0,
            top: 15.0,
            font_size: 12.0,
            fill: [0, 0, 0, 255],
        });
        let out = CpuRenderer::new()
            .render_scene(&scene, RenderOptions::composite())
            .unwrap();
        assert!(out.pixels().all(|p| *p == WHITE));
    }

    #[test]
    fn test_text_drawn_with_font() {
        let mut scene = scene(60, 30);
        scene.add_text(TextBox {
            text: "Hi".to_string(),
            left: 30.0,
            top: 15.0,
            font_size: 20.0,
            fill: [0, 0, 0, 255],
        });
        let renderer = CpuRenderer::with_font_bytes(crate::TEST_FONT.to_vec()).unwrap();
        assert!(renderer.has_font());

        let out = renderer
            .render_scene(&scene, RenderOptions::composite())
            .unwrap();
        let inked: Vec<(u32, u32)> = out
            .enumerate_pixels()
            .filter(|(_, _, p)| p[0] < 128)
            .map(|(x, y, _)| (x, y))
            .collect();
        assert!(inked.len() > 10);
        // Glyphs sit around the anchor, not in the corners
        assert!(inked.iter().all(|&(x, y)| (10..50).contains(&x) && (2..28).contains(&y)));
        assert_eq!(out.get_pixel(0, 0), &WHITE);
    }

    #[test]
    fn test_multiline_text_stacks_lines() {
        let mut scene = scene(60, 80);
        scene.add_text(TextBox {
            text: "I\nI".to_string(),
            left: 30.0,
            top: 40.0,
            font_size: 20.0,
            fill: [0, 0, 0, 255],
        });
        let renderer = CpuRenderer::with_font_bytes(crate::TEST_FONT.to_vec()).unwrap();
        let out = renderer
            .render_scene(&scene, RenderOptions::composite())
            .unwrap();

        let inked_rows: Vec<u32> = (0..80)
            .filter(|&y| (0..60).any(|x| out.get_pixel(x, y)[0] < 128))
            .collect();
        // Both lines drawn, one above and one below the anchor
        assert!(inked_rows.iter().any(|&y| y < 40));
        assert!(inked_rows.iter().any(|&y| y > 40));
    }

    #[test]
    fn test_invalid_font_bytes() {
        let result = CpuRenderer::with_font_bytes(vec![1, 2, 3]);
        assert!(matches!(result, Err(RenderError::InvalidFont(_))));
    }

    #[test]
    fn test_render_image_resizes_filtered_pixels() {
        let mut image = ImageObject::new(RgbaImage::from_pixel(40, 20, Rgba([10, 10, 10, 255])));
        image.set_filters(vec![crate::filters::Filter::Invert]);
        let out = CpuRenderer::new().render_image(&image, 20, 10).unwrap();
        assert_eq!(out.dimensions(), (20, 10));
        assert_eq!(out.get_pixel(5, 5), &Rgba([245, 245, 245, 255]));
    }

    #[test]
    fn test_render_image_shrink_keeps_hard_edge() {
        // Black left half, white right half
        let source = RgbaImage::from_fn(80, 40, |x, _| {
            if x < 40 {
                Rgba([0, 0, 0, 255])
            } else {
                WHITE
            }
        });
        let image = ImageObject::new(source);
        let out = CpuRenderer::new().render_image(&image, 20, 10).unwrap();

        assert_eq!(out.dimensions(), (20, 10));
        assert!(out.get_pixel(2, 5)[0] < 8);
        assert!(out.get_pixel(17, 5)[0] > 247);
    }

    #[test]
    fn test_blend_over() {
        let half = Rgba([0, 0, 0, 128]);
        let out = blend_over(WHITE, half);
        assert_eq!(out[3], 255);
        assert!(out[0] > 120 && out[0] < 130);

        assert_eq!(blend_over(WHITE, Rgba([9, 9, 9, 0])), WHITE);
    }

    #[test]
    fn test_sample_bilinear_midpoint() {
        let img = RgbaImage::from_fn(2, 1, |x, _| Rgba([(x * 200) as u8, 0, 0, 255]));
        assert_eq!(sample_bilinear(&img, 0.5, 0.0)[0], 100);
        assert_eq!(sample_bilinear(&img, -3.0, 0.0)[0], 0);
        assert_eq!(sample_bilinear(&img, 9.0, 0.0)[0], 200);
    }
}
