//! In-memory scene model.
//!
//! A scene holds the viewport, a background colour, at most one active
//! [`ImageObject`] and an arena of overlays addressed by stable
//! [`OverlayId`]s. Overlays draw above the image in insertion order.
//!
//! Replacing the active image is a single move into the `image` slot, so
//! there is never a moment where two images (or none, mid-swap) are visible.

mod object;
mod overlay;

pub use object::{ImageObject, OriginX, OriginY};
pub use overlay::{CropSelection, Overlay, OverlayId, TextBox};

use std::collections::VecDeque;

use image::Rgba;

use crate::transform::Viewport;

/// The editable scene.
#[derive(Debug, Clone)]
pub struct Scene {
    viewport: Viewport,
    background: Rgba<u8>,
    image: Option<ImageObject>,
    /// Overlay slots; slot `i` holds id `first_id + i`.
    overlays: VecDeque<Option<Overlay>>,
    first_id: usize,
    selection: Option<OverlayId>,
}

impl Scene {
    pub fn new(viewport: Viewport, background: Rgba<u8>) -> Self {
        Self {
            viewport,
            background,
            image: None,
            overlays: VecDeque::new(),
            first_id: 0,
            selection: None,
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn background(&self) -> Rgba<u8> {
        self.background
    }

    pub fn set_background(&mut self, background: Rgba<u8>) {
        self.background = background;
    }

    pub fn image(&self) -> Option<&ImageObject> {
        self.image.as_ref()
    }

    pub fn image_mut(&mut self) -> Option<&mut ImageObject> {
        self.image.as_mut()
    }

    pub fn has_image(&self) -> bool {
        self.image.is_some()
    }

    /// Install a new active image, returning the one it replaced.
    pub fn replace_image(&mut self, image: ImageObject) -> Option<ImageObject> {
        self.image.replace(image)
    }

    /// Add a text overlay on top of everything drawn so far.
    pub fn add_text(&mut self, text: TextBox) -> OverlayId {
        self.push(Overlay::Text(text))
    }

    /// Add the crop selection. Returns `None` if one already exists.
    pub fn insert_selection(&mut self, selection: CropSelection) -> Option<OverlayId> {
        if self.selection.is_some() {
            return None;
        }
        let id = self.push(Overlay::CropSelection(selection));
        self.selection = Some(id);
        Some(id)
    }

    /// The current crop selection, if any.
    pub fn selection(&self) -> Option<(OverlayId, &CropSelection)> {
        let id = self.selection?;
        match self.overlay(id) {
            Some(Overlay::CropSelection(sel)) => Some((id, sel)),
            _ => None,
        }
    }

    pub fn selection_mut(&mut self) -> Option<&mut CropSelection> {
        let id = self.selection?;
        match self.overlay_mut(id) {
            Some(Overlay::CropSelection(sel)) => Some(sel),
            _ => None,
        }
    }

    /// Remove and return the crop selection.
    pub fn take_selection(&mut self) -> Option<CropSelection> {
        let id = self.selection?;
        match self.remove_overlay(id) {
            Some(Overlay::CropSelection(sel)) => Some(sel),
            _ => None,
        }
    }

    pub fn overlay(&self, id: OverlayId) -> Option<&Overlay> {
        let slot = id.0.checked_sub(self.first_id)?;
        self.overlays.get(slot).and_then(Option::as_ref)
    }

    pub fn overlay_mut(&mut self, id: OverlayId) -> Option<&mut Overlay> {
        let slot = id.0.checked_sub(self.first_id)?;
        self.overlays.get_mut(slot).and_then(Option::as_mut)
    }

    /// Remove an overlay. Its id is never reused.
    pub fn remove_overlay(&mut self, id: OverlayId) -> Option<Overlay> {
        let slot = id.0.checked_sub(self.first_id)?;
        let removed = self.overlays.get_mut(slot).and_then(Option::take);
        if self.selection == Some(id) {
            self.selection = None;
        }
        // Empty slots below the oldest live overlay can go
        while let Some(None) = self.overlays.front() {
            self.overlays.pop_front();
            self.first_id += 1;
        }
        removed
    }

    /// Live overlays in drawing order.
    pub fn overlays(&self) -> impl Iterator<Item = (OverlayId, &Overlay)> {
        self.overlays
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|o| (OverlayId(self.first_id + i), o)))
    }

    /// Remove every overlay, including the selection.
    ///
    /// Later ids continue past the cleared ones, so old ids stay dead.
    pub fn clear_overlays(&mut self) {
        self.first_id += self.overlays.len();
        self.overlays.clear();
        self.selection = None;
    }

    /// Remove the image and all overlays. The viewport and background stay.
    pub fn clear(&mut self) {
        self.image = None;
        self.clear_overlays();
    }

    fn push(&mut self, overlay: Overlay) -> OverlayId {
        self.overlays.push_back(Some(overlay));
        OverlayId(self.first_id + self.overlays.len() - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;

    fn scene() -> Scene {
        Scene::new(Viewport::new(800, 450), Rgba([255, 255, 255, 255]))
    }

    fn text(label: &str) -> TextBox {
        TextBox {
            text: label.to_string(),
            left: 0.0,
            top: 0.0,
            font_size: 36.0,
            fill: [0, 0, 0, 255],
        }
    }

    #[test]
    fn test_replace_image_returns_previous() {
        let mut scene = scene();
        assert!(scene.replace_image(ImageObject::new(RgbaImage::new(2, 2))).is_none());
        let old = scene.replace_image(ImageObject::new(RgbaImage::new(3, 3)));
        assert_eq!(old.map(|i| i.natural_size()), Some((2, 2)));
        assert_eq!(scene.image().map(|i| i.natural_size()), Some((3, 3)));
    }

    #[test]
    fn test_single_selection() {
        let mut scene = scene();
        let first = scene.insert_selection(CropSelection::new(0.0, 0.0, 10.0, 10.0));
        assert!(first.is_some());
        assert!(scene
            .insert_selection(CropSelection::new(5.0, 5.0, 10.0, 10.0))
            .is_none());
        assert_eq!(scene.overlays().count(), 1);
    }

    #[test]
    fn test_take_selection_frees_slot() {
        let mut scene = scene();
        scene.insert_selection(CropSelection::new(1.0, 2.0, 3.0, 4.0));
        let taken = scene.take_selection().unwrap();
        assert_eq!(taken.left, 1.0);
        assert!(scene.selection().is_none());
        assert!(scene
            .insert_selection(CropSelection::new(0.0, 0.0, 1.0, 1.0))
            .is_some());
    }

    #[test]
    fn test_ids_stable_after_removal() {
        let mut scene = scene();
        let a = scene.add_text(text("a"));
        let b = scene.add_text(text("b"));
        let c = scene.add_text(text("c"));

        scene.remove_overlay(b);
        assert!(scene.overlay(b).is_none());
        assert_eq!(scene.overlay(a).and_then(Overlay::as_text).unwrap().text, "a");
        assert_eq!(scene.overlay(c).and_then(Overlay::as_text).unwrap().text, "c");

        let ids: Vec<_> = scene.overlays().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![a, c]);

        // New overlays never reuse a removed slot
        let d = scene.add_text(text("d"));
        assert_ne!(d, b);
    }

    #[test]
    fn test_removing_selection_by_id() {
        let mut scene = scene();
        let id = scene
            .insert_selection(CropSelection::new(0.0, 0.0, 1.0, 1.0))
            .unwrap();
        scene.remove_overlay(id);
        assert!(scene.selection().is_none());
    }

    #[test]
    fn test_clear_keeps_viewport() {
        let mut scene = scene();
        scene.replace_image(ImageObject::new(RgbaImage::new(2, 2)));
        let old = scene.add_text(text("x"));
        scene.clear();
        assert!(!scene.has_image());
        assert_eq!(scene.overlays().count(), 0);
        assert_eq!(scene.viewport(), Viewport::new(800, 450));

        let fresh = scene.add_text(text("y"));
        assert_ne!(fresh, old);
        assert!(scene.overlay(old).is_none());
    }

    #[test]
    fn test_empty_slots_reclaimed() {
        let mut scene = scene();
        for _ in 0..100 {
            scene.insert_selection(CropSelection::new(0.0, 0.0, 1.0, 1.0));
            scene.take_selection();
        }
        assert_eq!(scene.overlays.len(), 0);

        let kept = scene.add_text(text("kept"));
        let gone = scene.add_text(text("gone"));
        scene.remove_overlay(kept);
        // Only the slot below the oldest live overlay is dropped
        assert_eq!(scene.overlays.len(), 1);
        assert!(scene.overlay(kept).is_none());
        assert_eq!(scene.overlay(gone).and_then(Overlay::as_text).unwrap().text, "gone");
        assert_eq!(scene.overlays().map(|(id, _)| id).collect::<Vec<_>>(), vec![gone]);

        for _ in 0..10 {
            scene.add_text(text("more"));
        }
        scene.clear_overlays();
        assert_eq!(scene.overlays.len(), 0);
        let next = scene.add_text(text("next"));
        assert!(next.index() > gone.index());
        assert!(scene.overlay(gone).is_none());
    }
}
