//! Gallery view-state shared by listing cards and the car detail page.
//!
//! A car's photos arrive grouped by category (Exterior, Interior, Tyres, ...).
//! The gallery flattens those groups into one ordered slide sequence, keeps a
//! current index, and maps between "selected category" and "selected slide"
//! in both directions. Navigation is circular and never fails: an empty photo
//! set is replaced by a single fallback slide.

use crate::models::ImageCategory;

/// One (category, image) pair in the flattened sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slide {
    /// Index into the displayable category list this slide came from.
    pub category: usize,
    pub image: String,
}

/// Horizontal movement must exceed this many pixels to count as a swipe.
pub const SWIPE_THRESHOLD_PX: f32 = 40.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeDirection {
    Next,
    Previous,
}

/// Maps a horizontal touch gesture to a navigation step. Returns `None` for
/// gestures at or below the threshold (taps, vertical scrolls picked up as
/// small horizontal drift).
pub fn resolve_swipe(start_x: f32, end_x: f32) -> Option<SwipeDirection> {
    let delta = end_x - start_x;
    if delta.abs() <= SWIPE_THRESHOLD_PX {
        return None;
    }
    if delta < 0.0 {
        Some(SwipeDirection::Next) // dragged left, reveal the next slide
    } else {
        Some(SwipeDirection::Previous)
    }
}

/// Keys handled while the full-screen gallery modal is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GalleryKey {
    Escape,
    ArrowLeft,
    ArrowRight,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    /// Close the modal; the inline viewer keeps the current index.
    Close,
    Moved,
    Ignored,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Gallery {
    slides: Vec<Slide>,
    current: usize,
    category_labels: Vec<String>,
}

impl Gallery {
    /// Flattens the category groups into slides, category order first, then
    /// within-category image order. Empty categories are dropped. When no
    /// image survives, a single slide holding `fallback` is produced so the
    /// invariant `len() >= 1` always holds.
    pub fn from_categories(categories: &[ImageCategory], fallback: &str) -> Self {
        let mut slides = Vec::new();
        let mut category_labels = Vec::new();
        for category in categories.iter().filter(|c| !c.images.is_empty()) {
            let index = category_labels.len();
            category_labels.push(category.label.clone());
            for image in &category.images {
                slides.push(Slide {
                    category: index,
                    image: image.clone(),
                });
            }
        }
        if slides.is_empty() {
            slides.push(Slide {
                category: 0,
                image: fallback.to_string(),
            });
            category_labels.clear();
        }
        Self {
            slides,
            current: 0,
            category_labels,
        }
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    pub fn category_labels(&self) -> &[String] {
        &self.category_labels
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current(&self) -> &Slide {
        &self.slides[self.current]
    }

    /// Category the current slide originated from.
    pub fn current_category(&self) -> usize {
        self.current().category
    }

    /// Navigation chrome (arrows, counters) only makes sense with more than
    /// one slide.
    pub fn show_controls(&self) -> bool {
        self.slides.len() > 1
    }

    /// Sets the current index directly, clamped into range by wraparound.
    pub fn select(&mut self, index: usize) {
        self.current = index % self.slides.len();
    }

    /// Jumps to the first slide showing `image` (thumbnail click); falls
    /// back to the first slide when the image is unknown. Linear scan is
    /// fine: galleries hold tens of slides, not thousands.
    pub fn select_by_image(&mut self, image: &str) {
        self.current = self
            .slides
            .iter()
            .position(|s| s.image == image)
            .unwrap_or(0);
    }

    /// Jumps to the first slide of category `k`; falls back to slide 0 when
    /// no slide has that origin.
    pub fn select_category(&mut self, category: usize) {
        self.current = self
            .slides
            .iter()
            .position(|s| s.category == category)
            .unwrap_or(0);
    }

    /// Advances with wraparound. No-op on a single slide.
    pub fn next(&mut self) {
        if self.slides.len() > 1 {
            self.current = (self.current + 1) % self.slides.len();
        }
    }

    /// Retreats with wraparound. No-op on a single slide.
    pub fn previous(&mut self) {
        if self.slides.len() > 1 {
            self.current = (self.current + self.slides.len() - 1) % self.slides.len();
        }
    }

    /// Keyboard handling for the modal viewer.
    pub fn handle_key(&mut self, key: GalleryKey) -> KeyOutcome {
        match key {
            GalleryKey::Escape => KeyOutcome::Close,
            GalleryKey::ArrowRight => {
                self.next();
                KeyOutcome::Moved
            }
            GalleryKey::ArrowLeft => {
                self.previous();
                KeyOutcome::Moved
            }
            GalleryKey::Other => KeyOutcome::Ignored,
        }
    }

    /// Touch handling: applies a resolved swipe, ignoring sub-threshold
    /// gestures.
    pub fn handle_swipe(&mut self, start_x: f32, end_x: f32) -> bool {
        match resolve_swipe(start_x, end_x) {
            Some(SwipeDirection::Next) => {
                self.next();
                true
            }
            Some(SwipeDirection::Previous) => {
                self.previous();
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category(label: &str, images: &[&str]) -> ImageCategory {
        ImageCategory {
            label: label.to_string(),
            images: images.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn sample_gallery() -> Gallery {
        Gallery::from_categories(
            &[
                category("Exterior", &["e1.jpg", "e2.jpg"]),
                category("Interior", &["i1.jpg"]),
                category("Tyres", &["t1.jpg", "t2.jpg", "t3.jpg"]),
            ],
            "placeholder.png",
        )
    }

    #[test]
    fn flatten_preserves_category_then_image_order() {
        let gallery = sample_gallery();
        assert_eq!(gallery.len(), 6); // 2 + 1 + 3
        let images: Vec<&str> = gallery.slides().iter().map(|s| s.image.as_str()).collect();
        assert_eq!(images, ["e1.jpg", "e2.jpg", "i1.jpg", "t1.jpg", "t2.jpg", "t3.jpg"]);
        let categories: Vec<usize> = gallery.slides().iter().map(|s| s.category).collect();
        assert_eq!(categories, [0, 0, 1, 2, 2, 2]);
    }

    #[test]
    fn empty_categories_are_dropped_before_flattening() {
        let gallery = Gallery::from_categories(
            &[
                category("Exterior", &["e1.jpg"]),
                category("Interior", &[]),
                category("Tyres", &["t1.jpg"]),
            ],
            "placeholder.png",
        );
        assert_eq!(gallery.len(), 2);
        assert_eq!(gallery.category_labels(), ["Exterior", "Tyres"]);
        // "Tyres" became category 1 after the empty group was dropped
        assert_eq!(gallery.slides()[1].category, 1);
    }

    #[test]
    fn no_images_falls_back_to_single_placeholder_slide() {
        let gallery = Gallery::from_categories(&[], "placeholder.png");
        assert_eq!(gallery.len(), 1);
        assert_eq!(gallery.current().image, "placeholder.png");
        assert!(!gallery.show_controls());
    }

    #[test]
    fn next_then_previous_returns_to_start() {
        let mut gallery = sample_gallery();
        for start in 0..gallery.len() {
            gallery.select(start);
            gallery.next();
            gallery.previous();
            assert_eq!(gallery.current_index(), start);
        }
    }

    #[test]
    fn navigation_wraps_around() {
        let mut gallery = sample_gallery();
        gallery.select(gallery.len() - 1);
        gallery.next();
        assert_eq!(gallery.current_index(), 0);
        gallery.previous();
        assert_eq!(gallery.current_index(), gallery.len() - 1);
    }

    #[test]
    fn single_slide_navigation_is_a_no_op() {
        let mut gallery = Gallery::from_categories(&[], "placeholder.png");
        gallery.next();
        gallery.previous();
        assert_eq!(gallery.current_index(), 0);
    }

    #[test]
    fn select_category_lands_on_first_slide_of_that_origin() {
        let mut gallery = sample_gallery();
        gallery.select_category(2);
        assert_eq!(gallery.current_index(), 3);
        assert_eq!(gallery.current_category(), 2);
    }

    #[test]
    fn select_unknown_category_falls_back_to_first_slide() {
        let mut gallery = sample_gallery();
        gallery.select(4);
        gallery.select_category(9);
        assert_eq!(gallery.current_index(), 0);
    }

    #[test]
    fn select_by_image_finds_first_occurrence_or_defaults() {
        let mut gallery = sample_gallery();
        gallery.select_by_image("t2.jpg");
        assert_eq!(gallery.current_index(), 4);
        gallery.select_by_image("missing.jpg");
        assert_eq!(gallery.current_index(), 0);
    }

    #[test]
    fn keyboard_maps_arrows_and_escape() {
        let mut gallery = sample_gallery();
        assert_eq!(gallery.handle_key(GalleryKey::ArrowRight), KeyOutcome::Moved);
        assert_eq!(gallery.current_index(), 1);
        assert_eq!(gallery.handle_key(GalleryKey::ArrowLeft), KeyOutcome::Moved);
        assert_eq!(gallery.current_index(), 0);
        assert_eq!(gallery.handle_key(GalleryKey::Escape), KeyOutcome::Close);
        assert_eq!(gallery.handle_key(GalleryKey::Other), KeyOutcome::Ignored);
    }

    #[test]
    fn swipe_respects_threshold_and_direction() {
        assert_eq!(resolve_swipe(200.0, 100.0), Some(SwipeDirection::Next));
        assert_eq!(resolve_swipe(100.0, 200.0), Some(SwipeDirection::Previous));
        assert_eq!(resolve_swipe(100.0, 140.0), None); // exactly 40px stays put
        assert_eq!(resolve_swipe(100.0, 60.0), None);
        assert_eq!(resolve_swipe(100.0, 59.5), Some(SwipeDirection::Next));

        let mut gallery = sample_gallery();
        assert!(!gallery.handle_swipe(10.0, 30.0));
        assert_eq!(gallery.current_index(), 0);
        assert!(gallery.handle_swipe(300.0, 100.0));
        assert_eq!(gallery.current_index(), 1);
    }
}
