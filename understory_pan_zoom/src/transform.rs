// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The clamped pan/zoom state of one video surface.

use std::rc::Rc;

use kurbo::{Affine, Point, Rect, Vec2};

use crate::geometry::{VideoMetrics, letterbox};
use crate::persist::{KeyValueStore, PersistedTransform, Persistence};

/// Upper bound of the zoom factor. The lower bound is `1.0`.
pub const MAX_ZOOM: f64 = 10.0;

/// Digital pan/zoom state of one video surface.
///
/// The offset is the video's center displacement expressed as a fraction of
/// the rendered video size, so it survives container resizes. The transform
/// maintains these invariants after every mutation:
///
/// - `1 <= scale <= MAX_ZOOM`
/// - `|x| <= (scale - 1) / 2` and `|y| <= (scale - 1) / 2`, so the zoomed video
///   always covers the area it covered at `scale == 1`.
///
/// Every geometry-dependent operation is a no-op until
/// [`Transform::update_rects`] has seen a laid-out container and a loaded
/// video.
#[derive(Clone, Debug)]
pub struct Transform {
    scale: f64,
    offset: Vec2,
    container_rect: Option<Rect>,
    video_rect: Option<Rect>,
    persistence: Option<Persistence>,
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}

impl Transform {
    /// Creates an identity transform without persistence.
    #[must_use]
    pub fn new() -> Self {
        Self {
            scale: 1.0,
            offset: Vec2::ZERO,
            container_rect: None,
            video_rect: None,
            persistence: None,
        }
    }

    /// Creates a transform persisted in `store` under `persist_key`.
    ///
    /// The stored state, if any and valid, is loaded immediately.
    #[must_use]
    pub fn with_persistence(store: Rc<dyn KeyValueStore>, persist_key: &str) -> Self {
        let mut transform = Self::new();
        transform.persistence = Some(Persistence::new(store, persist_key));
        transform.load_persisted();
        transform
    }

    /// Current zoom factor.
    #[must_use]
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Horizontal offset as a fraction of the video width.
    #[must_use]
    pub fn x(&self) -> f64 {
        self.offset.x
    }

    /// Vertical offset as a fraction of the video height.
    #[must_use]
    pub fn y(&self) -> f64 {
        self.offset.y
    }

    /// Last laid-out container box, in client coordinates.
    #[must_use]
    pub fn container_rect(&self) -> Option<Rect> {
        self.container_rect
    }

    /// Box of the visible video content (without letterbox bars), in client
    /// coordinates.
    #[must_use]
    pub fn video_rect(&self) -> Option<Rect> {
        self.video_rect
    }

    /// Full storage key, when persistence is enabled.
    #[must_use]
    pub fn persist_key(&self) -> Option<&str> {
        self.persistence.as_ref().map(|p| p.key.as_str())
    }

    /// Recomputes the container and video boxes.
    ///
    /// A container without area leaves everything untouched; the host is
    /// expected to call again on its next layout notification. A video without
    /// intrinsic size, or one whose element transform collapses it to nothing,
    /// only updates the container box.
    pub fn update_rects(&mut self, video: &VideoMetrics, container: Rect) {
        let has_area = container.width() > 0.0 && container.height() > 0.0;
        if !has_area {
            tracing::trace!(?container, "container not laid out yet");
            return;
        }
        self.container_rect = Some(container);
        let Some(video_aspect) = video.aspect_ratio() else {
            tracing::trace!("video metadata not loaded yet");
            return;
        };
        let frame = video.on_screen_box(container);
        let video_rect = letterbox(frame, video_aspect);
        if !(video_rect.is_finite() && video_rect.width() > 0.0 && video_rect.height() > 0.0) {
            tracing::trace!(?frame, "video frame has no area");
            return;
        }
        tracing::debug!(?container, ?video_rect, "updated video geometry");
        self.video_rect = Some(video_rect);
    }

    /// Pans by a delta in client pixels, then clamps and persists.
    pub fn move_by(&mut self, delta: Vec2) {
        let Some(video_rect) = self.video_rect else {
            return;
        };
        if !delta.is_finite() {
            return;
        }
        let bound = (self.scale - 1.0) / 2.0;
        self.offset.x = clamp_offset(self.offset.x + delta.x / video_rect.width(), bound);
        self.offset.y = clamp_offset(self.offset.y + delta.y / video_rect.height(), bound);
        self.persist();
    }

    /// Zooms by `factor` about `at`, given in client coordinates.
    ///
    /// The resulting scale is clamped to `[1, MAX_ZOOM]` and the pan is
    /// corrected with the factor actually applied, so that the content under
    /// `at` stays where it is unless the offset clamp has to pull it back.
    pub fn zoom_at_coords(&mut self, factor: f64, at: Point) {
        let (Some(container), Some(video_rect)) = (self.container_rect, self.video_rect) else {
            return;
        };
        if !(factor.is_finite() && factor > 0.0) {
            return;
        }
        let old_scale = self.scale;
        self.scale = (old_scale * factor).clamp(1.0, MAX_ZOOM);
        let applied = self.scale / old_scale;

        let focus = at - container.center();
        let translation = Vec2::new(
            self.offset.x * video_rect.width(),
            self.offset.y * video_rect.height(),
        );
        self.move_by((focus - translation) * (1.0 - applied));
    }

    /// Zooms by `factor` about the center of the container.
    pub fn zoom(&mut self, factor: f64) {
        let Some(container) = self.container_rect else {
            return;
        };
        self.zoom_at_coords(factor, container.center());
    }

    /// Translation of the video center in client pixels.
    #[must_use]
    pub fn translation(&self) -> Option<Vec2> {
        let video_rect = self.video_rect?;
        Some(Vec2::new(
            self.offset.x * video_rect.width(),
            self.offset.y * video_rect.height(),
        ))
    }

    /// CSS transform for the video element, or an empty string while the
    /// geometry is unknown.
    ///
    /// The value assumes the default `transform-origin` (the element center).
    #[must_use]
    pub fn render(&self) -> String {
        let Some(translation) = self.translation() else {
            return String::new();
        };
        format!(
            "translate({}px, {}px) scale({})",
            translation.x, translation.y, self.scale
        )
    }

    /// The rendered transform as an affine map from untransformed client
    /// coordinates to on-screen client coordinates.
    #[must_use]
    pub fn to_affine(&self) -> Option<Affine> {
        let translation = self.translation()?;
        let center = self.container_rect?.center().to_vec2();
        Some(
            Affine::translate(center + translation)
                * Affine::scale(self.scale)
                * Affine::translate(-center),
        )
    }

    /// Replaces the in-memory state with the stored record, when persistence
    /// is enabled and the record is valid.
    ///
    /// Corrupt records are deleted and the identity transform is restored.
    pub fn load_persisted(&mut self) {
        let Some(persistence) = &self.persistence else {
            return;
        };
        match persistence.load() {
            Some(record) => {
                let scale = record.scale.clamp(1.0, MAX_ZOOM);
                let bound = (scale - 1.0) / 2.0;
                self.scale = scale;
                self.offset = Vec2::new(
                    clamp_offset(record.x, bound),
                    clamp_offset(record.y, bound),
                );
            }
            None => {
                self.scale = 1.0;
                self.offset = Vec2::ZERO;
            }
        }
    }

    /// Writes the current state to the store, when persistence is enabled.
    pub fn persist(&self) {
        if let Some(persistence) = &self.persistence {
            persistence.save(PersistedTransform {
                x: self.offset.x,
                y: self.offset.y,
                scale: self.scale,
            });
        }
    }

    /// Snapshot of the current state for debugging and inspection.
    #[must_use]
    pub fn debug_info(&self) -> TransformDebugInfo {
        TransformDebugInfo {
            scale: self.scale,
            offset: self.offset,
            container_rect: self.container_rect,
            video_rect: self.video_rect,
            persisted: self.persistence.is_some(),
        }
    }
}

/// Clamps an offset to `[-bound, bound]`; a pinned-to-zero result is `+0.0`
/// so that it renders as `0px`.
fn clamp_offset(value: f64, bound: f64) -> f64 {
    value.clamp(-bound, bound) + 0.0
}

/// Debug snapshot of a [`Transform`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransformDebugInfo {
    /// Current zoom factor.
    pub scale: f64,
    /// Offset as fractions of the video size.
    pub offset: Vec2,
    /// Container box, if laid out.
    pub container_rect: Option<Rect>,
    /// Visible video box, if known.
    pub video_rect: Option<Rect>,
    /// Whether the state is persisted.
    pub persisted: bool,
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use kurbo::{Affine, Point, Rect, Vec2};

    use super::{MAX_ZOOM, Transform};
    use crate::geometry::VideoMetrics;
    use crate::persist::{KeyValueStore, MemoryStore};

    const EPS: f64 = 1e-9;

    /// 400x300 container at the origin showing a 4:3 video, so the video box
    /// equals the container box.
    fn laid_out() -> Transform {
        let mut t = Transform::new();
        t.update_rects(
            &VideoMetrics::new(800.0, 600.0),
            Rect::new(0.0, 0.0, 400.0, 300.0),
        );
        t
    }

    fn assert_invariants(t: &Transform) {
        let bound = (t.scale() - 1.0) / 2.0;
        assert!(
            (1.0..=MAX_ZOOM).contains(&t.scale()),
            "scale out of range: {}",
            t.scale()
        );
        assert!(t.x().abs() <= bound + EPS, "x {} exceeds {bound}", t.x());
        assert!(t.y().abs() <= bound + EPS, "y {} exceeds {bound}", t.y());
    }

    #[test]
    fn mutators_before_geometry_are_noops() {
        let mut t = Transform::new();
        t.move_by(Vec2::new(50.0, 50.0));
        t.zoom_at_coords(2.0, Point::new(10.0, 10.0));
        t.zoom(3.0);
        assert_eq!(t.scale(), 1.0);
        assert_eq!((t.x(), t.y()), (0.0, 0.0));
        assert_eq!(t.render(), "");
        assert_eq!(t.to_affine(), None);
    }

    #[test]
    fn empty_container_is_ignored() {
        let mut t = laid_out();
        t.update_rects(&VideoMetrics::new(800.0, 600.0), Rect::new(0.0, 0.0, 0.0, 300.0));
        assert_eq!(t.container_rect(), Some(Rect::new(0.0, 0.0, 400.0, 300.0)));
    }

    #[test]
    fn unloaded_video_records_container_only() {
        let mut t = Transform::new();
        let container = Rect::new(0.0, 0.0, 400.0, 300.0);
        t.update_rects(&VideoMetrics::unloaded(), container);
        assert_eq!(t.container_rect(), Some(container));
        assert_eq!(t.video_rect(), None);

        // Zooming still needs the video box.
        t.zoom(2.0);
        assert_eq!(t.scale(), 1.0);
    }

    #[test]
    fn collapsed_element_keeps_last_video_box() {
        let mut t = laid_out();
        t.zoom_at_coords(2.0, Point::new(10.0, 10.0));
        let video_rect = t.video_rect();

        t.update_rects(
            &VideoMetrics::new(800.0, 600.0).with_element_transform(Affine::scale(0.0)),
            Rect::new(0.0, 0.0, 400.0, 300.0),
        );
        assert_eq!(t.video_rect(), video_rect);
        t.zoom_at_coords(1.0, Point::ZERO);
        assert_invariants(&t);
        assert!(!t.render().contains("NaN"));

        let mut fresh = Transform::new();
        fresh.update_rects(
            &VideoMetrics::new(800.0, 600.0).with_element_transform(Affine::scale(0.0)),
            Rect::new(0.0, 0.0, 400.0, 300.0),
        );
        assert_eq!(fresh.video_rect(), None);
        fresh.zoom_at_coords(1.0, Point::ZERO);
        assert_eq!((fresh.x(), fresh.y()), (0.0, 0.0));
        assert_eq!(fresh.render(), "");
    }

    #[test]
    fn letterboxed_geometry() {
        let mut t = Transform::new();
        t.update_rects(
            &VideoMetrics::new(800.0, 400.0),
            Rect::new(0.0, 0.0, 400.0, 100.0),
        );
        assert_eq!(t.video_rect(), Some(Rect::new(100.0, 0.0, 300.0, 100.0)));

        t.update_rects(
            &VideoMetrics::new(800.0, 400.0),
            Rect::new(0.0, 0.0, 100.0, 400.0),
        );
        assert_eq!(t.video_rect(), Some(Rect::new(0.0, 175.0, 100.0, 225.0)));
    }

    #[test]
    fn move_at_unit_scale_is_clamped_to_zero() {
        let mut t = laid_out();
        t.move_by(Vec2::new(100.0, -40.0));
        assert_eq!((t.x(), t.y()), (0.0, 0.0));
    }

    #[test]
    fn move_converts_pixels_to_fractions() {
        let mut t = laid_out();
        t.zoom(3.0);
        t.move_by(Vec2::new(40.0, -30.0));
        assert!((t.x() - 0.1).abs() < EPS);
        assert!((t.y() + 0.1).abs() < EPS);
    }

    #[test]
    fn non_finite_delta_is_ignored() {
        let mut t = laid_out();
        t.zoom(2.0);
        t.move_by(Vec2::new(f64::NAN, 10.0));
        assert_eq!((t.x(), t.y()), (0.0, 0.0));
    }

    #[test]
    fn zoom_is_clamped_exactly() {
        let mut t = laid_out();
        t.zoom(50.0);
        assert_eq!(t.scale(), MAX_ZOOM);
        t.zoom(0.001);
        assert_eq!(t.scale(), 1.0);
        assert_eq!((t.x(), t.y()), (0.0, 0.0));
    }

    #[test]
    fn invalid_zoom_factors_are_ignored() {
        let mut t = laid_out();
        t.zoom(2.0);
        for factor in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            t.zoom_at_coords(factor, Point::new(10.0, 10.0));
            assert_eq!(t.scale(), 2.0);
        }
    }

    #[test]
    fn zoom_at_point_keeps_point_fixed() {
        let mut t = laid_out();
        let focus = Point::new(300.0, 200.0);

        let before = t.to_affine().unwrap();
        let content = before.inverse() * focus;
        t.zoom_at_coords(2.0, focus);
        let after = t.to_affine().unwrap() * content;

        assert_eq!(t.scale(), 2.0);
        assert!((after.x - focus.x).abs() < 1e-6);
        assert!((after.y - focus.y).abs() < 1e-6);
    }

    #[test]
    fn zoom_at_point_keeps_point_fixed_when_already_zoomed() {
        let mut t = laid_out();
        t.zoom_at_coords(2.0, Point::new(120.0, 90.0));
        let focus = Point::new(220.0, 160.0);

        let content = t.to_affine().unwrap().inverse() * focus;
        t.zoom_at_coords(1.5, focus);
        let after = t.to_affine().unwrap() * content;

        assert!((t.scale() - 3.0).abs() < EPS);
        assert!((after.x - focus.x).abs() < 1e-6);
        assert!((after.y - focus.y).abs() < 1e-6);
    }

    #[test]
    fn zoom_respects_container_offset() {
        let mut t = Transform::new();
        t.update_rects(
            &VideoMetrics::new(800.0, 600.0),
            Rect::new(100.0, 50.0, 500.0, 350.0),
        );
        // Zooming at the container center never pans.
        t.zoom_at_coords(4.0, Point::new(300.0, 200.0));
        assert_eq!(t.scale(), 4.0);
        assert_eq!((t.x(), t.y()), (0.0, 0.0));
    }

    #[test]
    fn clamp_invariant_holds_over_arbitrary_sequences() {
        let mut t = laid_out();
        let mut seed = 0x2545_f491_u32;
        let mut next = move || {
            seed ^= seed << 13;
            seed ^= seed >> 17;
            seed ^= seed << 5;
            f64::from(seed % 1000) / 1000.0
        };
        for step in 0..500 {
            if step % 3 == 0 {
                let factor = 0.5 + next() * 1.5;
                t.zoom_at_coords(factor, Point::new(next() * 600.0 - 100.0, next() * 500.0 - 100.0));
            } else {
                t.move_by(Vec2::new(next() * 400.0 - 200.0, next() * 400.0 - 200.0));
            }
            assert_invariants(&t);
        }
    }

    #[test]
    fn shrinking_container_is_reclamped_by_identity_zoom() {
        let mut t = laid_out();
        t.zoom_at_coords(4.0, Point::new(0.0, 0.0));
        assert_invariants(&t);

        t.update_rects(
            &VideoMetrics::new(800.0, 600.0),
            Rect::new(0.0, 0.0, 200.0, 150.0),
        );
        t.zoom_at_coords(1.0, Point::ZERO);
        assert_invariants(&t);
        assert_eq!(t.scale(), 4.0);
    }

    #[test]
    fn render_formats_css() {
        let mut t = laid_out();
        assert_eq!(t.render(), "translate(0px, 0px) scale(1)");
        t.zoom(2.0);
        t.move_by(Vec2::new(50.0, 75.0));
        assert_eq!(t.render(), "translate(50px, 75px) scale(2)");
    }

    #[test]
    fn persistence_round_trip() {
        let store = Rc::new(MemoryStore::new());
        let mut t = Transform::with_persistence(store.clone(), "rtsp://cam");
        t.update_rects(
            &VideoMetrics::new(800.0, 600.0),
            Rect::new(0.0, 0.0, 400.0, 300.0),
        );
        t.zoom_at_coords(3.0, Point::new(50.0, 250.0));
        t.move_by(Vec2::new(-13.0, 7.0));

        let restored = Transform::with_persistence(store.clone(), "rtsp://cam");
        assert_eq!(restored.scale(), t.scale());
        assert_eq!(restored.x(), t.x());
        assert_eq!(restored.y(), t.y());
        assert_eq!(restored.persist_key(), Some("webrtc-digital-ptc:rtsp://cam"));

        // Other streams keep their own state.
        let other = Transform::with_persistence(store, "rtsp://other");
        assert_eq!(other.scale(), 1.0);
    }

    #[test]
    fn without_persistence_nothing_is_stored() {
        let mut t = laid_out();
        t.zoom(2.0);
        t.move_by(Vec2::new(10.0, 10.0));
        assert_eq!(t.persist_key(), None);
        assert!(!t.debug_info().persisted);
    }

    #[test]
    fn corrupt_record_is_deleted_and_defaults_restored() {
        let store = Rc::new(MemoryStore::new());
        store.set("webrtc-digital-ptc:cam", r#"{"x":"left","y":0,"scale":2}"#.into());

        let t = Transform::with_persistence(store.clone(), "cam");

        assert_eq!(t.scale(), 1.0);
        assert_eq!((t.x(), t.y()), (0.0, 0.0));
        assert!(!store.contains_key("webrtc-digital-ptc:cam"));
    }

    #[test]
    fn out_of_range_record_is_clamped_on_load() {
        let store = Rc::new(MemoryStore::new());
        store.set("webrtc-digital-ptc:cam", r#"{"x":6,"y":-6,"scale":40}"#.into());

        let t = Transform::with_persistence(store, "cam");

        assert_eq!(t.scale(), MAX_ZOOM);
        assert_eq!(t.x(), 4.5);
        assert_eq!(t.y(), -4.5);
    }

    #[test]
    fn zooming_out_from_a_corner_renders_plain_zero() {
        let mut t = laid_out();
        t.zoom_at_coords(2.0, Point::new(10.0, 10.0));
        t.zoom_at_coords(0.01, Point::ZERO);
        assert_eq!(t.render(), "translate(0px, 0px) scale(1)");
    }
}
