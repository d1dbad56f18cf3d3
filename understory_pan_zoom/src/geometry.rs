// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Video geometry: intrinsic size, element transform, and letterboxing.

use kurbo::{Affine, Point, Rect, Size};

/// Metrics of the video element as reported by the host.
///
/// `intrinsic` is the decoded frame size (`videoWidth` × `videoHeight`); it is
/// zero until the stream has delivered its metadata. `element_transform` is any
/// transform the host already applies to the video element itself, interpreted
/// about the center of the element box (the CSS default `transform-origin`).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VideoMetrics {
    /// Intrinsic video size in pixels.
    pub intrinsic: Size,
    /// Pre-existing transform on the video element.
    pub element_transform: Affine,
}

impl VideoMetrics {
    /// Metrics for a video with the given intrinsic size and no element transform.
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            intrinsic: Size::new(width, height),
            element_transform: Affine::IDENTITY,
        }
    }

    /// Metrics for a video whose intrinsic size is not known yet.
    #[must_use]
    pub fn unloaded() -> Self {
        Self::new(0.0, 0.0)
    }

    /// Returns these metrics with `transform` as the element transform.
    #[must_use]
    pub fn with_element_transform(mut self, transform: Affine) -> Self {
        self.element_transform = transform;
        self
    }

    /// Returns `true` once the video reports a usable intrinsic size.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.intrinsic.width > 0.0 && self.intrinsic.height > 0.0
    }

    /// Width over height of the intrinsic frame, if loaded.
    #[must_use]
    pub fn aspect_ratio(&self) -> Option<f64> {
        self.is_loaded()
            .then(|| self.intrinsic.width / self.intrinsic.height)
    }

    /// The on-screen box of the video element laid out over `layout_box`.
    ///
    /// The four corners of `layout_box` are mapped through the element
    /// transform (about the box center) and the axis-aligned bounding box of
    /// the mapped points is returned.
    #[must_use]
    pub fn on_screen_box(&self, layout_box: Rect) -> Rect {
        if self.element_transform == Affine::IDENTITY {
            return layout_box;
        }
        let center = layout_box.center().to_vec2();
        let about_center =
            Affine::translate(center) * self.element_transform * Affine::translate(-center);
        let corners = [
            layout_box.origin(),
            Point::new(layout_box.x1, layout_box.y0),
            Point::new(layout_box.x0, layout_box.y1),
            Point::new(layout_box.x1, layout_box.y1),
        ];
        let first = about_center * corners[0];
        let mut bounds = Rect::from_points(first, first);
        for corner in &corners[1..] {
            bounds = bounds.union_pt(about_center * *corner);
        }
        bounds
    }
}

/// Fits content with aspect ratio `video_aspect` inside `frame`, centered.
///
/// When the content is wider than the frame the bars are on the top and
/// bottom; otherwise they are on the left and right.
#[must_use]
pub fn letterbox(frame: Rect, video_aspect: f64) -> Rect {
    let frame_aspect = frame.width() / frame.height();
    if video_aspect > frame_aspect {
        let height = frame.width() / video_aspect;
        let bar = (frame.height() - height) / 2.0;
        Rect::from_origin_size((frame.x0, frame.y0 + bar), (frame.width(), height))
    } else {
        let width = frame.height() * video_aspect;
        let bar = (frame.width() - width) / 2.0;
        Rect::from_origin_size((frame.x0 + bar, frame.y0), (width, frame.height()))
    }
}
