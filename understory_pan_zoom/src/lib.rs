// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_pan_zoom --heading-base-level=0

//! Understory Pan Zoom: a digital pan/zoom transform for video surfaces.
//!
//! This crate models the view state of a video that is zoomed and panned on
//! the client, without touching the media stream. It focuses on:
//! - Pan/zoom state (`scale`, `x`, `y`) with hard clamping invariants.
//! - Letterbox-aware geometry: offsets are measured against the visible video
//!   content, not the container.
//! - Zooming about a client-space point so the content under it stays put.
//! - Producing a CSS `transform` string (or a [`kurbo::Affine`]).
//! - Persisting view state per stream in a host-provided [`KeyValueStore`].
//!
//! It does **not** listen to input or own any element. Callers are expected
//! to:
//! - Feed container boxes and [`VideoMetrics`] into [`Transform::update_rects`]
//!   whenever layout or video metadata changes.
//! - Translate input into [`Transform::move_by`] / [`Transform::zoom_at_coords`]
//!   calls (see `understory_gesture`).
//! - Apply [`Transform::render`] to the video element.
//!
//! All coordinates are client (viewport) coordinates.
//!
//! ## Minimal example
//!
//! ```rust
//! use kurbo::{Point, Rect};
//! use understory_pan_zoom::{Transform, VideoMetrics};
//!
//! let mut transform = Transform::new();
//!
//! // 640x360 container showing a 1280x720 stream.
//! transform.update_rects(
//!     &VideoMetrics::new(1280.0, 720.0),
//!     Rect::new(0.0, 0.0, 640.0, 360.0),
//! );
//!
//! // Double the zoom about the container center.
//! transform.zoom_at_coords(2.0, Point::new(320.0, 180.0));
//! assert_eq!(transform.render(), "translate(0px, 0px) scale(2)");
//! ```
//!
//! ## Persistence
//!
//! ```rust
//! use std::rc::Rc;
//! use kurbo::{Rect, Vec2};
//! use understory_pan_zoom::{MemoryStore, Transform, VideoMetrics};
//!
//! let store = Rc::new(MemoryStore::new());
//! let mut transform = Transform::with_persistence(store.clone(), "rtsp://camera/main");
//! transform.update_rects(&VideoMetrics::new(1280.0, 720.0), Rect::new(0.0, 0.0, 640.0, 360.0));
//! transform.zoom(4.0);
//! transform.move_by(Vec2::new(32.0, 0.0));
//!
//! // A later page load restores the view.
//! let restored = Transform::with_persistence(store, "rtsp://camera/main");
//! assert_eq!(restored.scale(), 4.0);
//! assert_eq!(restored.x(), 0.05);
//! ```

mod geometry;
mod persist;
mod transform;

pub use geometry::{VideoMetrics, letterbox};
pub use persist::{
    KeyValueStore, MemoryStore, PERSIST_KEY_PREFIX, PersistError, PersistedTransform,
    decode_record,
};
pub use transform::{MAX_ZOOM, Transform, TransformDebugInfo};
