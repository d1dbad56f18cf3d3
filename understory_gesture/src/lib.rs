// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_gesture --heading-base-level=0

//! Understory Gesture: pan/zoom gesture arbitration for mouse, wheel, and touch.
//!
//! A single [`GestureArbiter`] consumes raw [`InputEvent`]s and decides which
//! gesture owns them:
//! - Mouse drag pans; wheel zooms at the cursor.
//! - Double click and double tap toggle between unit scale and 2x at the
//!   pointer.
//! - Tap, then tap-and-drag vertically, zooms about the center.
//! - Two-finger pinch pans by the midpoint and zooms by the spread ratio.
//!
//! Each gesture can be switched off through [`Gestures`] in [`GestureConfig`].
//! The arbiter drives any [`PanZoomTarget`]; with the `pan_zoom_adapter`
//! feature (enabled by default) `understory_pan_zoom::Transform` is one.
//!
//! The building blocks are public too: [`FastPairTracker`] recognizes two
//! quick downs, [`DragTrack`] and [`PinchSample`] do per-gesture bookkeeping.
//!
//! ## Minimal example
//!
//! ```rust
//! use kurbo::{Point, Vec2};
//! use understory_gesture::{GestureArbiter, InputEvent, PanZoomTarget, Response};
//!
//! #[derive(Default)]
//! struct Pan(Vec2);
//!
//! impl PanZoomTarget for Pan {
//!     fn move_by(&mut self, delta: Vec2) { self.0 += delta; }
//!     fn zoom_at_coords(&mut self, _: f64, _: Point) {}
//!     fn zoom(&mut self, _: f64) {}
//!     fn scale(&self) -> f64 { 1.0 }
//! }
//!
//! let mut arbiter = GestureArbiter::default();
//! let mut pan = Pan::default();
//! arbiter.handle(&InputEvent::touch_start(&[Point::new(10.0, 10.0)], 0), &mut pan);
//! let response = arbiter.handle(&InputEvent::touch_move(&[Point::new(25.0, 5.0)], 16), &mut pan);
//! assert_eq!(response, Response::Changed { transition: false });
//! assert_eq!(pan.0, Vec2::new(15.0, -5.0));
//! ```
//!
//! This crate is `no_std`.

#![no_std]

#[cfg(test)]
extern crate alloc;

#[cfg(feature = "pan_zoom_adapter")]
mod adapters;
mod arbiter;
mod event;
mod fast_pair;
mod track;

pub use arbiter::{
    CLICK_RELEASE_SLOP, GestureArbiter, GestureConfig, GestureState, Gestures,
    MIN_WHEEL_FACTOR, ONE_FINGER_ZOOM_SPEED, PanZoomTarget, Response, TOGGLE_ZOOM_IN,
    TOGGLE_ZOOM_OUT, WHEEL_ZOOM_SPEED,
};
pub use event::{Contacts, InputEvent, MouseButton, PointerKind, page_to_client};
pub use fast_pair::{DOUBLE_TAP_WINDOW_MS, FastPairTracker, TAP_SLOP};
pub use track::{DragTrack, PinchSample};
