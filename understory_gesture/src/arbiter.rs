// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The gesture arbiter: one state machine for every pan/zoom gesture.
//!
//! [`GestureArbiter::handle`] takes each raw [`InputEvent`] of the container,
//! decides which gesture (if any) owns it, and applies the resulting pan and
//! zoom to a [`PanZoomTarget`]. The returned [`Response`] tells the host
//! whether to suppress the event's default handling and whether to re-render.
//!
//! ## States
//!
//! - [`GestureState::Idle`]: moves are ignored. Wheel zoom is stateless and
//!   works in any state.
//! - [`GestureState::OneFingerPan`]: a single touch contact, or the primary
//!   mouse button, drags the view.
//! - [`GestureState::OneFingerZoom`]: the down event was the second half of a
//!   fast pair. Vertical touch movement zooms about the container center;
//!   a quick release without movement toggles the zoom.
//! - [`GestureState::TwoFinger`]: two contacts pan by their midpoint and zoom
//!   by their spread ratio about that midpoint.
//!
//! A second contact landing during a one-finger gesture abandons it (no
//! double-tap toggle on release) and starts a pinch when pinch zoom is enabled.

use kurbo::{Point, Vec2};

use crate::event::{InputEvent, MouseButton, PointerKind};
use crate::fast_pair::{DOUBLE_TAP_WINDOW_MS, FastPairTracker, TAP_SLOP};
use crate::track::{DragTrack, PinchSample};

/// Zoom change per pixel of vertical one-finger drag (one scale unit per 200 px).
pub const ONE_FINGER_ZOOM_SPEED: f64 = 1.0 / 200.0;

/// Zoom change per pixel of wheel delta.
pub const WHEEL_ZOOM_SPEED: f64 = 1.0 / 1000.0;

/// Smallest zoom factor a single wheel event may apply.
pub const MIN_WHEEL_FACTOR: f64 = 0.01;

/// Maximum distance between the down and up of a double click's second click.
pub const CLICK_RELEASE_SLOP: f64 = 20.0;

/// Zoom factor of a double tap at unit scale.
pub const TOGGLE_ZOOM_IN: f64 = 2.0;

/// Zoom factor of a double tap when zoomed; the target clamps it to unit scale.
pub const TOGGLE_ZOOM_OUT: f64 = 0.01;

bitflags::bitflags! {
    /// Individually toggleable gestures.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct Gestures: u8 {
        /// Primary-button drag pans.
        const MOUSE_DRAG_PAN          = 0b0000_0001;
        /// Wheel zooms at the cursor.
        const MOUSE_WHEEL_ZOOM        = 0b0000_0010;
        /// Double click toggles the zoom.
        const MOUSE_DOUBLE_CLICK_ZOOM = 0b0000_0100;
        /// One-finger drag pans.
        const TOUCH_DRAG_PAN          = 0b0000_1000;
        /// Two-finger pinch zooms and pans.
        const TOUCH_PINCH_ZOOM        = 0b0001_0000;
        /// Tap, then tap-and-drag vertically, zooms.
        const TOUCH_TAP_DRAG_ZOOM     = 0b0010_0000;
        /// Double tap toggles the zoom.
        const TOUCH_DOUBLE_TAP_ZOOM   = 0b0100_0000;
    }
}

impl Gestures {
    /// Gestures driven by mouse buttons (down/move/up).
    pub const MOUSE_BUTTONS: Self = Self::MOUSE_DRAG_PAN.union(Self::MOUSE_DOUBLE_CLICK_ZOOM);

    /// Gestures driven by touch contacts.
    pub const TOUCH: Self = Self::TOUCH_DRAG_PAN
        .union(Self::TOUCH_PINCH_ZOOM)
        .union(Self::TOUCH_TAP_DRAG_ZOOM)
        .union(Self::TOUCH_DOUBLE_TAP_ZOOM);

    /// Gestures entered through the second tap of a fast pair.
    const TOUCH_SECOND_TAP: Self = Self::TOUCH_TAP_DRAG_ZOOM.union(Self::TOUCH_DOUBLE_TAP_ZOOM);
}

impl Default for Gestures {
    fn default() -> Self {
        Self::all()
    }
}

/// What the arbiter drives. Implemented for `understory_pan_zoom::Transform`
/// with the `pan_zoom_adapter` feature.
pub trait PanZoomTarget {
    /// Pans by a delta in client pixels.
    fn move_by(&mut self, delta: Vec2);
    /// Zooms by `factor` about a client-space point.
    fn zoom_at_coords(&mut self, factor: f64, at: Point);
    /// Zooms by `factor` about the center of the surface.
    fn zoom(&mut self, factor: f64);
    /// Current zoom factor, `1.0` when not zoomed.
    fn scale(&self) -> f64;
}

/// Tuning of the arbiter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GestureConfig {
    /// Enabled gestures.
    pub gestures: Gestures,
    /// Window for two downs to form a fast pair, and for the second release.
    pub double_tap_window_ms: u64,
    /// Maximum distance between the downs of a fast pair, and movement that
    /// turns a tap into a drag.
    pub tap_slop: f64,
    /// Maximum distance between the second click's down and up.
    pub click_release_slop: f64,
    /// Zoom change per pixel of vertical tap-drag.
    pub one_finger_zoom_speed: f64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            gestures: Gestures::all(),
            double_tap_window_ms: DOUBLE_TAP_WINDOW_MS,
            tap_slop: TAP_SLOP,
            click_release_slop: CLICK_RELEASE_SLOP,
            one_finger_zoom_speed: ONE_FINGER_ZOOM_SPEED,
        }
    }
}

/// Coarse state of the arbiter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum GestureState {
    /// No gesture in progress.
    #[default]
    Idle,
    /// Dragging with one contact or the mouse.
    OneFingerPan,
    /// Second half of a double tap or double click is held.
    OneFingerZoom,
    /// Two contacts pinching.
    TwoFinger,
}

/// Outcome of handling one event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Response {
    /// Not ours; let the host and other listeners handle it.
    Ignored,
    /// Ours, nothing changed visually. The host should prevent default.
    Captured,
    /// Ours and the target changed; re-render. `transition` asks for an
    /// animated change for this frame.
    Changed {
        /// Animate this update.
        transition: bool,
    },
}

impl Response {
    /// Returns `true` if the arbiter owns the event.
    #[must_use]
    pub fn is_captured(self) -> bool {
        !matches!(self, Self::Ignored)
    }

    /// Returns `true` if the target changed.
    #[must_use]
    pub fn needs_render(self) -> bool {
        matches!(self, Self::Changed { .. })
    }

    const MOVED: Self = Self::Changed { transition: false };
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Session {
    Idle,
    MousePan(DragTrack),
    MouseSecondClick { down: Point, time: u64 },
    TouchPan(DragTrack),
    TouchZoom { drag: DragTrack, time: u64, moved: bool },
    Pinch(PinchSample),
}

/// Disambiguates pointer, touch, and wheel input into pan/zoom operations.
#[derive(Clone, Debug)]
pub struct GestureArbiter {
    config: GestureConfig,
    taps: FastPairTracker,
    session: Session,
}

impl Default for GestureArbiter {
    fn default() -> Self {
        Self::new(GestureConfig::default())
    }
}

impl GestureArbiter {
    /// Creates an idle arbiter.
    #[must_use]
    pub fn new(config: GestureConfig) -> Self {
        Self {
            config,
            taps: FastPairTracker::new(config.double_tap_window_ms, config.tap_slop),
            session: Session::Idle,
        }
    }

    /// Current configuration.
    #[must_use]
    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> GestureState {
        match self.session {
            Session::Idle => GestureState::Idle,
            Session::MousePan(_) | Session::TouchPan(_) => GestureState::OneFingerPan,
            Session::MouseSecondClick { .. } | Session::TouchZoom { .. } => {
                GestureState::OneFingerZoom
            }
            Session::Pinch(_) => GestureState::TwoFinger,
        }
    }

    /// Abandons the current gesture and any pending first tap.
    pub fn cancel(&mut self) {
        self.session = Session::Idle;
        self.taps.reset();
    }

    /// Handles one event, applying any pan/zoom to `target`.
    pub fn handle<T: PanZoomTarget + ?Sized>(
        &mut self,
        event: &InputEvent,
        target: &mut T,
    ) -> Response {
        match event {
            InputEvent::MouseDown {
                position,
                button,
                time,
            } => self.mouse_down(*position, *button, *time),
            InputEvent::MouseMove { position, .. } => self.mouse_move(*position, target),
            InputEvent::MouseUp { position, time } => self.mouse_up(*position, *time, target),
            InputEvent::TouchStart { touches, time } => self.touch_start(touches, *time),
            InputEvent::TouchMove { touches, .. } => self.touch_move(touches, target),
            InputEvent::TouchEnd { time, .. } => self.touch_end(*time, target),
            InputEvent::Wheel {
                position, delta_y, ..
            } => self.wheel(*position, *delta_y, target),
        }
    }

    fn enabled(&self, gestures: Gestures) -> bool {
        self.config.gestures.intersects(gestures)
    }

    fn ownership(&self) -> Response {
        if self.session == Session::Idle {
            Response::Ignored
        } else {
            Response::Captured
        }
    }

    fn mouse_down(&mut self, position: Point, button: MouseButton, time: u64) -> Response {
        if button != MouseButton::Primary {
            return Response::Ignored;
        }
        let paired = self.taps.on_down(PointerKind::Mouse, position, time);
        self.session = if paired && self.enabled(Gestures::MOUSE_DOUBLE_CLICK_ZOOM) {
            Session::MouseSecondClick {
                down: position,
                time,
            }
        } else if self.enabled(Gestures::MOUSE_DRAG_PAN) {
            Session::MousePan(DragTrack::new(position))
        } else {
            Session::Idle
        };
        self.ownership()
    }

    fn mouse_move<T: PanZoomTarget + ?Sized>(&mut self, position: Point, target: &mut T) -> Response {
        match &mut self.session {
            Session::MousePan(drag) => {
                let delta = drag.update(position);
                if drag.exceeds(self.config.tap_slop) {
                    self.taps.reset();
                }
                target.move_by(delta);
                Response::MOVED
            }
            Session::MouseSecondClick { down, .. } => {
                if down.distance(position) > self.config.click_release_slop {
                    self.cancel();
                }
                Response::Ignored
            }
            _ => Response::Ignored,
        }
    }

    fn mouse_up<T: PanZoomTarget + ?Sized>(
        &mut self,
        position: Point,
        time: u64,
        target: &mut T,
    ) -> Response {
        let session = core::mem::replace(&mut self.session, Session::Idle);
        match session {
            Session::MouseSecondClick { down, time: down_time }
                if self.taps.within_window(down_time, time)
                    && down.distance(position) <= self.config.click_release_slop =>
            {
                toggle_zoom(target, position)
            }
            Session::MousePan(_) | Session::MouseSecondClick { .. } => Response::Captured,
            _ => Response::Ignored,
        }
    }

    fn touch_start(&mut self, touches: &[Point], time: u64) -> Response {
        self.session = match touches {
            [position] => {
                let paired = self.taps.on_down(PointerKind::Touch, *position, time);
                if paired && self.enabled(Gestures::TOUCH_SECOND_TAP) {
                    Session::TouchZoom {
                        drag: DragTrack::new(*position),
                        time,
                        moved: false,
                    }
                } else if self.enabled(Gestures::TOUCH_DRAG_PAN) {
                    Session::TouchPan(DragTrack::new(*position))
                } else {
                    Session::Idle
                }
            }
            [a, b] => {
                self.taps.reset();
                if self.enabled(Gestures::TOUCH_PINCH_ZOOM) {
                    Session::Pinch(PinchSample::new(*a, *b))
                } else {
                    Session::Idle
                }
            }
            _ => {
                self.taps.reset();
                Session::Idle
            }
        };
        self.ownership()
    }

    fn touch_move<T: PanZoomTarget + ?Sized>(
        &mut self,
        touches: &[Point],
        target: &mut T,
    ) -> Response {
        let tap_drag_zoom = self.enabled(Gestures::TOUCH_TAP_DRAG_ZOOM);
        let mut abandon = false;
        let response = match (&mut self.session, touches) {
            (Session::TouchPan(drag), [position]) => {
                let delta = drag.update(*position);
                if drag.exceeds(self.config.tap_slop) {
                    self.taps.reset();
                }
                target.move_by(delta);
                Response::MOVED
            }
            (Session::TouchZoom { drag, moved, .. }, [position]) => {
                let last = drag.last();
                drag.update(*position);
                *moved |= drag.exceeds(self.config.tap_slop);
                if !*moved {
                    // Still a tap; jitter must not zoom.
                    Response::Captured
                } else if tap_drag_zoom {
                    // Dragging down zooms in.
                    target.zoom(1.0 - (last.y - position.y) * self.config.one_finger_zoom_speed);
                    Response::MOVED
                } else {
                    abandon = true;
                    Response::Ignored
                }
            }
            (Session::Pinch(last), [a, b]) => {
                let sample = PinchSample::new(*a, *b);
                target.move_by(sample.pan_since(last));
                if let Some(ratio) = sample.spread_ratio(last) {
                    target.zoom_at_coords(ratio, sample.midpoint);
                }
                *last = sample;
                Response::MOVED
            }
            (Session::Idle, _) => Response::Ignored,
            // The contact count no longer matches the gesture.
            _ => {
                abandon = true;
                Response::Ignored
            }
        };
        if abandon {
            self.session = Session::Idle;
        }
        response
    }

    fn touch_end<T: PanZoomTarget + ?Sized>(&mut self, time: u64, target: &mut T) -> Response {
        let session = core::mem::replace(&mut self.session, Session::Idle);
        match session {
            Session::TouchZoom {
                drag,
                time: down_time,
                moved: false,
            } if self.enabled(Gestures::TOUCH_DOUBLE_TAP_ZOOM)
                && self.taps.within_window(down_time, time) =>
            {
                toggle_zoom(target, drag.last())
            }
            Session::Idle => Response::Ignored,
            _ => Response::Captured,
        }
    }

    fn wheel<T: PanZoomTarget + ?Sized>(
        &mut self,
        position: Point,
        delta_y: f64,
        target: &mut T,
    ) -> Response {
        if !self.enabled(Gestures::MOUSE_WHEEL_ZOOM) || !delta_y.is_finite() {
            return Response::Ignored;
        }
        let factor = (1.0 - delta_y * WHEEL_ZOOM_SPEED).max(MIN_WHEEL_FACTOR);
        target.zoom_at_coords(factor, position);
        Response::MOVED
    }
}

/// Two-state zoom: unit scale zooms in at `at`, anything else zooms back out.
fn toggle_zoom<T: PanZoomTarget + ?Sized>(target: &mut T, at: Point) -> Response {
    if target.scale() <= 1.0 {
        target.zoom_at_coords(TOGGLE_ZOOM_IN, at);
    } else {
        target.zoom_at_coords(TOGGLE_ZOOM_OUT, Point::ZERO);
    }
    Response::Changed { transition: true }
}
