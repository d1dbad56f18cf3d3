// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Host-neutral input events.
//!
//! Every position is in client (viewport) coordinates, the same space the
//! host reports container boxes in. Hosts that receive page coordinates
//! convert them once with [`page_to_client`] before building events.
//! Timestamps are milliseconds on any monotonic clock.

use kurbo::{Point, Vec2};
use smallvec::SmallVec;

/// Active touch contacts, in contact order.
pub type Contacts = SmallVec<[Point; 2]>;

/// Kind of device that produced a down event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PointerKind {
    /// Mouse or other hovering pointer.
    Mouse,
    /// Finger on a touch surface.
    Touch,
}

/// Mouse button of a mouse down event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Usually the left button.
    Primary,
    /// Usually the wheel button.
    Auxiliary,
    /// Usually the right button.
    Secondary,
    /// Any other button, by DOM button index.
    Other(u16),
}

impl MouseButton {
    /// Maps a DOM `MouseEvent.button` index.
    #[must_use]
    pub fn from_dom(button: i16) -> Self {
        match button {
            0 => Self::Primary,
            1 => Self::Auxiliary,
            2 => Self::Secondary,
            other => Self::Other(other.unsigned_abs()),
        }
    }
}

/// A raw input event delivered to the container.
#[derive(Clone, Debug, PartialEq)]
pub enum InputEvent {
    /// A mouse button was pressed.
    MouseDown {
        /// Pointer position.
        position: Point,
        /// Pressed button.
        button: MouseButton,
        /// Timestamp in milliseconds.
        time: u64,
    },
    /// The mouse moved.
    MouseMove {
        /// Pointer position.
        position: Point,
        /// Timestamp in milliseconds.
        time: u64,
    },
    /// A mouse button was released.
    MouseUp {
        /// Pointer position.
        position: Point,
        /// Timestamp in milliseconds.
        time: u64,
    },
    /// A contact touched down; `touches` lists every active contact.
    TouchStart {
        /// Active contacts, including the new one.
        touches: Contacts,
        /// Timestamp in milliseconds.
        time: u64,
    },
    /// One or more contacts moved.
    TouchMove {
        /// Active contacts.
        touches: Contacts,
        /// Timestamp in milliseconds.
        time: u64,
    },
    /// A contact lifted; `touches` lists the contacts still down.
    TouchEnd {
        /// Remaining contacts.
        touches: Contacts,
        /// Timestamp in milliseconds.
        time: u64,
    },
    /// The wheel turned over the container.
    Wheel {
        /// Pointer position.
        position: Point,
        /// Vertical scroll amount in pixels; positive scrolls down.
        delta_y: f64,
        /// Timestamp in milliseconds.
        time: u64,
    },
}

impl InputEvent {
    /// Primary-button mouse down.
    #[must_use]
    pub fn mouse_down(position: impl Into<Point>, time: u64) -> Self {
        Self::MouseDown {
            position: position.into(),
            button: MouseButton::Primary,
            time,
        }
    }

    /// Mouse move.
    #[must_use]
    pub fn mouse_move(position: impl Into<Point>, time: u64) -> Self {
        Self::MouseMove {
            position: position.into(),
            time,
        }
    }

    /// Mouse up.
    #[must_use]
    pub fn mouse_up(position: impl Into<Point>, time: u64) -> Self {
        Self::MouseUp {
            position: position.into(),
            time,
        }
    }

    /// Touch start with the given active contacts.
    #[must_use]
    pub fn touch_start(touches: &[Point], time: u64) -> Self {
        Self::TouchStart {
            touches: Contacts::from_slice(touches),
            time,
        }
    }

    /// Touch move with the given active contacts.
    #[must_use]
    pub fn touch_move(touches: &[Point], time: u64) -> Self {
        Self::TouchMove {
            touches: Contacts::from_slice(touches),
            time,
        }
    }

    /// Touch end with the given remaining contacts.
    #[must_use]
    pub fn touch_end(touches: &[Point], time: u64) -> Self {
        Self::TouchEnd {
            touches: Contacts::from_slice(touches),
            time,
        }
    }

    /// Wheel event.
    #[must_use]
    pub fn wheel(position: impl Into<Point>, delta_y: f64, time: u64) -> Self {
        Self::Wheel {
            position: position.into(),
            delta_y,
            time,
        }
    }

    /// Timestamp of the event in milliseconds.
    #[must_use]
    pub fn time(&self) -> u64 {
        match self {
            Self::MouseDown { time, .. }
            | Self::MouseMove { time, .. }
            | Self::MouseUp { time, .. }
            | Self::TouchStart { time, .. }
            | Self::TouchMove { time, .. }
            | Self::TouchEnd { time, .. }
            | Self::Wheel { time, .. } => *time,
        }
    }
}

/// Converts a page-relative position to client coordinates, given the
/// document scroll offset.
#[must_use]
pub fn page_to_client(page: Point, scroll: Vec2) -> Point {
    page - scroll
}
