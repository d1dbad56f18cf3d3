// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-gesture pointer bookkeeping: one-pointer drags and two-contact pinches.
//!
//! ## Minimal example
//!
//! ```
//! use kurbo::{Point, Vec2};
//! use understory_gesture::{DragTrack, PinchSample};
//!
//! let mut drag = DragTrack::new(Point::new(10.0, 20.0));
//! assert_eq!(drag.update(Point::new(15.0, 25.0)), Vec2::new(5.0, 5.0));
//! assert_eq!(drag.total_offset(), Vec2::new(5.0, 5.0));
//!
//! let before = PinchSample::new(Point::new(0.0, 0.0), Point::new(100.0, 0.0));
//! let after = PinchSample::new(Point::new(-50.0, 0.0), Point::new(150.0, 0.0));
//! assert_eq!(after.spread_ratio(&before), Some(2.0));
//! ```

use kurbo::{Point, Vec2};

/// Start and last position of a single dragging pointer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DragTrack {
    start: Point,
    last: Point,
}

impl DragTrack {
    /// Starts tracking at `position`.
    #[must_use]
    pub fn new(position: Point) -> Self {
        Self {
            start: position,
            last: position,
        }
    }

    /// Last recorded position.
    #[must_use]
    pub fn last(&self) -> Point {
        self.last
    }

    /// Records `position` and returns the movement since the last update.
    pub fn update(&mut self, position: Point) -> Vec2 {
        let delta = position - self.last;
        self.last = position;
        delta
    }

    /// Offset of the last position from the start.
    #[must_use]
    pub fn total_offset(&self) -> Vec2 {
        self.last - self.start
    }

    /// Returns `true` once the pointer has strayed more than `slop` pixels
    /// from where it started.
    #[must_use]
    pub fn exceeds(&self, slop: f64) -> bool {
        self.total_offset().hypot() > slop
    }
}

/// Midpoint and spread of two contacts at one instant.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PinchSample {
    /// Midpoint between the contacts.
    pub midpoint: Point,
    /// Distance between the contacts.
    pub spread: f64,
}

impl PinchSample {
    /// Samples two contacts.
    #[must_use]
    pub fn new(a: Point, b: Point) -> Self {
        Self {
            midpoint: a.midpoint(b),
            spread: a.distance(b),
        }
    }

    /// Movement of the midpoint since `previous`.
    #[must_use]
    pub fn pan_since(&self, previous: &Self) -> Vec2 {
        self.midpoint - previous.midpoint
    }

    /// Ratio of this spread to the previous one, when both are non-zero.
    #[must_use]
    pub fn spread_ratio(&self, previous: &Self) -> Option<f64> {
        (previous.spread > 0.0 && self.spread > 0.0).then(|| self.spread / previous.spread)
    }
}

#[cfg(test)]
mod tests {
    use kurbo::{Point, Vec2};

    use super::{DragTrack, PinchSample};

    #[test]
    fn incremental_deltas() {
        let mut drag = DragTrack::new(Point::new(0.0, 0.0));
        assert_eq!(drag.update(Point::new(5.0, 3.0)), Vec2::new(5.0, 3.0));
        assert_eq!(drag.update(Point::new(8.0, 7.0)), Vec2::new(3.0, 4.0));
        assert_eq!(drag.update(Point::new(6.0, 7.0)), Vec2::new(-2.0, 0.0));
        assert_eq!(drag.total_offset(), Vec2::new(6.0, 7.0));
        assert_eq!(drag.last(), Point::new(6.0, 7.0));
    }

    #[test]
    fn zero_movement_delta() {
        let mut drag = DragTrack::new(Point::new(50.0, 50.0));
        assert_eq!(drag.update(Point::new(50.0, 50.0)), Vec2::ZERO);
        assert!(!drag.exceeds(0.0));
    }

    #[test]
    fn slop_is_measured_from_start() {
        let mut drag = DragTrack::new(Point::new(0.0, 0.0));
        drag.update(Point::new(6.0, 8.0));
        assert!(!drag.exceeds(10.0));
        drag.update(Point::new(6.0, 9.0));
        assert!(drag.exceeds(10.0));
        // Only the offset from the start counts.
        drag.update(Point::new(0.0, 1.0));
        assert!(!drag.exceeds(10.0));
    }

    #[test]
    fn pinch_midpoint_and_spread() {
        let sample = PinchSample::new(Point::new(0.0, 0.0), Point::new(30.0, 40.0));
        assert_eq!(sample.midpoint, Point::new(15.0, 20.0));
        assert_eq!(sample.spread, 50.0);
    }

    #[test]
    fn pinch_pan_follows_midpoint() {
        let before = PinchSample::new(Point::new(0.0, 0.0), Point::new(100.0, 0.0));
        let after = PinchSample::new(Point::new(10.0, 5.0), Point::new(110.0, 5.0));
        assert_eq!(after.pan_since(&before), Vec2::new(10.0, 5.0));
        assert_eq!(after.spread_ratio(&before), Some(1.0));
    }

    #[test]
    fn collapsed_pinch_has_no_ratio() {
        let collapsed = PinchSample::new(Point::new(5.0, 5.0), Point::new(5.0, 5.0));
        let open = PinchSample::new(Point::new(0.0, 0.0), Point::new(10.0, 0.0));
        assert_eq!(open.spread_ratio(&collapsed), None);
        assert_eq!(collapsed.spread_ratio(&open), None);
    }
}
