// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Fast-pair recognition: two down events close in time and space.
//!
//! ## Usage
//!
//! 1) Call [`FastPairTracker::on_down`] for every down event. It returns `true`
//!    when the event completes a pair with the previous down.
//! 2) Call [`FastPairTracker::reset`] when something happens that must not be
//!    read as the first half of a double tap, for example a drag.
//!
//! A completed pair is consumed: a third quick tap starts a new pair instead
//! of pairing with the second one.
//!
//! ## Minimal example
//!
//! ```
//! use kurbo::Point;
//! use understory_gesture::{FastPairTracker, PointerKind};
//!
//! let mut taps = FastPairTracker::new(400, 10.0);
//! assert!(!taps.on_down(PointerKind::Touch, Point::new(100.0, 100.0), 1_000));
//! assert!(taps.on_down(PointerKind::Touch, Point::new(104.0, 97.0), 1_250));
//! ```

use kurbo::Point;

use crate::event::PointerKind;

/// Default window between two downs of a double tap or double click.
pub const DOUBLE_TAP_WINDOW_MS: u64 = 400;

/// Default distance two downs may be apart and still pair.
pub const TAP_SLOP: f64 = 10.0;

#[derive(Clone, Copy, Debug, PartialEq)]
struct Down {
    kind: PointerKind,
    position: Point,
    time: u64,
    paired: bool,
}

/// Recognizes fast pairs of down events.
#[derive(Clone, Debug, PartialEq)]
pub struct FastPairTracker {
    window_ms: u64,
    slop: f64,
    last: Option<Down>,
}

impl Default for FastPairTracker {
    fn default() -> Self {
        Self::new(DOUBLE_TAP_WINDOW_MS, TAP_SLOP)
    }
}

impl FastPairTracker {
    /// Creates a tracker pairing downs less than `window_ms` apart and at most
    /// `slop` pixels apart.
    #[must_use]
    pub fn new(window_ms: u64, slop: f64) -> Self {
        Self {
            window_ms,
            slop,
            last: None,
        }
    }

    /// Timing window in milliseconds.
    #[must_use]
    pub fn window_ms(&self) -> u64 {
        self.window_ms
    }

    /// Returns `true` if `time` is still inside the window opened at `since`.
    #[must_use]
    pub fn within_window(&self, since: u64, time: u64) -> bool {
        time.checked_sub(since)
            .is_some_and(|elapsed| elapsed < self.window_ms)
    }

    /// Records a down event and reports whether it completes a fast pair.
    pub fn on_down(&mut self, kind: PointerKind, position: Point, time: u64) -> bool {
        let paired = self.last.is_some_and(|prev| {
            !prev.paired
                && prev.kind == kind
                && self.within_window(prev.time, time)
                && prev.position.distance(position) <= self.slop
        });
        self.last = Some(Down {
            kind,
            position,
            time,
            paired,
        });
        paired
    }

    /// Forgets the previous down, so the next one cannot complete a pair.
    pub fn reset(&mut self) {
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use kurbo::Point;

    use super::FastPairTracker;
    use crate::event::PointerKind::{Mouse, Touch};

    const AT: Point = Point::new(100.0, 100.0);

    #[test]
    fn first_down_never_pairs() {
        let mut taps = FastPairTracker::default();
        assert!(!taps.on_down(Touch, AT, 5));
    }

    #[test]
    fn pair_inside_window_and_slop() {
        let mut taps = FastPairTracker::default();
        taps.on_down(Touch, AT, 1_000);
        assert!(taps.on_down(Touch, Point::new(105.0, 104.0), 1_399));
    }

    #[test]
    fn no_pair_after_window() {
        let mut taps = FastPairTracker::default();
        taps.on_down(Touch, AT, 1_000);
        assert!(!taps.on_down(Touch, AT, 1_401));
        // The exact window edge is already too late.
        taps.reset();
        taps.on_down(Touch, AT, 2_000);
        assert!(!taps.on_down(Touch, AT, 2_400));
    }

    #[test]
    fn no_pair_when_far_apart() {
        let mut taps = FastPairTracker::default();
        taps.on_down(Touch, AT, 1_000);
        assert!(!taps.on_down(Touch, Point::new(125.0, 100.0), 1_399));
    }

    #[test]
    fn late_down_can_start_a_new_pair() {
        let mut taps = FastPairTracker::default();
        taps.on_down(Mouse, AT, 0);
        assert!(!taps.on_down(Mouse, AT, 1_000));
        assert!(taps.on_down(Mouse, AT, 1_100));
    }

    #[test]
    fn pointer_kinds_do_not_mix() {
        let mut taps = FastPairTracker::default();
        taps.on_down(Mouse, AT, 1_000);
        assert!(!taps.on_down(Touch, AT, 1_100));
    }

    #[test]
    fn completed_pair_is_consumed() {
        let mut taps = FastPairTracker::default();
        taps.on_down(Touch, AT, 1_000);
        assert!(taps.on_down(Touch, AT, 1_100));
        assert!(!taps.on_down(Touch, AT, 1_200));
        assert!(taps.on_down(Touch, AT, 1_300));
    }

    #[test]
    fn reset_forgets_previous_down() {
        let mut taps = FastPairTracker::default();
        taps.on_down(Touch, AT, 1_000);
        taps.reset();
        assert!(!taps.on_down(Touch, AT, 1_100));
    }

    #[test]
    fn clock_going_backwards_does_not_pair() {
        let mut taps = FastPairTracker::default();
        taps.on_down(Touch, AT, 1_000);
        assert!(!taps.on_down(Touch, AT, 900));
    }

    #[test]
    fn custom_window() {
        let mut taps = FastPairTracker::new(250, 10.0);
        taps.on_down(Touch, AT, 0);
        assert!(!taps.on_down(Touch, AT, 300));
        assert!(taps.on_down(Touch, AT, 500));
        assert_eq!(taps.window_ms(), 250);
    }
}
