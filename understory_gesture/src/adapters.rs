// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use kurbo::{Point, Vec2};
use understory_pan_zoom::Transform;

use crate::arbiter::PanZoomTarget;

impl PanZoomTarget for Transform {
    fn move_by(&mut self, delta: Vec2) {
        Self::move_by(self, delta);
    }

    fn zoom_at_coords(&mut self, factor: f64, at: Point) {
        Self::zoom_at_coords(self, factor, at);
    }

    fn zoom(&mut self, factor: f64) {
        Self::zoom(self, factor);
    }

    fn scale(&self) -> f64 {
        Self::scale(self)
    }
}
