// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Controller options.
//!
//! Options deserialize from the card configuration with every field optional.
//! The older names `mouse_drag_zoom`, `touch_pan` and `touch_drag_zoom` are
//! accepted as aliases.

use serde::Deserialize;
use understory_gesture::{DOUBLE_TAP_WINDOW_MS, GestureConfig, Gestures};

/// Persistence setting: on/off, or on with an explicit key.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Persist {
    /// Persist under [`DigitalPtzOptions::persist_key`] when `true`.
    Enabled(bool),
    /// Persist under this key, ignoring `persist_key`.
    Key(String),
}

impl Default for Persist {
    fn default() -> Self {
        Self::Enabled(true)
    }
}

/// Which gestures are enabled and how view state is persisted.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DigitalPtzOptions {
    /// Primary-button drag pans.
    #[serde(alias = "mouse_drag_zoom")]
    pub mouse_drag_pan: bool,
    /// Wheel zooms at the cursor.
    pub mouse_wheel_zoom: bool,
    /// Double click toggles the zoom.
    pub mouse_double_click_zoom: bool,
    /// One-finger drag pans.
    #[serde(alias = "touch_pan")]
    pub touch_drag_pan: bool,
    /// Two-finger pinch zooms and pans.
    pub touch_pinch_zoom: bool,
    /// Tap, then tap-and-drag vertically, zooms.
    #[serde(alias = "touch_drag_zoom")]
    pub touch_tap_drag_zoom: bool,
    /// Double tap toggles the zoom.
    pub touch_double_tap_zoom: bool,
    /// Whether view state survives reloads.
    pub persist: Persist,
    /// Identifier appended to the storage prefix, usually the stream URL.
    pub persist_key: String,
    /// Fast-pair window for double taps and double clicks.
    pub double_tap_window_ms: u64,
}

impl Default for DigitalPtzOptions {
    fn default() -> Self {
        Self {
            mouse_drag_pan: true,
            mouse_wheel_zoom: true,
            mouse_double_click_zoom: true,
            touch_drag_pan: true,
            touch_pinch_zoom: true,
            touch_tap_drag_zoom: true,
            touch_double_tap_zoom: true,
            persist: Persist::default(),
            persist_key: String::new(),
            double_tap_window_ms: DOUBLE_TAP_WINDOW_MS,
        }
    }
}

impl DigitalPtzOptions {
    /// Parses options from a JSON object.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// The key to persist under, or `None` when persistence is off.
    #[must_use]
    pub fn persistence_key(&self) -> Option<&str> {
        match &self.persist {
            Persist::Enabled(true) => Some(&self.persist_key),
            Persist::Enabled(false) => None,
            Persist::Key(key) => Some(key),
        }
    }

    /// Enabled gestures as flags.
    #[must_use]
    pub fn gestures(&self) -> Gestures {
        let mut gestures = Gestures::empty();
        gestures.set(Gestures::MOUSE_DRAG_PAN, self.mouse_drag_pan);
        gestures.set(Gestures::MOUSE_WHEEL_ZOOM, self.mouse_wheel_zoom);
        gestures.set(Gestures::MOUSE_DOUBLE_CLICK_ZOOM, self.mouse_double_click_zoom);
        gestures.set(Gestures::TOUCH_DRAG_PAN, self.touch_drag_pan);
        gestures.set(Gestures::TOUCH_PINCH_ZOOM, self.touch_pinch_zoom);
        gestures.set(Gestures::TOUCH_TAP_DRAG_ZOOM, self.touch_tap_drag_zoom);
        gestures.set(Gestures::TOUCH_DOUBLE_TAP_ZOOM, self.touch_double_tap_zoom);
        gestures
    }

    /// Arbiter configuration for these options.
    #[must_use]
    pub fn gesture_config(&self) -> GestureConfig {
        GestureConfig {
            gestures: self.gestures(),
            double_tap_window_ms: self.double_tap_window_ms,
            ..GestureConfig::default()
        }
    }
}
