// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_digital_ptz --heading-base-level=0

//! Understory Digital PTZ: client-side pan/tilt/zoom for a live video element.
//!
//! [`DigitalPtz`] ties together:
//! - an `understory_pan_zoom::Transform` holding the clamped view state, restored
//!   from and written back to a host [`KeyValueStore`](understory_pan_zoom::KeyValueStore);
//! - an `understory_gesture::GestureArbiter` fed from the host [`EventBus`];
//! - layout tracking through a [`GeometryProvider`], re-run on
//!   [`HostEvent::LoadedMetadata`] and [`HostEvent::Resize`];
//! - a render callback receiving the CSS transform and a transition flag
//!   (animate for [`TRANSITION_DURATION`] when set).
//!
//! Gestures and persistence are configured with [`DigitalPtzOptions`], which
//! deserializes from the card configuration.
//!
//! The host owns the DOM: it forwards container events to the bus, prevents the
//! default action when [`EventBus::dispatch`] returns `true`, and assigns the
//! rendered string to the video element's `style.transform`.
//!
//! Logging goes through `tracing`; install any subscriber to see geometry and
//! lifecycle events.

mod controller;
mod events;
mod options;

pub use controller::{DigitalPtz, GeometryProvider, TRANSITION_DURATION};
pub use events::{Channel, Disposer, EventBus, HostEvent, Outcome, Subscription};
pub use options::{DigitalPtzOptions, Persist};
