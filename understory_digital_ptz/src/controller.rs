// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The digital PTZ controller.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use kurbo::{Point, Rect};
use understory_gesture::{GestureArbiter, GestureState, Gestures, InputEvent, Response};
use understory_pan_zoom::{KeyValueStore, Transform, TransformDebugInfo, VideoMetrics};

use crate::events::{Channel, Disposer, EventBus, HostEvent, Outcome};
use crate::options::DigitalPtzOptions;

/// How long the host should animate a frame rendered with `transition = true`.
pub const TRANSITION_DURATION: Duration = Duration::from_millis(200);

/// Live layout queries answered by the host.
pub trait GeometryProvider {
    /// Bounding box of the container in client coordinates.
    fn container_box(&self) -> Rect;
    /// Intrinsic size and current transform of the video element.
    fn video_metrics(&self) -> VideoMetrics;
}

type RenderFn = Box<dyn FnMut(&str, bool)>;

struct State {
    transform: Transform,
    arbiter: GestureArbiter,
    geometry: Rc<dyn GeometryProvider>,
    render: RenderFn,
}

impl State {
    fn handle_input(&mut self, event: &InputEvent) -> Outcome {
        let response = self.arbiter.handle(event, &mut self.transform);
        if let Response::Changed { transition } = response {
            self.render(transition);
        }
        if response.is_captured() {
            Outcome::StopAndConsume
        } else {
            Outcome::Continue
        }
    }

    fn recompute_rects(&mut self) {
        let container = self.geometry.container_box();
        let video = self.geometry.video_metrics();
        self.transform.update_rects(&video, container);
        // Re-clamp against the new geometry.
        self.transform.zoom_at_coords(1.0, Point::ZERO);
        self.render(false);
    }

    fn render(&mut self, transition: bool) {
        let css = self.transform.render();
        (self.render)(&css, transition);
    }
}

/// Pan/zoom controller for one video element.
///
/// Owns a [`Transform`] and a [`GestureArbiter`], listens to the host's
/// [`EventBus`], and reports every change through the render callback as a
/// CSS transform string plus a transition flag.
///
/// ```
/// use std::cell::RefCell;
/// use std::rc::Rc;
/// use kurbo::Rect;
/// use understory_digital_ptz::{
///     DigitalPtz, DigitalPtzOptions, EventBus, GeometryProvider, HostEvent,
/// };
/// use understory_gesture::InputEvent;
/// use understory_pan_zoom::{MemoryStore, VideoMetrics};
///
/// struct Fixed;
///
/// impl GeometryProvider for Fixed {
///     fn container_box(&self) -> Rect { Rect::new(0.0, 0.0, 640.0, 360.0) }
///     fn video_metrics(&self) -> VideoMetrics { VideoMetrics::new(1280.0, 720.0) }
/// }
///
/// let bus = EventBus::new();
/// let css = Rc::new(RefCell::new(String::new()));
/// let sink = Rc::clone(&css);
/// let mut ptz = DigitalPtz::new(
///     &bus,
///     Rc::new(Fixed),
///     Rc::new(MemoryStore::new()),
///     &DigitalPtzOptions::default(),
///     move |transform, _transition| *sink.borrow_mut() = transform.to_owned(),
/// );
///
/// let consumed = bus.dispatch(&HostEvent::Input(InputEvent::wheel((320.0, 180.0), -1000.0, 0)));
/// assert!(consumed);
/// assert_eq!(*css.borrow(), "translate(0px, 0px) scale(2)");
///
/// ptz.destroy();
/// assert_eq!(bus.listener_count(), 0);
/// ```
pub struct DigitalPtz {
    state: Rc<RefCell<State>>,
    bus: EventBus,
    detectors: Vec<Disposer>,
    layout: Disposer,
}

impl fmt::Debug for DigitalPtz {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DigitalPtz")
            .field("bus", &self.bus)
            .field("detectors", &self.detectors)
            .field("layout", &self.layout)
            .finish_non_exhaustive()
    }
}

impl DigitalPtz {
    /// Creates the controller, attaches the enabled detectors to `bus`, and
    /// renders once with the current geometry.
    ///
    /// The transform is restored from `store` when persistence is enabled in
    /// `options`.
    pub fn new(
        bus: &EventBus,
        geometry: Rc<dyn GeometryProvider>,
        store: Rc<dyn KeyValueStore>,
        options: &DigitalPtzOptions,
        render: impl FnMut(&str, bool) + 'static,
    ) -> Self {
        let transform = match options.persistence_key() {
            Some(key) => Transform::with_persistence(store, key),
            None => Transform::new(),
        };
        let config = options.gesture_config();
        tracing::debug!(
            gestures = ?config.gestures,
            persist_key = transform.persist_key(),
            "attaching digital ptz"
        );
        let state = Rc::new(RefCell::new(State {
            transform,
            arbiter: GestureArbiter::new(config),
            geometry,
            render: Box::new(render),
        }));

        let mut detectors = Vec::new();
        let groups = [
            (Channel::Mouse, Gestures::MOUSE_BUTTONS),
            (Channel::Wheel, Gestures::MOUSE_WHEEL_ZOOM),
            (Channel::Touch, Gestures::TOUCH),
        ];
        for (channel, gestures) in groups {
            if config.gestures.intersects(gestures) {
                detectors.push(attach_detector(bus, channel, &state));
            }
        }
        let layout = attach_layout(bus, &state);

        let ptz = Self {
            state,
            bus: bus.clone(),
            detectors,
            layout,
        };
        ptz.recompute_rects();
        ptz
    }

    /// Re-reads geometry from the host, re-clamps, and renders.
    ///
    /// Runs automatically on [`HostEvent::LoadedMetadata`] and
    /// [`HostEvent::Resize`].
    pub fn recompute_rects(&self) {
        match self.state.try_borrow_mut() {
            Ok(mut state) => state.recompute_rects(),
            Err(_) => tracing::trace!("recompute requested while rendering"),
        }
    }

    /// Renders the current transform without a transition.
    pub fn render(&self) {
        match self.state.try_borrow_mut() {
            Ok(mut state) => state.render(false),
            Err(_) => tracing::trace!("render requested while rendering"),
        }
    }

    /// Current CSS transform, empty while geometry is unknown.
    #[must_use]
    pub fn css_transform(&self) -> String {
        self.state.borrow().transform.render()
    }

    /// Current zoom factor.
    #[must_use]
    pub fn scale(&self) -> f64 {
        self.state.borrow().transform.scale()
    }

    /// Current gesture state.
    #[must_use]
    pub fn gesture_state(&self) -> GestureState {
        self.state.borrow().arbiter.state()
    }

    /// Snapshot of the transform for debugging and inspection.
    #[must_use]
    pub fn debug_info(&self) -> TransformDebugInfo {
        self.state.borrow().transform.debug_info()
    }

    /// Returns `true` once [`destroy`](Self::destroy) ran.
    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.detectors.is_empty() && self.layout.is_empty()
    }

    /// Removes every listener this controller registered. Idempotent.
    pub fn destroy(&mut self) {
        if self.is_destroyed() {
            return;
        }
        for detector in &mut self.detectors {
            detector.dispose();
        }
        self.detectors.clear();
        self.layout.dispose();
        if let Ok(mut state) = self.state.try_borrow_mut() {
            state.arbiter.cancel();
        }
        tracing::debug!(listeners = self.bus.listener_count(), "destroyed digital ptz");
    }
}

impl Drop for DigitalPtz {
    fn drop(&mut self) {
        self.destroy();
    }
}

fn attach_detector(bus: &EventBus, channel: Channel, state: &Rc<RefCell<State>>) -> Disposer {
    let state = Rc::clone(state);
    Disposer::from(bus.subscribe(channel, move |event| {
        let HostEvent::Input(input) = event else {
            return Outcome::Continue;
        };
        let Ok(mut state) = state.try_borrow_mut() else {
            tracing::trace!(?channel, time = input.time(), "ignoring input raised while rendering");
            return Outcome::Continue;
        };
        state.handle_input(input)
    }))
}

fn attach_layout(bus: &EventBus, state: &Rc<RefCell<State>>) -> Disposer {
    let state = Rc::clone(state);
    Disposer::from(bus.subscribe(Channel::Layout, move |event| {
        tracing::trace!(?event, "layout changed");
        match state.try_borrow_mut() {
            Ok(mut state) => state.recompute_rects(),
            Err(_) => tracing::trace!("ignoring layout change raised while rendering"),
        }
        Outcome::Continue
    }))
}
