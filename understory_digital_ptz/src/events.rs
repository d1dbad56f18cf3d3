// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Host event bus with explicit subscription handles.
//!
//! The host forwards container input and layout notifications to an
//! [`EventBus`]. Listeners subscribe per [`Channel`] and receive a
//! [`Subscription`] that unregisters them when dropped; a [`Disposer`] groups
//! the subscriptions of one detector.
//!
//! Dispatch walks the listeners of the event's channel in subscription order
//! and honors the [`Outcome`] each one returns:
//!
//! - [`Outcome::Continue`]: keep going.
//! - [`Outcome::Stop`]: abort delivery, not consumed.
//! - [`Outcome::StopAndConsume`]: abort delivery; [`EventBus::dispatch`]
//!   returns `true` and the host should prevent the default action.
//!
//! ## Minimal example
//!
//! ```
//! use understory_digital_ptz::{Channel, EventBus, HostEvent, Outcome};
//!
//! let bus = EventBus::new();
//! let subscription = bus.subscribe(Channel::Layout, |_| Outcome::StopAndConsume);
//! assert!(bus.dispatch(&HostEvent::Resize));
//!
//! drop(subscription);
//! assert_eq!(bus.listener_count(), 0);
//! assert!(!bus.dispatch(&HostEvent::Resize));
//! ```

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use understory_gesture::InputEvent;

/// Group of events a listener subscribes to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Mouse down, move and up.
    Mouse,
    /// Wheel.
    Wheel,
    /// Touch start, move and end.
    Touch,
    /// Video metadata and container resize notifications.
    Layout,
}

/// An event delivered by the host.
#[derive(Clone, Debug, PartialEq)]
pub enum HostEvent {
    /// Raw input on the container.
    Input(InputEvent),
    /// The video's intrinsic size became known or changed.
    LoadedMetadata,
    /// The container was resized.
    Resize,
}

impl HostEvent {
    /// Channel this event is delivered on.
    #[must_use]
    pub fn channel(&self) -> Channel {
        match self {
            Self::Input(
                InputEvent::MouseDown { .. }
                | InputEvent::MouseMove { .. }
                | InputEvent::MouseUp { .. },
            ) => Channel::Mouse,
            Self::Input(InputEvent::Wheel { .. }) => Channel::Wheel,
            Self::Input(
                InputEvent::TouchStart { .. }
                | InputEvent::TouchMove { .. }
                | InputEvent::TouchEnd { .. },
            ) => Channel::Touch,
            Self::LoadedMetadata | Self::Resize => Channel::Layout,
        }
    }
}

impl From<InputEvent> for HostEvent {
    fn from(event: InputEvent) -> Self {
        Self::Input(event)
    }
}

/// What a listener asks the bus to do after it ran.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Deliver to the next listener.
    Continue,
    /// Stop delivering; the event is not consumed.
    Stop,
    /// Stop delivering and report the event as consumed.
    StopAndConsume,
}

type Listener = Rc<RefCell<dyn FnMut(&HostEvent) -> Outcome>>;

struct Entry {
    id: u64,
    channel: Channel,
    listener: Listener,
}

#[derive(Default)]
struct Listeners {
    next_id: u64,
    entries: Vec<Entry>,
}

impl Listeners {
    fn contains(&self, id: u64) -> bool {
        self.entries.iter().any(|entry| entry.id == id)
    }
}

/// Single-threaded event bus. Clones share the same listeners.
#[derive(Clone, Default)]
pub struct EventBus {
    inner: Rc<RefCell<Listeners>>,
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listener_count())
            .finish_non_exhaustive()
    }
}

impl EventBus {
    /// Creates a bus without listeners.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `listener` on `channel` until the returned handle is dropped.
    pub fn subscribe(
        &self,
        channel: Channel,
        listener: impl FnMut(&HostEvent) -> Outcome + 'static,
    ) -> Subscription {
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.entries.push(Entry {
            id,
            channel,
            listener: Rc::new(RefCell::new(listener)),
        });
        Subscription {
            bus: Rc::downgrade(&self.inner),
            id,
        }
    }

    /// Delivers `event` to the listeners of its channel.
    ///
    /// Listeners may subscribe and unsubscribe while the event is delivered;
    /// one removed mid-dispatch is not called. A listener that is already
    /// running (re-entrant dispatch) is skipped.
    ///
    /// Returns `true` if a listener consumed the event.
    pub fn dispatch(&self, event: &HostEvent) -> bool {
        let channel = event.channel();
        let targets: Vec<(u64, Listener)> = self
            .inner
            .borrow()
            .entries
            .iter()
            .filter(|entry| entry.channel == channel)
            .map(|entry| (entry.id, Rc::clone(&entry.listener)))
            .collect();
        for (id, listener) in targets {
            if !self.inner.borrow().contains(id) {
                continue;
            }
            let Ok(mut listener) = listener.try_borrow_mut() else {
                continue;
            };
            match (&mut *listener)(event) {
                Outcome::Continue => {}
                Outcome::Stop => return false,
                Outcome::StopAndConsume => return true,
            }
        }
        false
    }

    /// Number of registered listeners on all channels.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.inner.borrow().entries.len()
    }

    /// Number of registered listeners on `channel`.
    #[must_use]
    pub fn channel_listener_count(&self, channel: Channel) -> usize {
        self.inner
            .borrow()
            .entries
            .iter()
            .filter(|entry| entry.channel == channel)
            .count()
    }
}

/// Registration of one listener. Dropping it unsubscribes.
#[must_use = "dropping a subscription unsubscribes the listener"]
pub struct Subscription {
    bus: Weak<RefCell<Listeners>>,
    id: u64,
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish_non_exhaustive()
    }
}

impl Subscription {
    /// Returns `true` while the listener is registered.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.bus
            .upgrade()
            .is_some_and(|bus| bus.borrow().contains(self.id))
    }

    /// Unregisters the listener now.
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let Some(bus) = self.bus.upgrade() else {
            return;
        };
        // The listener itself is dropped after the bus borrow ends, so its
        // captures may touch the bus in their own destructors.
        let removed = {
            let mut inner = bus.borrow_mut();
            inner
                .entries
                .iter()
                .position(|entry| entry.id == self.id)
                .map(|index| inner.entries.remove(index))
        };
        drop(removed);
    }
}

/// Teardown handle for the subscriptions of one attached detector.
#[derive(Debug, Default)]
#[must_use = "dropping a disposer unsubscribes its listeners"]
pub struct Disposer {
    subscriptions: Vec<Subscription>,
}

impl Disposer {
    /// Creates an empty disposer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a subscription to tear down with the others.
    pub fn push(&mut self, subscription: Subscription) {
        self.subscriptions.push(subscription);
    }

    /// Number of subscriptions held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    /// Returns `true` if nothing is held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    /// Unsubscribes everything. Calling it again does nothing.
    pub fn dispose(&mut self) {
        self.subscriptions.clear();
    }
}

impl From<Subscription> for Disposer {
    fn from(subscription: Subscription) -> Self {
        Self {
            subscriptions: vec![subscription],
        }
    }
}

impl Extend<Subscription> for Disposer {
    fn extend<I: IntoIterator<Item = Subscription>>(&mut self, iter: I) {
        self.subscriptions.extend(iter);
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use understory_gesture::InputEvent;

    use super::{Channel, Disposer, EventBus, HostEvent, Outcome};

    #[test]
    fn channels_of_events() {
        assert_eq!(HostEvent::from(InputEvent::mouse_up((0.0, 0.0), 0)).channel(), Channel::Mouse);
        assert_eq!(HostEvent::from(InputEvent::wheel((0.0, 0.0), 1.0, 0)).channel(), Channel::Wheel);
        assert_eq!(HostEvent::from(InputEvent::touch_end(&[], 0)).channel(), Channel::Touch);
        assert_eq!(HostEvent::LoadedMetadata.channel(), Channel::Layout);
    }

    #[test]
    fn delivers_in_order_and_only_on_channel() {
        let bus = EventBus::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut disposer = Disposer::new();
        for name in ["a", "b"] {
            let seen = Rc::clone(&seen);
            disposer.push(bus.subscribe(Channel::Layout, move |_| {
                seen.borrow_mut().push(name);
                Outcome::Continue
            }));
        }
        let seen_wheel = Rc::clone(&seen);
        disposer.push(bus.subscribe(Channel::Wheel, move |_| {
            seen_wheel.borrow_mut().push("wheel");
            Outcome::Continue
        }));

        assert!(!bus.dispatch(&HostEvent::Resize));
        assert_eq!(*seen.borrow(), ["a", "b"]);
        assert_eq!(bus.channel_listener_count(Channel::Layout), 2);
        assert_eq!(disposer.len(), 3);
    }

    #[test]
    fn stop_outcomes_end_delivery() {
        let bus = EventBus::new();
        let calls = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&calls);
        let _first = bus.subscribe(Channel::Layout, |event| match event {
            HostEvent::Resize => Outcome::Stop,
            _ => Outcome::StopAndConsume,
        });
        let _second = bus.subscribe(Channel::Layout, move |_| {
            *counter.borrow_mut() += 1;
            Outcome::Continue
        });

        assert!(!bus.dispatch(&HostEvent::Resize));
        assert!(bus.dispatch(&HostEvent::LoadedMetadata));
        assert_eq!(*calls.borrow(), 0);
    }

    #[test]
    fn dispose_is_idempotent() {
        let bus = EventBus::new();
        let mut disposer = Disposer::from(bus.subscribe(Channel::Touch, |_| Outcome::Continue));
        disposer.extend([bus.subscribe(Channel::Mouse, |_| Outcome::Continue)]);
        assert_eq!(bus.listener_count(), 2);
        disposer.dispose();
        disposer.dispose();
        assert!(disposer.is_empty());
        assert_eq!(bus.listener_count(), 0);
    }

    #[test]
    fn listener_removed_mid_dispatch_is_skipped() {
        let bus = EventBus::new();
        let victim: Rc<RefCell<Option<super::Subscription>>> = Rc::new(RefCell::new(None));
        let slot = Rc::clone(&victim);
        let _killer = bus.subscribe(Channel::Layout, move |_| {
            slot.borrow_mut().take();
            Outcome::Continue
        });
        let hit = Rc::new(RefCell::new(false));
        let flag = Rc::clone(&hit);
        *victim.borrow_mut() = Some(bus.subscribe(Channel::Layout, move |_| {
            *flag.borrow_mut() = true;
            Outcome::Continue
        }));

        bus.dispatch(&HostEvent::Resize);
        assert!(!*hit.borrow());
        assert_eq!(bus.listener_count(), 1);
    }

    #[test]
    fn reentrant_dispatch_skips_running_listener() {
        let bus = EventBus::new();
        let depth = Rc::new(RefCell::new(0));
        let inner_bus = bus.clone();
        let counter = Rc::clone(&depth);
        let _sub = bus.subscribe(Channel::Layout, move |_| {
            *counter.borrow_mut() += 1;
            inner_bus.dispatch(&HostEvent::Resize);
            Outcome::Continue
        });
        bus.dispatch(&HostEvent::Resize);
        assert_eq!(*depth.borrow(), 1);
    }

    #[test]
    fn subscription_outliving_bus() {
        let bus = EventBus::new();
        let subscription = bus.subscribe(Channel::Wheel, |_| Outcome::Continue);
        assert!(subscription.is_active());
        drop(bus);
        assert!(!subscription.is_active());
        subscription.unsubscribe();
    }
}
