//! The `events` module describes the event-registration capability that
//! [`from_event`] turns into an `Observable`, and ships `EventEmitter`, a small
//! in-process implementation of it.
//!
//! [`from_event`]: crate::from_event

use std::{
    collections::HashMap,
    fmt,
    sync::{Arc, Mutex},
};

use crate::subscribe::lock;

/// A callback registered on an [`EventTarget`].
///
/// Listeners are compared by pointer: removing a listener requires a clone of the
/// very `Arc` that was registered.
pub type EventListener<E> = Arc<dyn Fn(E) + Send + Sync>;

/// Anything that can register and remove listeners for named events, in the
/// manner of a DOM `addEventListener` / `removeEventListener` pair.
pub trait EventTarget {
    /// The value handed to listeners when an event fires.
    type Event;

    /// Registers `listener` for `event_name`.
    fn add_event_listener(&self, event_name: &str, listener: EventListener<Self::Event>);

    /// Removes a listener previously registered for `event_name`. Unknown
    /// listeners are ignored.
    fn remove_event_listener(&self, event_name: &str, listener: &EventListener<Self::Event>);
}

fn same_listener<E>(a: &EventListener<E>, b: &EventListener<E>) -> bool {
    Arc::as_ptr(a).cast::<()>() == Arc::as_ptr(b).cast::<()>()
}

/// An [`EventTarget`] that dispatches events to listeners synchronously, on the
/// thread calling [`dispatch`](EventEmitter::dispatch).
///
/// Registering the same listener twice for one event name has no effect.
pub struct EventEmitter<E> {
    listeners: Mutex<HashMap<String, Vec<EventListener<E>>>>,
}

impl<E> EventEmitter<E> {
    #[must_use]
    pub fn new() -> Self {
        EventEmitter {
            listeners: Mutex::new(HashMap::new()),
        }
    }

    /// Number of listeners currently registered for `event_name`.
    #[must_use]
    pub fn listener_count(&self, event_name: &str) -> usize {
        lock(&self.listeners).get(event_name).map_or(0, Vec::len)
    }
}

impl<E: Clone> EventEmitter<E> {
    /// Fires `event_name`, handing a clone of `event` to every registered listener,
    /// and returns how many listeners were called.
    ///
    /// Listeners run outside the internal lock, so they may add or remove listeners.
    /// Such changes take effect from the next dispatch.
    pub fn dispatch(&self, event_name: &str, event: E) -> usize {
        let listeners = lock(&self.listeners)
            .get(event_name)
            .cloned()
            .unwrap_or_default();

        tracing::trace!(event_name, listeners = listeners.len(), "dispatching event");
        for listener in &listeners {
            listener(event.clone());
        }
        listeners.len()
    }
}

impl<E> Default for EventEmitter<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for EventEmitter<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let listeners = lock(&self.listeners);
        let mut counts: Vec<(&str, usize)> = listeners
            .iter()
            .map(|(name, l)| (name.as_str(), l.len()))
            .collect();
        counts.sort_unstable();
        f.debug_struct("EventEmitter")
            .field("listeners", &counts)
            .finish()
    }
}

impl<E> EventTarget for EventEmitter<E> {
    type Event = E;

    fn add_event_listener(&self, event_name: &str, listener: EventListener<E>) {
        let mut listeners = lock(&self.listeners);
        let registered = listeners.entry(event_name.to_owned()).or_default();
        if !registered.iter().any(|l| same_listener(l, &listener)) {
            registered.push(listener);
        }
    }

    fn remove_event_listener(&self, event_name: &str, listener: &EventListener<E>) {
        let mut listeners = lock(&self.listeners);
        if let Some(registered) = listeners.get_mut(event_name) {
            registered.retain(|l| !same_listener(l, listener));
            if registered.is_empty() {
                listeners.remove(event_name);
            }
        }
    }
}
