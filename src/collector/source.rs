//! Document-level event source.
//!
//! The host (a browser binding, a test, or the trace replayer) pushes pointer
//! and key events into [`DocumentEvents`]. Listeners subscribe per
//! [`EventKind`] with an [`EventSink`] and hold a [`Listener`] handle; dropping
//! the handle removes the registration.

use crate::collector::types::{EventKind, InteractionEvent};
use crossbeam_channel::Sender;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::{Arc, Weak};

/// Receives events as they are dispatched.
pub trait EventSink: Send + Sync {
    /// Take one event. Returns `false` if the event was not accepted.
    fn deliver(&self, event: InteractionEvent) -> bool;
}

/// Forwards to a channel, for observers on another thread.
///
/// A full or disconnected channel misses the event.
impl EventSink for Sender<InteractionEvent> {
    fn deliver(&self, event: InteractionEvent) -> bool {
        self.try_send(event).is_ok()
    }
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    listeners: HashMap<u64, (EventKind, Arc<dyn EventSink>)>,
}

/// Fan-out point for document-level pointer and key events.
#[derive(Clone, Default)]
pub struct DocumentEvents {
    registry: Arc<Mutex<Registry>>,
}

impl DocumentEvents {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener for one kind of event.
    pub fn listen(&self, kind: EventKind, sink: Arc<dyn EventSink>) -> Listener {
        let mut registry = self.registry.lock();
        let id = registry.next_id;
        registry.next_id += 1;
        registry.listeners.insert(id, (kind, sink));

        Listener {
            id,
            kind,
            registry: Arc::downgrade(&self.registry),
        }
    }

    /// Deliver an event to every listener of its kind, synchronously.
    ///
    /// Returns how many listeners accepted it. Sinks run after the registry
    /// lock is released.
    pub fn dispatch(&self, event: InteractionEvent) -> usize {
        let kind = event.kind();
        let sinks: Vec<Arc<dyn EventSink>> = self
            .registry
            .lock()
            .listeners
            .values()
            .filter(|(k, _)| *k == kind)
            .map(|(_, sink)| Arc::clone(sink))
            .collect();

        sinks
            .iter()
            .filter(|sink| sink.deliver(event.clone()))
            .count()
    }

    /// Number of live listeners across all kinds.
    pub fn listener_count(&self) -> usize {
        self.registry.lock().listeners.len()
    }

    /// Number of live listeners for one kind.
    pub fn listener_count_for(&self, kind: EventKind) -> usize {
        self.registry
            .lock()
            .listeners
            .values()
            .filter(|(k, _)| *k == kind)
            .count()
    }
}

impl std::fmt::Debug for DocumentEvents {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentEvents")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

/// Registration handle. Deregisters exactly once, on drop.
#[derive(Debug)]
pub struct Listener {
    id: u64,
    kind: EventKind,
    registry: Weak<Mutex<Registry>>,
}

impl Listener {
    /// Event kind this handle is registered for.
    pub fn kind(&self) -> EventKind {
        self.kind
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        // The source may already be gone; nothing to remove then.
        if let Some(registry) = self.registry.upgrade() {
            registry.lock().listeners.remove(&self.id);
        }
    }
}
