//! Rolling telemetry buffers and the collector that feeds them.

use crate::collector::source::{DocumentEvents, EventSink, Listener};
use crate::collector::types::{EventKind, InteractionEvent, KeySample, MouseSample};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Arc;

/// Most recent pointer samples retained.
pub const MOUSE_BUFFER_CAPACITY: usize = 50;

/// Most recent key samples retained.
pub const KEY_BUFFER_CAPACITY: usize = 100;

/// Raw interaction state for one form session.
#[derive(Debug, Clone, Default)]
pub struct Telemetry {
    mouse: VecDeque<MouseSample>,
    keys: VecDeque<KeySample>,
    last_key_at: Option<u64>,
    focus_count: u32,
    has_moved: bool,
}

impl Telemetry {
    pub fn new() -> Self {
        Self {
            mouse: VecDeque::with_capacity(MOUSE_BUFFER_CAPACITY + 1),
            keys: VecDeque::with_capacity(KEY_BUFFER_CAPACITY + 1),
            ..Default::default()
        }
    }

    /// Record a pointer position, evicting the oldest beyond capacity.
    pub fn record_mouse_move(&mut self, x: f64, y: f64, now_ms: u64) {
        self.mouse.push_back(MouseSample::new(x, y, now_ms));
        while self.mouse.len() > MOUSE_BUFFER_CAPACITY {
            self.mouse.pop_front();
        }
        self.has_moved = true;
    }

    /// Record a key press with its gap from the previous one.
    pub fn record_key_down(&mut self, key: impl Into<String>, now_ms: u64) {
        // Out-of-order timestamps clamp to a zero gap.
        let delta_ms = self
            .last_key_at
            .map(|last| now_ms.saturating_sub(last))
            .unwrap_or(0);

        self.keys.push_back(KeySample {
            key: key.into(),
            timestamp_ms: now_ms,
            delta_ms,
        });
        while self.keys.len() > KEY_BUFFER_CAPACITY {
            self.keys.pop_front();
        }
        self.last_key_at = Some(now_ms);
    }

    /// Record a focus event on a tracked field.
    pub fn record_focus(&mut self) {
        self.focus_count = self.focus_count.saturating_add(1);
    }

    /// Record a source event.
    pub fn apply(&mut self, event: InteractionEvent) {
        match event {
            InteractionEvent::PointerMove { x, y, timestamp_ms } => {
                self.record_mouse_move(x, y, timestamp_ms)
            }
            InteractionEvent::KeyDown { key, timestamp_ms } => {
                self.record_key_down(key, timestamp_ms)
            }
        }
    }

    /// Pointer samples currently retained.
    pub fn mouse_count(&self) -> usize {
        self.mouse.len()
    }

    /// Key samples currently retained.
    pub fn key_count(&self) -> usize {
        self.keys.len()
    }

    /// Focus events since creation or the last reset.
    pub fn focus_count(&self) -> u32 {
        self.focus_count
    }

    /// Whether any pointer movement has been recorded.
    pub fn has_moved(&self) -> bool {
        self.has_moved
    }

    /// Copy the buffers, oldest sample first.
    pub fn snapshot(&self) -> TelemetrySnapshot {
        TelemetrySnapshot {
            mouse: self.mouse.iter().copied().collect(),
            keys: self.keys.iter().cloned().collect(),
            focus_count: self.focus_count,
            has_moved: self.has_moved,
        }
    }

    /// Clear buffers, counters and the last-key timestamp.
    pub fn reset(&mut self) {
        self.mouse.clear();
        self.keys.clear();
        self.last_key_at = None;
        self.focus_count = 0;
        self.has_moved = false;
    }
}

/// Source events fold straight into the buffers as they are dispatched.
impl EventSink for Mutex<Telemetry> {
    fn deliver(&self, event: InteractionEvent) -> bool {
        self.lock().apply(event);
        true
    }
}

/// Immutable copy of the telemetry at one instant, oldest sample first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySnapshot {
    pub mouse: Vec<MouseSample>,
    pub keys: Vec<KeySample>,
    pub focus_count: u32,
    pub has_moved: bool,
}

/// Collects telemetry for one form session.
///
/// Events arrive either directly through the `on_*` methods or through a
/// [`DocumentEvents`] source once [`activate`](Self::activate) has been
/// called. Either way they are recorded before the call returns.
pub struct TelemetryCollector {
    state: Arc<Mutex<Telemetry>>,
    listeners: Mutex<Vec<Listener>>,
}

impl TelemetryCollector {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(Telemetry::new())),
            listeners: Mutex::new(Vec::new()),
        }
    }

    /// Start listening to pointer-move and key-down events on `source`.
    ///
    /// Returns `false` without registering anything if already active.
    pub fn activate(&self, source: &DocumentEvents) -> bool {
        let mut listeners = self.listeners.lock();
        if !listeners.is_empty() {
            return false;
        }

        let sink: Arc<dyn EventSink> = self.state.clone();
        listeners.push(source.listen(EventKind::PointerMove, Arc::clone(&sink)));
        listeners.push(source.listen(EventKind::KeyDown, sink));
        tracing::debug!("telemetry listeners registered");
        true
    }

    /// Stop listening. Safe to call repeatedly or before any event arrived.
    pub fn deactivate(&self) {
        let released: Vec<Listener> = std::mem::take(&mut *self.listeners.lock());
        if !released.is_empty() {
            tracing::debug!(count = released.len(), "telemetry listeners released");
        }
    }

    /// Whether source listeners are registered.
    pub fn is_active(&self) -> bool {
        !self.listeners.lock().is_empty()
    }

    /// Record a pointer position directly.
    pub fn on_mouse_move(&self, x: f64, y: f64, now_ms: u64) {
        self.state.lock().record_mouse_move(x, y, now_ms);
    }

    /// Record a key press directly.
    pub fn on_key_down(&self, key: impl Into<String>, now_ms: u64) {
        self.state.lock().record_key_down(key, now_ms);
    }

    /// Record a focus event.
    pub fn on_focus(&self) {
        self.state.lock().record_focus();
    }

    /// Copy the current buffers.
    pub fn snapshot(&self) -> TelemetrySnapshot {
        self.state.lock().snapshot()
    }

    /// Clear all telemetry.
    pub fn reset(&self) {
        self.state.lock().reset();
    }
}

impl Default for TelemetryCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TelemetryCollector {
    fn drop(&mut self) {
        self.deactivate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mouse_buffer_keeps_most_recent() {
        let mut telemetry = Telemetry::new();
        for i in 0..120 {
            telemetry.record_mouse_move(i as f64, 0.0, i);
        }

        let snapshot = telemetry.snapshot();
        assert_eq!(snapshot.mouse.len(), MOUSE_BUFFER_CAPACITY);
        assert_eq!(snapshot.mouse.first().unwrap().timestamp_ms, 70);
        assert_eq!(snapshot.mouse.last().unwrap().timestamp_ms, 119);
        assert!(snapshot.has_moved);
    }

    #[test]
    fn test_key_deltas_and_capacity() {
        let mut telemetry = Telemetry::new();
        telemetry.record_key_down("a", 1_000);
        telemetry.record_key_down("b", 1_120);
        telemetry.record_key_down("c", 1_300);

        let keys = telemetry.snapshot().keys;
        let deltas: Vec<u64> = keys.iter().map(|k| k.delta_ms).collect();
        assert_eq!(deltas, vec![0, 120, 180]);

        for i in 0..200 {
            telemetry.record_key_down("x", 2_000 + i * 10);
        }
        assert_eq!(telemetry.key_count(), KEY_BUFFER_CAPACITY);
        // Delta still measured from the event just before, even after eviction.
        assert_eq!(telemetry.snapshot().keys.last().unwrap().delta_ms, 10);
    }

    #[test]
    fn test_key_delta_clamps_backwards_time() {
        let mut telemetry = Telemetry::new();
        telemetry.record_key_down("a", 500);
        telemetry.record_key_down("b", 400);
        assert_eq!(telemetry.snapshot().keys[1].delta_ms, 0);
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut telemetry = Telemetry::new();
        telemetry.record_mouse_move(1.0, 1.0, 1);
        telemetry.record_key_down("a", 10);
        telemetry.record_focus();
        telemetry.reset();

        assert_eq!(telemetry.snapshot(), TelemetrySnapshot::default());
        telemetry.record_key_down("b", 50);
        assert_eq!(telemetry.snapshot().keys[0].delta_ms, 0);
    }

    #[test]
    fn test_activate_is_not_reentrant() {
        let source = DocumentEvents::new();
        let collector = TelemetryCollector::new();

        assert!(collector.activate(&source));
        assert!(!collector.activate(&source));
        assert_eq!(source.listener_count_for(EventKind::PointerMove), 1);
        assert_eq!(source.listener_count_for(EventKind::KeyDown), 1);
    }

    #[test]
    fn test_deactivate_is_idempotent() {
        let source = DocumentEvents::new();
        let collector = TelemetryCollector::new();

        collector.deactivate();
        collector.activate(&source);
        collector.deactivate();
        collector.deactivate();
        assert_eq!(source.listener_count(), 0);
        assert!(!collector.is_active());

        assert!(collector.activate(&source));
        assert_eq!(source.listener_count(), 2);
    }

    #[test]
    fn test_drop_releases_listeners() {
        let source = DocumentEvents::new();
        {
            let collector = TelemetryCollector::new();
            collector.activate(&source);
            assert_eq!(source.listener_count(), 2);
        }
        assert_eq!(source.listener_count(), 0);
    }

    #[test]
    fn test_source_events_reach_buffers() {
        let source = DocumentEvents::new();
        let collector = TelemetryCollector::new();
        collector.activate(&source);

        source.dispatch(InteractionEvent::pointer_move(10.0, 20.0, 5));
        source.dispatch(InteractionEvent::key_down("a", 6));
        source.dispatch(InteractionEvent::key_down("b", 46));

        let snapshot = collector.snapshot();
        assert_eq!(snapshot.mouse.len(), 1);
        assert_eq!(snapshot.keys.len(), 2);
        assert_eq!(snapshot.keys[1].delta_ms, 40);

        collector.deactivate();
        source.dispatch(InteractionEvent::pointer_move(11.0, 20.0, 7));
        assert_eq!(collector.snapshot().mouse.len(), 1);
    }

    #[test]
    fn test_long_mounted_session_keeps_newest_samples() {
        let source = DocumentEvents::new();
        let collector = TelemetryCollector::new();
        collector.activate(&source);

        for i in 0..12_000u64 {
            source.dispatch(InteractionEvent::pointer_move(i as f64, 0.0, i));
        }
        for i in 0..250u64 {
            source.dispatch(InteractionEvent::key_down("k", 20_000 + i * 40));
        }

        let snapshot = collector.snapshot();
        assert_eq!(snapshot.mouse.len(), MOUSE_BUFFER_CAPACITY);
        assert_eq!(snapshot.mouse.first().unwrap().timestamp_ms, 11_950);
        assert_eq!(snapshot.mouse.last().unwrap().timestamp_ms, 11_999);
        assert_eq!(snapshot.keys.len(), KEY_BUFFER_CAPACITY);
        assert_eq!(snapshot.keys.last().unwrap().timestamp_ms, 20_000 + 249 * 40);
    }

    #[test]
    fn test_focus_counter() {
        let collector = TelemetryCollector::new();
        collector.on_focus();
        collector.on_focus();
        assert_eq!(collector.snapshot().focus_count, 2);
    }
}
