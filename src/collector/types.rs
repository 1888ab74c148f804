//! Interaction event types for the form telemetry collector.
//!
//! Samples carry raw pointer coordinates and key identifiers because the
//! heuristics need step distances and cadence. Nothing here leaves the
//! form session.

use serde::{Deserialize, Serialize};

/// A pointer position captured on a pointer-move event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MouseSample {
    pub x: f64,
    pub y: f64,
    /// Epoch milliseconds when the move was observed
    pub timestamp_ms: u64,
}

impl MouseSample {
    pub fn new(x: f64, y: f64, timestamp_ms: u64) -> Self {
        Self { x, y, timestamp_ms }
    }

    /// Manhattan distance to another sample.
    pub fn manhattan_distance(&self, other: &MouseSample) -> f64 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }
}

/// A key-down captured with its gap to the previous key-down.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeySample {
    pub key: String,
    pub timestamp_ms: u64,
    /// Milliseconds since the previous key-down, 0 for the first one
    pub delta_ms: u64,
}

/// Which document-level event a listener is interested in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    PointerMove,
    KeyDown,
}

/// Unified document-level event delivered to the collector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InteractionEvent {
    PointerMove { x: f64, y: f64, timestamp_ms: u64 },
    KeyDown { key: String, timestamp_ms: u64 },
}

impl InteractionEvent {
    pub fn pointer_move(x: f64, y: f64, timestamp_ms: u64) -> Self {
        InteractionEvent::PointerMove { x, y, timestamp_ms }
    }

    pub fn key_down(key: impl Into<String>, timestamp_ms: u64) -> Self {
        InteractionEvent::KeyDown {
            key: key.into(),
            timestamp_ms,
        }
    }

    pub fn kind(&self) -> EventKind {
        match self {
            InteractionEvent::PointerMove { .. } => EventKind::PointerMove,
            InteractionEvent::KeyDown { .. } => EventKind::KeyDown,
        }
    }

    pub fn timestamp_ms(&self) -> u64 {
        match self {
            InteractionEvent::PointerMove { timestamp_ms, .. } => *timestamp_ms,
            InteractionEvent::KeyDown { timestamp_ms, .. } => *timestamp_ms,
        }
    }
}
