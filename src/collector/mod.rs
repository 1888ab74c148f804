//! Passive interaction telemetry for a form session.
//!
//! This module owns the rolling pointer and key buffers, the focus counter,
//! and the subscription lifecycle against a document-level event source.

pub mod clock;
pub mod source;
pub mod telemetry;
pub mod types;

// Re-export commonly used types
pub use clock::{Clock, ManualClock, SystemClock};
pub use source::{DocumentEvents, EventSink, Listener};
pub use telemetry::{
    Telemetry, TelemetryCollector, TelemetrySnapshot, KEY_BUFFER_CAPACITY, MOUSE_BUFFER_CAPACITY,
};
pub use types::{EventKind, InteractionEvent, KeySample, MouseSample};
