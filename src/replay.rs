//! Replay of recorded interaction traces.
//!
//! A trace is a JSON document of timed interaction events plus the submitted
//! field values. Replaying runs it through a [`FormGuard`] on a manual clock
//! that starts at 0, so `at_ms` values are offsets from form mount.

use crate::collector::clock::ManualClock;
use crate::collector::source::DocumentEvents;
use crate::collector::types::InteractionEvent;
use crate::config::GuardConfig;
use crate::core::coordinator::{FormFields, FormGuard, SubmitOutcome};
use crate::core::environment::HostSignals;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReplayTrace {
    #[serde(default)]
    pub environment: HostSignals,
    /// Field values submitted with the form
    #[serde(default)]
    pub fields: FormFields,
    /// Offset from mount at which the form is submitted
    pub submit_at_ms: u64,
    #[serde(default)]
    pub events: Vec<TraceEvent>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceEvent {
    pub at_ms: u64,
    #[serde(flatten)]
    pub action: TraceAction,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TraceAction {
    PointerMove { x: f64, y: f64 },
    KeyDown { key: String },
    Focus,
    HoneypotChange { field: String, value: String },
}

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid trace: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ReplayTrace {
    /// Read a trace from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ReplayError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse a trace from JSON text.
    pub fn from_json(json: &str) -> Result<Self, ReplayError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Replay `trace` and submit at `submit_at_ms` with a handler that accepts.
///
/// Events are applied in `at_ms` order; ties keep their order in the file.
pub async fn replay(trace: &ReplayTrace, config: GuardConfig) -> SubmitOutcome {
    let clock = Arc::new(ManualClock::new(0));
    let guard = FormGuard::with_clock(config, clock.clone())
        .with_environment(Arc::new(trace.environment.clone()));

    let source = DocumentEvents::new();
    guard.mount(&source);

    let mut events = trace.events.clone();
    events.sort_by_key(|e| e.at_ms);

    for event in events {
        clock.set(event.at_ms);
        match event.action {
            TraceAction::PointerMove { x, y } => {
                source.dispatch(InteractionEvent::pointer_move(x, y, event.at_ms));
            }
            TraceAction::KeyDown { key } => {
                source.dispatch(InteractionEvent::key_down(key, event.at_ms));
            }
            TraceAction::Focus => guard.on_focus(),
            TraceAction::HoneypotChange { field, value } => {
                guard.on_honeypot_change(&field, &value);
            }
        }
    }

    clock.set(trace.submit_at_ms);
    let outcome = guard
        .submit(trace.fields.clone(), |_, _| async { anyhow::Ok(()) })
        .await;

    guard.unmount();
    outcome
}
