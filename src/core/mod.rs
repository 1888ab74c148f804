//! Core detection logic.
//!
//! This module contains:
//! - Host environment probes for automation indicators
//! - Behavioral scoring of telemetry snapshots
//! - The submission-time coordinator that merges in the honeypot signal

pub mod coordinator;
pub mod environment;
pub mod result;
pub mod scoring;

// Re-export commonly used types
pub use coordinator::{merge_honeypot, FormFields, FormGuard, SubmitOutcome};
pub use environment::{Environment, HostSignals};
pub use result::{ScoreResult, SessionStats, Signal, BOT_THRESHOLD};
pub use scoring::{score_behavior, FormSession};
