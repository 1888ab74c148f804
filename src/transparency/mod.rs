//! Operational record of detection decisions.

pub mod log;

// Re-export commonly used types
pub use log::{create_shared_log, DetectionLog, DetectionStats, SharedDetectionLog};
