//! Detection log.
//!
//! Counts what the guard decided over its lifetime. No field values, key
//! identifiers or pointer coordinates are stored here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

#[derive(Debug)]
pub struct DetectionLog {
    /// Submission attempts that reached evaluation
    submissions: AtomicU64,
    /// Submissions withheld as bots
    bots_detected: AtomicU64,
    /// Submissions forwarded to the caller's handler
    forwarded: AtomicU64,
    /// Handler invocations that failed
    handler_failures: AtomicU64,
    /// Honeypot latches
    honeypot_trips: AtomicU64,
    started_at: DateTime<Utc>,
}

impl DetectionLog {
    pub fn new() -> Self {
        Self {
            submissions: AtomicU64::new(0),
            bots_detected: AtomicU64::new(0),
            forwarded: AtomicU64::new(0),
            handler_failures: AtomicU64::new(0),
            honeypot_trips: AtomicU64::new(0),
            started_at: Utc::now(),
        }
    }

    /// Record a submission attempt.
    pub fn record_submission(&self) {
        self.submissions.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a withheld submission.
    pub fn record_bot_detected(&self) {
        self.bots_detected.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a submission handed to the handler.
    pub fn record_forwarded(&self) {
        self.forwarded.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a failed submit handler.
    pub fn record_handler_failure(&self) {
        self.handler_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a honeypot latch.
    pub fn record_honeypot_trip(&self) {
        self.honeypot_trips.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current statistics.
    pub fn stats(&self) -> DetectionStats {
        DetectionStats {
            submissions: self.submissions.load(Ordering::Relaxed),
            bots_detected: self.bots_detected.load(Ordering::Relaxed),
            forwarded: self.forwarded.load(Ordering::Relaxed),
            handler_failures: self.handler_failures.load(Ordering::Relaxed),
            honeypot_trips: self.honeypot_trips.load(Ordering::Relaxed),
            started_at: self.started_at,
        }
    }

    /// Get a human-readable summary.
    pub fn summary(&self) -> String {
        let stats = self.stats();
        format!(
            "Detection Statistics:\n\
             - Submissions evaluated: {}\n\
             - Withheld as bot: {}\n\
             - Forwarded to handler: {}\n\
             - Handler failures: {}\n\
             - Honeypot trips: {}\n\
             - Tracking since: {}",
            stats.submissions,
            stats.bots_detected,
            stats.forwarded,
            stats.handler_failures,
            stats.honeypot_trips,
            stats.started_at.to_rfc3339()
        )
    }

    pub fn reset(&self) {
        self.submissions.store(0, Ordering::Relaxed);
        self.bots_detected.store(0, Ordering::Relaxed);
        self.forwarded.store(0, Ordering::Relaxed);
        self.handler_failures.store(0, Ordering::Relaxed);
        self.honeypot_trips.store(0, Ordering::Relaxed);
    }
}

impl Default for DetectionLog {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of detection counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionStats {
    pub submissions: u64,
    pub bots_detected: u64,
    pub forwarded: u64,
    pub handler_failures: u64,
    pub honeypot_trips: u64,
    pub started_at: DateTime<Utc>,
}

/// Thread-safe shared detection log.
pub type SharedDetectionLog = Arc<DetectionLog>;

pub fn create_shared_log() -> SharedDetectionLog {
    Arc::new(DetectionLog::new())
}
