//! formtrap - behavioral and honeypot bot detection for web forms.
//!
//! A form session passively collects pointer movement, key cadence and focus
//! events, exposes hidden honeypot fields, and at submission time merges a
//! behavioral suspicion score with the honeypot latch into one verdict.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                          FormGuard                           │
//! ├──────────────────────────────────────────────────────────────┤
//! │  ┌────────────┐   ┌────────────┐   ┌──────────────────┐      │
//! │  │ Telemetry  │──▶│ Behavior   │──▶│ Merge + honeypot │──▶ submit / withhold
//! │  │ Collector  │   │ Scorer     │   │ (score ≥ 50)     │      │
//! │  └────────────┘   └────────────┘   └──────────────────┘      │
//! │        ▲                                   ▲                 │
//! │  DocumentEvents                      HoneypotTrap            │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use formtrap::{DocumentEvents, FormFields, FormGuard, GuardConfig};
//!
//! # async fn run() {
//! let events = DocumentEvents::new();
//! let guard = FormGuard::new(GuardConfig::default())
//!     .on_bot_detected(|result| eprintln!("withheld: {:?}", result.reasons));
//! guard.mount(&events);
//!
//! // ... host forwards pointer/key events into `events`, focus into `guard.on_focus()` ...
//!
//! let outcome = guard
//!     .submit(FormFields::new(), |fields, _result| async move {
//!         println!("sending {} fields", fields.len());
//!         anyhow::Ok(())
//!     })
//!     .await;
//! guard.unmount();
//! # let _ = outcome;
//! # }
//! ```

pub mod collector;
pub mod config;
pub mod core;
pub mod honeypot;
pub mod replay;
pub mod transparency;

// Re-export key types at crate root for convenience
pub use collector::{
    Clock, DocumentEvents, InteractionEvent, ManualClock, SystemClock, TelemetryCollector,
    TelemetrySnapshot,
};
pub use config::{ConfigError, GuardConfig};
pub use crate::core::{
    merge_honeypot, score_behavior, Environment, FormFields, FormGuard, FormSession, HostSignals,
    ScoreResult, SessionStats, Signal, SubmitOutcome, BOT_THRESHOLD,
};
pub use honeypot::{HoneypotTrap, TriggerState, DEFAULT_HONEYPOT_FIELDS};
pub use replay::{replay, ReplayError, ReplayTrace};
pub use transparency::{DetectionLog, DetectionStats, SharedDetectionLog};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Advisory that callers can show to integrators.
pub const DISCLOSURE: &str = r#"
╔══════════════════════════════════════════════════════════════════╗
║                    FORMTRAP - DETECTION NOTICE                   ║
╠══════════════════════════════════════════════════════════════════╣
║                                                                  ║
║  formtrap computes a bot signal in the client.                   ║
║                                                                  ║
║  ✓ WHAT IT LOOKS AT:                                             ║
║    • Pointer movement and typing cadence                         ║
║    • Focus events and time spent on the form                     ║
║    • Automation flags reported by the browser                    ║
║    • Hidden honeypot fields                                      ║
║                                                                  ║
║  ✗ WHAT IT IS NOT:                                               ║
║    • Not a CAPTCHA and not a server-side risk engine             ║
║    • Not tamper-proof: a determined bot can bypass it            ║
║                                                                  ║
║  Always re-validate submissions on the server. Nothing is        ║
║  persisted or sent anywhere by this library.                     ║
║                                                                  ║
╚══════════════════════════════════════════════════════════════════╝
"#;
