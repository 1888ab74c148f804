//! Submission-time coordination.
//!
//! [`FormGuard`] owns one form session: the telemetry collector, the honeypot
//! trap and the submitting flag. On submit it scores the live telemetry,
//! merges the honeypot latch, and either withholds the submission or hands
//! the field values to the caller's handler.

use crate::collector::clock::{Clock, SystemClock};
use crate::collector::source::DocumentEvents;
use crate::collector::telemetry::TelemetryCollector;
use crate::config::GuardConfig;
use crate::core::environment::{Environment, HostSignals};
use crate::core::result::{ScoreResult, Signal, BOT_THRESHOLD};
use crate::core::scoring::{score_behavior, FormSession};
use crate::honeypot::{render_honeypot, render_trigger, HoneypotTrap, TriggerState};
use crate::transparency::{create_shared_log, SharedDetectionLog};
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Flat name → value map of a submitted form.
pub type FormFields = BTreeMap<String, String>;

type BotCallback = Box<dyn Fn(&ScoreResult) + Send + Sync>;
type TriggerRenderer = Box<dyn Fn(&TriggerState) -> String + Send + Sync>;

/// How a submission attempt ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The handler ran and completed
    Submitted(ScoreResult),
    /// Classified as a bot; the handler was not called
    BotDetected(ScoreResult),
    /// The handler ran and failed; the error was logged
    HandlerFailed(ScoreResult),
    /// Another submission was still pending
    InProgress,
}

impl SubmitOutcome {
    /// Merged result, unless the attempt was rejected as re-entrant.
    pub fn result(&self) -> Option<&ScoreResult> {
        match self {
            SubmitOutcome::Submitted(r)
            | SubmitOutcome::BotDetected(r)
            | SubmitOutcome::HandlerFailed(r) => Some(r),
            SubmitOutcome::InProgress => None,
        }
    }

    /// Whether the submission was withheld.
    pub fn is_bot(&self) -> bool {
        matches!(self, SubmitOutcome::BotDetected(_))
    }
}

/// Fold the honeypot latch into a behavioral result.
///
/// A tripped honeypot adds its weight and reason last, and is a bot verdict
/// on its own regardless of the numeric score.
pub fn merge_honeypot(mut behavior: ScoreResult, honeypot_triggered: bool) -> ScoreResult {
    if honeypot_triggered {
        behavior.push(Signal::HoneypotFilled);
    }
    behavior.honeypot_triggered = honeypot_triggered;
    behavior.is_bot = behavior.score >= BOT_THRESHOLD || honeypot_triggered;
    behavior
}

/// Holds the submitting flag for the duration of one submission.
struct SubmittingFlag<'a>(&'a AtomicBool);

impl<'a> SubmittingFlag<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for SubmittingFlag<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct FormGuard {
    config: GuardConfig,
    session: FormSession,
    collector: TelemetryCollector,
    trap: HoneypotTrap,
    clock: Arc<dyn Clock>,
    environment: Arc<dyn Environment>,
    submitting: AtomicBool,
    on_bot_detected: Option<BotCallback>,
    trigger_renderer: Option<TriggerRenderer>,
    log: SharedDetectionLog,
}

impl FormGuard {
    /// Start a guarded session on the wall clock.
    pub fn new(config: GuardConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Start a guarded session on the given clock.
    pub fn with_clock(config: GuardConfig, clock: Arc<dyn Clock>) -> Self {
        let session = FormSession::start(clock.as_ref());
        let trap = HoneypotTrap::new(config.honeypot_fields.clone());

        tracing::debug!(
            session = %session.id(),
            fields = trap.fields().len(),
            "form session started"
        );

        Self {
            config,
            session,
            collector: TelemetryCollector::new(),
            trap,
            clock,
            environment: Arc::new(HostSignals::default()),
            submitting: AtomicBool::new(false),
            on_bot_detected: None,
            trigger_renderer: None,
            log: create_shared_log(),
        }
    }

    /// Read automation flags from `environment` at scoring time.
    pub fn with_environment(mut self, environment: Arc<dyn Environment>) -> Self {
        self.environment = environment;
        self
    }

    /// Share a detection log across guards.
    pub fn with_log(mut self, log: SharedDetectionLog) -> Self {
        self.log = log;
        self
    }

    /// Called with the merged result whenever a submission is withheld.
    pub fn on_bot_detected(
        mut self,
        callback: impl Fn(&ScoreResult) + Send + Sync + 'static,
    ) -> Self {
        self.on_bot_detected = Some(Box::new(callback));
        self
    }

    /// Called once, with the field name, when the honeypot latches.
    pub fn on_honeypot_trip(mut self, callback: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.trap = std::mem::take(&mut self.trap).on_trip(callback);
        self
    }

    /// Replace the default `<button>` markup.
    pub fn with_trigger_renderer(
        mut self,
        renderer: impl Fn(&TriggerState) -> String + Send + Sync + 'static,
    ) -> Self {
        self.trigger_renderer = Some(Box::new(renderer));
        self
    }

    /// Configuration this guard was built with.
    pub fn config(&self) -> &GuardConfig {
        &self.config
    }

    /// The form session.
    pub fn session(&self) -> &FormSession {
        &self.session
    }

    /// The telemetry collector.
    pub fn collector(&self) -> &TelemetryCollector {
        &self.collector
    }

    /// The honeypot trap.
    pub fn trap(&self) -> &HoneypotTrap {
        &self.trap
    }

    /// Detection counters.
    pub fn log(&self) -> &SharedDetectionLog {
        &self.log
    }

    /// Begin collecting document-level pointer and key events.
    pub fn mount(&self, source: &DocumentEvents) -> bool {
        self.collector.activate(source)
    }

    /// Release the document-level listeners.
    pub fn unmount(&self) {
        self.collector.deactivate();
    }

    /// Record a pointer position at the current clock time.
    pub fn on_mouse_move(&self, x: f64, y: f64) {
        self.collector.on_mouse_move(x, y, self.clock.now_ms());
    }

    /// Record a key press at the current clock time.
    pub fn on_key_down(&self, key: impl Into<String>) {
        self.collector.on_key_down(key, self.clock.now_ms());
    }

    /// A tracked field received focus.
    pub fn on_focus(&self) {
        self.collector.on_focus();
    }

    /// A trap field changed. Returns `true` if this change latched the trap.
    pub fn on_honeypot_change(&self, field: &str, value: &str) -> bool {
        let latched = self.trap.on_value_change(field, value);
        if latched {
            self.log.record_honeypot_trip();
            tracing::warn!(session = %self.session.id(), field, "honeypot field filled");
        }
        latched
    }

    /// Hidden markup for the configured trap fields.
    pub fn honeypot_markup(&self) -> String {
        render_honeypot(self.trap.fields())
    }

    /// Whether a submission is pending.
    pub fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::Acquire)
    }

    /// Trigger state depends only on whether a submission is pending.
    pub fn trigger_state(&self) -> TriggerState {
        let submitting = self.is_submitting();
        TriggerState {
            disabled: submitting,
            label: if submitting {
                self.config.loading_label.clone()
            } else {
                self.config.submit_label.clone()
            },
        }
    }

    /// Markup for the submit control in its current state.
    pub fn render_trigger(&self) -> String {
        let state = self.trigger_state();
        match self.trigger_renderer {
            Some(ref renderer) => renderer(&state),
            None => render_trigger(&state),
        }
    }

    /// Behavioral score of the live telemetry, honeypot not included.
    pub fn score(&self) -> ScoreResult {
        let snapshot = self.collector.snapshot();
        score_behavior(
            &snapshot,
            &self.session,
            self.clock.now_ms(),
            self.environment.as_ref(),
        )
    }

    /// Behavioral score merged with the honeypot latch.
    pub fn evaluate(&self) -> ScoreResult {
        let result = merge_honeypot(self.score(), self.trap.is_triggered());
        if self.config.debug {
            tracing::debug!(session = %self.session.id(), "evaluation\n{}", result.summary());
        }
        result
    }

    /// Evaluate and, unless the session looks automated, run `on_submit`.
    ///
    /// Trap values present in `fields` are checked first, so a filler that
    /// wrote them without change events is still caught. Trap fields are
    /// removed before the handler sees the map. Handler errors are logged and
    /// reported as [`SubmitOutcome::HandlerFailed`]; they never propagate.
    pub async fn submit<F, Fut>(&self, fields: FormFields, on_submit: F) -> SubmitOutcome
    where
        F: FnOnce(FormFields, ScoreResult) -> Fut,
        Fut: Future<Output = anyhow::Result<()>>,
    {
        let Some(_submitting) = SubmittingFlag::acquire(&self.submitting) else {
            tracing::debug!(session = %self.session.id(), "submission already pending");
            return SubmitOutcome::InProgress;
        };

        self.log.record_submission();

        for field in self.trap.fields() {
            if let Some(value) = fields.get(field) {
                self.on_honeypot_change(field, value);
            }
        }

        let result = self.evaluate();

        if result.is_bot {
            self.log.record_bot_detected();
            tracing::info!(
                session = %self.session.id(),
                score = result.score,
                reasons = ?result.reasons,
                "submission withheld"
            );
            if let Some(ref callback) = self.on_bot_detected {
                callback(&result);
            }
            return SubmitOutcome::BotDetected(result);
        }

        let payload: FormFields = fields
            .into_iter()
            .filter(|(name, _)| !self.trap.is_trap_field(name))
            .collect();

        self.log.record_forwarded();
        match on_submit(payload, result.clone()).await {
            Ok(()) => SubmitOutcome::Submitted(result),
            Err(err) => {
                self.log.record_handler_failure();
                tracing::error!(
                    session = %self.session.id(),
                    error = %err,
                    "formtrap: submit handler failed"
                );
                SubmitOutcome::HandlerFailed(result)
            }
        }
    }

    /// Un-latch the honeypot and clear collected telemetry.
    ///
    /// The session start time is kept.
    pub fn reset(&self) {
        self.trap.reset();
        self.collector.reset();
        tracing::debug!(session = %self.session.id(), "form session reset");
    }
}

impl Default for FormGuard {
    fn default() -> Self {
        Self::new(GuardConfig::default())
    }
}
