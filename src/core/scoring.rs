//! Behavioral scoring of a telemetry snapshot.
//!
//! Every rule is evaluated independently and adds its weight when it fires.
//! The pass is pure: the same snapshot, session, `now_ms` and environment
//! always produce the same result.

use crate::collector::clock::Clock;
use crate::collector::telemetry::TelemetrySnapshot;
use crate::collector::types::{KeySample, MouseSample};
use crate::core::environment::Environment;
use crate::core::result::{ScoreResult, SessionStats, Signal};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use uuid::Uuid;

/// Fewer pointer samples than this counts as no movement at all.
const MIN_MOUSE_SAMPLES: usize = 5;

/// Window of recent pointer samples used for step analysis.
const MOUSE_WINDOW: usize = 20;

/// Mean Manhattan step (px) below which movement looks synthetic.
const MIN_MEAN_MOUSE_STEP: f64 = 5.0;

/// Key samples required before cadence is analysed.
const MIN_KEY_SAMPLES: usize = 10;

/// Window of recent key samples used for cadence analysis.
const KEY_WINDOW: usize = 20;

/// Gaps at or above this are pauses, not cadence.
const MAX_CADENCE_GAP_MS: u64 = 1000;

/// Qualifying gaps required before cadence statistics are trusted.
const MIN_CADENCE_GAPS: usize = 6;

/// Cadence variance (ms²) below which typing looks scripted.
const MIN_CADENCE_VARIANCE: f64 = 100.0;

/// Mean gap (ms) below which typing is faster than a person.
const MIN_CADENCE_MEAN_MS: f64 = 50.0;

/// Time on form (ms) below which the fill is too fast.
const MIN_FILL_TIME_MS: u64 = 2000;

/// Focus events required on tracked fields.
const MIN_FOCUS_EVENTS: u32 = 2;

/// One form session. The start timestamp never changes after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormSession {
    id: Uuid,
    started_at_ms: u64,
}

impl FormSession {
    /// Start a session now.
    pub fn start(clock: &dyn Clock) -> Self {
        Self::starting_at(clock.now_ms())
    }

    pub fn starting_at(started_at_ms: u64) -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at_ms,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn started_at_ms(&self) -> u64 {
        self.started_at_ms
    }

    pub fn elapsed_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.started_at_ms)
    }
}

/// Score a telemetry snapshot.
///
/// `honeypot_triggered` is always false here; the coordinator merges the
/// honeypot signal separately.
pub fn score_behavior(
    snapshot: &TelemetrySnapshot,
    session: &FormSession,
    now_ms: u64,
    environment: &dyn Environment,
) -> ScoreResult {
    let elapsed_ms = session.elapsed_ms(now_ms);
    let mut result = ScoreResult::new(SessionStats {
        mouse_count: snapshot.mouse.len(),
        key_count: snapshot.keys.len(),
        focus_count: snapshot.focus_count,
        elapsed_ms,
    });

    if !snapshot.has_moved || snapshot.mouse.len() < MIN_MOUSE_SAMPLES {
        result.push(Signal::NoMouseMovement);
    } else if mean_mouse_step(&snapshot.mouse) < MIN_MEAN_MOUSE_STEP {
        result.push(Signal::UnnaturalMouseMovement);
    }

    if let Some(cadence) = typing_cadence(&snapshot.keys) {
        if cadence.variance < MIN_CADENCE_VARIANCE {
            result.push(Signal::ConsistentTyping);
        }
        if cadence.mean < MIN_CADENCE_MEAN_MS {
            result.push(Signal::SuperhumanTyping);
        }
    }

    if elapsed_ms < MIN_FILL_TIME_MS {
        result.push(Signal::FilledTooQuickly);
    }

    if snapshot.focus_count < MIN_FOCUS_EVENTS {
        result.push(Signal::InsufficientFocus);
    }

    if environment.is_automated_browser() {
        result.push(Signal::AutomatedBrowser);
    }

    if environment.has_zero_outer_viewport() {
        result.push(Signal::HeadlessBrowser);
    }

    result
}

/// Mean Manhattan distance between consecutive recent pointer samples.
fn mean_mouse_step(samples: &[MouseSample]) -> f64 {
    let recent = &samples[samples.len().saturating_sub(MOUSE_WINDOW)..];
    let steps: Vec<f64> = recent
        .windows(2)
        .map(|pair| pair[0].manhattan_distance(&pair[1]))
        .collect();

    if steps.is_empty() {
        return 0.0;
    }
    steps.iter().mean()
}

/// Mean and population variance of recent inter-key gaps.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Cadence {
    mean: f64,
    variance: f64,
}

fn typing_cadence(keys: &[KeySample]) -> Option<Cadence> {
    if keys.len() < MIN_KEY_SAMPLES {
        return None;
    }

    let recent = &keys[keys.len().saturating_sub(KEY_WINDOW)..];
    let gaps: Vec<f64> = recent
        .iter()
        .map(|k| k.delta_ms)
        .filter(|&d| d > 0 && d < MAX_CADENCE_GAP_MS)
        .map(|d| d as f64)
        .collect();

    if gaps.len() < MIN_CADENCE_GAPS {
        return None;
    }

    Some(Cadence {
        mean: gaps.iter().mean(),
        variance: gaps.iter().population_variance(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::telemetry::Telemetry;
    use crate::core::environment::HostSignals;

    fn session() -> FormSession {
        FormSession::starting_at(0)
    }

    fn human_mouse(telemetry: &mut Telemetry) {
        for i in 0..12u64 {
            let x = (i * 23) as f64;
            let y = (i * 7 % 40) as f64;
            telemetry.record_mouse_move(x, y, 100 + i * 16);
        }
    }

    fn keys_at_spacing(telemetry: &mut Telemetry, count: u64, spacing_ms: u64) {
        for i in 0..count {
            telemetry.record_key_down("k", 1_000 + i * spacing_ms);
        }
    }

    #[test]
    fn test_fresh_session_is_bot() {
        let snapshot = Telemetry::new().snapshot();
        let result = score_behavior(&snapshot, &session(), 0, &HostSignals::default());

        assert_eq!(
            result.signals,
            vec![
                Signal::NoMouseMovement,
                Signal::FilledTooQuickly,
                Signal::InsufficientFocus
            ]
        );
        assert_eq!(result.score, 85);
        assert!(result.is_bot);
        assert!(!result.honeypot_triggered);
    }

    #[test]
    fn test_four_samples_is_no_movement_not_unnatural() {
        let mut telemetry = Telemetry::new();
        for i in 0..4 {
            telemetry.record_mouse_move(0.0, 0.0, i);
        }
        let result = score_behavior(
            &telemetry.snapshot(),
            &session(),
            5_000,
            &HostSignals::default(),
        );

        assert!(result.has_signal(Signal::NoMouseMovement));
        assert!(!result.has_signal(Signal::UnnaturalMouseMovement));
    }

    #[test]
    fn test_five_samples_is_scored_for_step() {
        let mut telemetry = Telemetry::new();
        for i in 0..5 {
            telemetry.record_mouse_move(0.0, 0.0, i);
        }
        let result = score_behavior(
            &telemetry.snapshot(),
            &session(),
            5_000,
            &HostSignals::default(),
        );

        assert!(!result.has_signal(Signal::NoMouseMovement));
        assert!(result.has_signal(Signal::UnnaturalMouseMovement));
    }

    #[test]
    fn test_mean_step_of_exactly_five_is_natural() {
        let mut telemetry = Telemetry::new();
        // Alternating axes, 5 px per step either way.
        for i in 0..11u64 {
            let (x, y) = ((i / 2 * 5) as f64, ((i + 1) / 2 * 5) as f64);
            telemetry.record_mouse_move(x, y, i * 16);
        }
        assert_eq!(mean_mouse_step(&telemetry.snapshot().mouse), 5.0);

        let result = score_behavior(
            &telemetry.snapshot(),
            &session(),
            5_000,
            &HostSignals::default(),
        );
        assert!(!result.has_signal(Signal::NoMouseMovement));
        assert!(!result.has_signal(Signal::UnnaturalMouseMovement));
    }

    #[test]
    fn test_jittery_mouse_is_unnatural() {
        let mut telemetry = Telemetry::new();
        for i in 0..10u64 {
            telemetry.record_mouse_move((i % 2) as f64, 0.0, i * 16);
        }
        let result = score_behavior(
            &telemetry.snapshot(),
            &session(),
            5_000,
            &HostSignals::default(),
        );

        assert!(!result.has_signal(Signal::NoMouseMovement));
        assert!(result.has_signal(Signal::UnnaturalMouseMovement));
    }

    #[test]
    fn test_mouse_step_uses_recent_window() {
        let mut telemetry = Telemetry::new();
        // Large early steps, then 20 samples barely moving.
        for i in 0..20u64 {
            telemetry.record_mouse_move((i * 100) as f64, 0.0, i);
        }
        for i in 0..20u64 {
            telemetry.record_mouse_move(5_000.0 + (i % 2) as f64, 0.0, 100 + i);
        }
        let result = score_behavior(
            &telemetry.snapshot(),
            &session(),
            5_000,
            &HostSignals::default(),
        );
        assert!(result.has_signal(Signal::UnnaturalMouseMovement));
    }

    #[test]
    fn test_steady_50ms_typing_is_consistent_but_not_superhuman() {
        let mut telemetry = Telemetry::new();
        human_mouse(&mut telemetry);
        keys_at_spacing(&mut telemetry, 20, 50);
        telemetry.record_focus();
        telemetry.record_focus();

        let result = score_behavior(
            &telemetry.snapshot(),
            &session(),
            3_000,
            &HostSignals::default(),
        );
        assert!(result.has_signal(Signal::ConsistentTyping));
        assert!(!result.has_signal(Signal::SuperhumanTyping));
    }

    #[test]
    fn test_30ms_typing_is_superhuman() {
        let mut telemetry = Telemetry::new();
        human_mouse(&mut telemetry);
        keys_at_spacing(&mut telemetry, 20, 30);
        telemetry.record_focus();
        telemetry.record_focus();

        let result = score_behavior(
            &telemetry.snapshot(),
            &session(),
            3_000,
            &HostSignals::default(),
        );
        assert_eq!(
            result.signals,
            vec![Signal::ConsistentTyping, Signal::SuperhumanTyping]
        );
        assert_eq!(result.score, 35);
        assert!(!result.is_bot);
    }

    #[test]
    fn test_cadence_needs_ten_samples() {
        let mut telemetry = Telemetry::new();
        keys_at_spacing(&mut telemetry, 9, 30);
        assert!(typing_cadence(&telemetry.snapshot().keys).is_none());

        telemetry.record_key_down("k", 10_000 + 30);
        // The new sample's gap is a pause and gets filtered, the 8 others remain.
        assert!(typing_cadence(&telemetry.snapshot().keys).is_some());
    }

    #[test]
    fn test_cadence_needs_six_qualifying_gaps() {
        let mut telemetry = Telemetry::new();
        // 5 quick gaps, the rest are pauses over a second.
        keys_at_spacing(&mut telemetry, 6, 30);
        for i in 0..6u64 {
            telemetry.record_key_down("k", 10_000 + i * 1_500);
        }
        assert!(typing_cadence(&telemetry.snapshot().keys).is_none());

        telemetry.record_key_down("k", 20_000);
        telemetry.record_key_down("k", 20_030);
        let cadence = typing_cadence(&telemetry.snapshot().keys).unwrap();
        assert!((cadence.mean - 30.0).abs() < 1e-9);
        assert!(cadence.variance.abs() < 1e-9);
    }

    #[test]
    fn test_irregular_typing_is_clean() {
        let mut telemetry = Telemetry::new();
        let gaps = [140u64, 95, 210, 180, 120, 330, 90, 260, 150, 175, 205, 110];
        let mut at = 1_000;
        for gap in gaps {
            at += gap;
            telemetry.record_key_down("k", at);
        }
        let cadence = typing_cadence(&telemetry.snapshot().keys).unwrap();
        assert!(cadence.variance > MIN_CADENCE_VARIANCE);
        assert!(cadence.mean > MIN_CADENCE_MEAN_MS);
    }

    #[test]
    fn test_environment_flags() {
        let mut telemetry = Telemetry::new();
        human_mouse(&mut telemetry);
        telemetry.record_focus();
        telemetry.record_focus();

        let result = score_behavior(
            &telemetry.snapshot(),
            &session(),
            9_000,
            &HostSignals::headless(),
        );
        assert_eq!(
            result.signals,
            vec![Signal::AutomatedBrowser, Signal::HeadlessBrowser]
        );
        assert_eq!(result.score, 60);
        assert!(result.is_bot);
    }

    #[test]
    fn test_fill_time_boundary() {
        let snapshot = Telemetry::new().snapshot();
        let env = HostSignals::default();
        let session = FormSession::starting_at(10_000);

        let before = score_behavior(&snapshot, &session, 11_999, &env);
        let at = score_behavior(&snapshot, &session, 12_000, &env);
        assert!(before.has_signal(Signal::FilledTooQuickly));
        assert!(!at.has_signal(Signal::FilledTooQuickly));
    }

    #[test]
    fn test_scoring_is_deterministic() {
        let mut telemetry = Telemetry::new();
        human_mouse(&mut telemetry);
        keys_at_spacing(&mut telemetry, 15, 40);
        telemetry.record_focus();
        let snapshot = telemetry.snapshot();
        let session = session();

        let first = score_behavior(&snapshot, &session, 1_500, &HostSignals::headless());
        let second = score_behavior(&snapshot, &session, 1_500, &HostSignals::headless());
        assert_eq!(first, second);
    }

    #[test]
    fn test_stats_reflect_snapshot() {
        let mut telemetry = Telemetry::new();
        for i in 0..80u64 {
            telemetry.record_mouse_move(i as f64, 0.0, i);
        }
        telemetry.record_key_down("a", 1);
        telemetry.record_focus();

        let result = score_behavior(
            &telemetry.snapshot(),
            &FormSession::starting_at(100),
            2_600,
            &HostSignals::default(),
        );
        assert_eq!(
            result.stats,
            SessionStats {
                mouse_count: 50,
                key_count: 1,
                focus_count: 1,
                elapsed_ms: 2_500,
            }
        );
    }
}
