//! Detection signals and the score result handed to callers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Score at or above which a session is classified as a bot.
pub const BOT_THRESHOLD: u32 = 50;

/// One heuristic that can fire during scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Signal {
    NoMouseMovement,
    UnnaturalMouseMovement,
    ConsistentTyping,
    SuperhumanTyping,
    FilledTooQuickly,
    InsufficientFocus,
    AutomatedBrowser,
    HeadlessBrowser,
    HoneypotFilled,
}

impl Signal {
    /// Points this signal adds to the score.
    pub fn weight(&self) -> u32 {
        match self {
            Signal::NoMouseMovement => 30,
            Signal::UnnaturalMouseMovement => 20,
            Signal::ConsistentTyping => 15,
            Signal::SuperhumanTyping => 20,
            Signal::FilledTooQuickly => 40,
            Signal::InsufficientFocus => 15,
            Signal::AutomatedBrowser => 25,
            Signal::HeadlessBrowser => 35,
            Signal::HoneypotFilled => 100,
        }
    }

    /// Human-readable reason reported for this signal.
    pub fn reason(&self) -> &'static str {
        match self {
            Signal::NoMouseMovement => "No natural mouse movement detected",
            Signal::UnnaturalMouseMovement => "Unnatural mouse movement patterns",
            Signal::ConsistentTyping => "Unnaturally consistent typing pattern",
            Signal::SuperhumanTyping => "Superhuman typing speed detected",
            Signal::FilledTooQuickly => "Form filled too quickly",
            Signal::InsufficientFocus => "Insufficient focus interactions",
            Signal::AutomatedBrowser => "Automated browser detected",
            Signal::HeadlessBrowser => "Headless browser indicators",
            Signal::HoneypotFilled => "Honeypot field filled",
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.reason())
    }
}

/// Live counters at the moment of scoring.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    pub mouse_count: usize,
    pub key_count: usize,
    pub focus_count: u32,
    pub elapsed_ms: u64,
}

/// Outcome of one scoring pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreResult {
    /// Sum of the weights of every fired signal
    pub score: u32,
    /// Reasons in rule order, honeypot last when merged
    pub reasons: Vec<String>,
    /// Fired signals, parallel to `reasons`
    pub signals: Vec<Signal>,
    pub is_bot: bool,
    pub stats: SessionStats,
    pub honeypot_triggered: bool,
}

impl ScoreResult {
    /// Start an empty result for the given stats.
    pub fn new(stats: SessionStats) -> Self {
        Self {
            stats,
            ..Default::default()
        }
    }

    /// Record a fired signal. Scores only ever accumulate.
    pub fn push(&mut self, signal: Signal) {
        self.score += signal.weight();
        self.reasons.push(signal.reason().to_string());
        self.signals.push(signal);
        self.is_bot = self.score >= BOT_THRESHOLD;
    }

    /// Whether `signal` fired.
    pub fn has_signal(&self, signal: Signal) -> bool {
        self.signals.contains(&signal)
    }

    /// Whether `reason` is among the reasons.
    pub fn has_reason(&self, reason: &str) -> bool {
        self.reasons.iter().any(|r| r == reason)
    }

    /// Multi-line rendering for debug displays.
    pub fn summary(&self) -> String {
        let reasons = if self.reasons.is_empty() {
            "  (none)".to_string()
        } else {
            self.reasons
                .iter()
                .map(|r| format!("  - {r}"))
                .collect::<Vec<_>>()
                .join("\n")
        };

        format!(
            "Bot score: {} ({})\n\
             Honeypot triggered: {}\n\
             Mouse samples: {}\n\
             Key samples: {}\n\
             Focus events: {}\n\
             Time on form: {}ms\n\
             Reasons:\n{}",
            self.score,
            if self.is_bot { "bot" } else { "human" },
            self.honeypot_triggered,
            self.stats.mouse_count,
            self.stats.key_count,
            self.stats.focus_count,
            self.stats.elapsed_ms,
            reasons
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_accumulates() {
        let mut result = ScoreResult::default();
        result.push(Signal::NoMouseMovement);
        assert_eq!(result.score, 30);
        assert!(!result.is_bot);

        result.push(Signal::InsufficientFocus);
        assert_eq!(result.score, 45);
        assert!(!result.is_bot);

        result.push(Signal::ConsistentTyping);
        assert_eq!(result.score, 60);
        assert!(result.is_bot);
        assert_eq!(
            result.reasons,
            vec![
                "No natural mouse movement detected",
                "Insufficient focus interactions",
                "Unnaturally consistent typing pattern",
            ]
        );
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let mut result = ScoreResult::default();
        result.push(Signal::NoMouseMovement);
        result.push(Signal::SuperhumanTyping);
        assert_eq!(result.score, BOT_THRESHOLD);
        assert!(result.is_bot);
    }

    #[test]
    fn test_summary_format() {
        let mut result = ScoreResult::default();
        result.push(Signal::FilledTooQuickly);
        let summary = result.summary();
        assert!(summary.contains("Bot score: 40 (human)"));
        assert!(summary.contains("- Form filled too quickly"));

        assert!(ScoreResult::default().summary().contains("(none)"));
    }

    #[test]
    fn test_signal_serde_names() {
        let json = serde_json::to_string(&Signal::HoneypotFilled).unwrap();
        assert_eq!(json, "\"honeypot_filled\"");
    }
}
