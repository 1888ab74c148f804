//! Host-environment automation indicators.
//!
//! The scorer never touches the host directly. It asks an [`Environment`]
//! two questions at scoring time, so tests can answer them without a browser.

use serde::{Deserialize, Serialize};

/// Read-only automation probes of the executing host.
pub trait Environment: Send + Sync {
    /// The context reports itself as automation-controlled (e.g. a webdriver flag).
    fn is_automated_browser(&self) -> bool;

    /// Outer window dimensions are exactly zero on both axes.
    fn has_zero_outer_viewport(&self) -> bool;
}

/// Values reported by the host runtime. Missing values count as "not flagged".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostSignals {
    /// `navigator.webdriver` or equivalent
    pub webdriver: Option<bool>,
    pub outer_width: Option<u32>,
    pub outer_height: Option<u32>,
}

impl HostSignals {
    /// A host that reported nothing suspicious.
    pub fn human() -> Self {
        Self {
            webdriver: Some(false),
            outer_width: Some(1280),
            outer_height: Some(800),
        }
    }

    /// A typical headless automation host.
    pub fn headless() -> Self {
        Self {
            webdriver: Some(true),
            outer_width: Some(0),
            outer_height: Some(0),
        }
    }
}

impl Environment for HostSignals {
    fn is_automated_browser(&self) -> bool {
        self.webdriver == Some(true)
    }

    fn has_zero_outer_viewport(&self) -> bool {
        self.outer_width == Some(0) && self.outer_height == Some(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_values_are_not_flagged() {
        let env = HostSignals::default();
        assert!(!env.is_automated_browser());
        assert!(!env.has_zero_outer_viewport());
    }

    #[test]
    fn test_zero_viewport_needs_both_axes() {
        let env = HostSignals {
            outer_width: Some(0),
            outer_height: Some(600),
            ..Default::default()
        };
        assert!(!env.has_zero_outer_viewport());
        assert!(HostSignals::headless().has_zero_outer_viewport());
    }

    #[test]
    fn test_webdriver_flag() {
        assert!(HostSignals::headless().is_automated_browser());
        assert!(!HostSignals::human().is_automated_browser());
    }
}
