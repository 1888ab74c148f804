//! Honeypot latch.
//!
//! Trap fields are invisible and unreachable for people, so any
//! non-whitespace value in one of them comes from an automated filler. The
//! first such value latches the trap and fires the trip callback; later
//! values are ignored until [`HoneypotTrap::reset`].

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

/// Default trap names. They look like plausible optional fields but avoid
/// the names browser autofill keys on (email, phone, address).
pub const DEFAULT_HONEYPOT_FIELDS: [&str; 4] = [
    "hp_contact_info",
    "hp_website_url",
    "hp_fax_number",
    "hp_company_name",
];

type TripCallback = Box<dyn Fn(&str) + Send + Sync>;

pub struct HoneypotTrap {
    fields: Vec<String>,
    triggered: AtomicBool,
    on_trip: Option<TripCallback>,
}

impl HoneypotTrap {
    /// A trap over exactly `fields`. An empty list never trips.
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
            triggered: AtomicBool::new(false),
            on_trip: None,
        }
    }

    /// Trap over [`DEFAULT_HONEYPOT_FIELDS`].
    pub fn with_defaults() -> Self {
        Self::new(DEFAULT_HONEYPOT_FIELDS)
    }

    /// Register the callback fired on the latching value. It receives the
    /// name of the field that tripped the trap.
    pub fn on_trip(mut self, callback: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.on_trip = Some(Box::new(callback));
        self
    }

    /// Trap field names, in configured order.
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Whether `field` is one of the trap fields.
    pub fn is_trap_field(&self, field: &str) -> bool {
        self.fields.iter().any(|f| f == field)
    }

    /// Handle a value change on a trap field.
    ///
    /// Returns `true` only for the call that latched the trap. Values for
    /// names outside this trap are ignored.
    pub fn on_value_change(&self, field: &str, value: &str) -> bool {
        if !self.is_trap_field(field) || value.trim().is_empty() {
            return false;
        }

        let latched = self
            .triggered
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();

        if latched {
            if let Some(ref callback) = self.on_trip {
                callback(field);
            }
        }
        latched
    }

    /// Whether the trap has latched.
    pub fn is_triggered(&self) -> bool {
        self.triggered.load(Ordering::Acquire)
    }

    /// Un-latch so the next non-empty value trips again.
    pub fn reset(&self) {
        self.triggered.store(false, Ordering::Release);
    }
}

impl Default for HoneypotTrap {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl fmt::Debug for HoneypotTrap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HoneypotTrap")
            .field("fields", &self.fields)
            .field("triggered", &self.is_triggered())
            .field("on_trip", &self.on_trip.is_some())
            .finish()
    }
}
