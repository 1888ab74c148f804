//! Honeypot trap fields.

pub mod render;
pub mod trap;

pub use render::{escape_html, render_honeypot, render_trigger, TriggerState};
pub use trap::{HoneypotTrap, DEFAULT_HONEYPOT_FIELDS};
