//! Markup for trap fields and the submit trigger.
//!
//! Trap inputs sit off-screen at zero opacity, are hidden from the
//! accessibility tree, are skipped by tab navigation, and carry the hints
//! that password managers and autofill honour.

use serde::{Deserialize, Serialize};

const CONTAINER_STYLE: &str = "position:absolute;left:-9999px;top:-9999px;width:1px;height:1px;\
overflow:hidden;opacity:0;pointer-events:none;";

/// Escape text for use in HTML attribute values and text nodes.
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Render one hidden input per trap field. No fields renders nothing.
pub fn render_honeypot(fields: &[String]) -> String {
    if fields.is_empty() {
        return String::new();
    }

    let inputs: String = fields
        .iter()
        .map(|field| {
            let name = escape_html(field);
            format!(
                "<input type=\"text\" name=\"{name}\" id=\"{name}\" value=\"\" tabindex=\"-1\" \
                 autocomplete=\"off\" aria-hidden=\"true\" data-lpignore=\"true\" \
                 data-1p-ignore=\"true\" data-bwignore=\"true\" data-form-type=\"other\" />"
            )
        })
        .collect();

    format!("<div aria-hidden=\"true\" style=\"{CONTAINER_STYLE}\">{inputs}</div>")
}

/// What the submit trigger should show right now.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerState {
    pub disabled: bool,
    pub label: String,
}

/// Default submit button.
pub fn render_trigger(state: &TriggerState) -> String {
    let disabled = if state.disabled { " disabled" } else { "" };
    format!(
        "<button type=\"submit\"{disabled}>{}</button>",
        escape_html(&state.label)
    )
}
