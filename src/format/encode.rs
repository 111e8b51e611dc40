//! Record encoder: ticket fields to the canonical markdown text.
//!
//! Layout:
//!
//! ```text
//! ---
//! id: nw-5c46
//! status: open
//! deps: []
//! links: []
//! created: 2026-01-01T00:00:00Z
//! type: task
//! priority: 2
//! assignee: Jane          (only when non-empty)
//! ---
//!
//! # Title
//!
//! Description
//!
//! ## Design
//!
//! Design notes
//!
//! ## Acceptance Criteria
//!
//! Criteria
//! ```

use crate::format::SEPARATOR;
use crate::model::{Ticket, TicketBody};

/// Heading for the design section.
pub const DESIGN_HEADING: &str = "## Design";

/// Heading for the acceptance criteria section.
pub const ACCEPTANCE_HEADING: &str = "## Acceptance Criteria";

/// Encode a ticket header and body into file text.
///
/// Every emitted line is newline-terminated.
#[must_use]
pub fn encode_ticket(ticket: &Ticket, body: &TicketBody) -> String {
    let mut lines: Vec<String> = Vec::new();

    lines.push(SEPARATOR.to_string());
    for (key, value) in ticket.header_fields() {
        lines.push(format!("{key}: {value}"));
    }
    lines.push(SEPARATOR.to_string());

    lines.push(String::new());
    lines.push(format!("# {}", body.title));
    lines.push(String::new());

    if let Some(description) = non_empty(body.description.as_deref()) {
        lines.push(description.to_string());
        lines.push(String::new());
    }

    for (heading, text) in [
        (DESIGN_HEADING, body.design.as_deref()),
        (ACCEPTANCE_HEADING, body.acceptance.as_deref()),
    ] {
        if let Some(text) = non_empty(text) {
            lines.push(heading.to_string());
            lines.push(String::new());
            lines.push(text.to_string());
            lines.push(String::new());
        }
    }

    let mut out = String::new();
    for line in lines {
        out.push_str(&line);
        out.push('\n');
    }
    out
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
