//! Plain text listing lines.

use crate::model::Status;

/// Format one listing line: `id [status] - title`, with deps appended as
/// ` <- [a, b]` when present.
#[must_use]
pub fn format_ticket_line(id: &str, status: &Status, title: &str, deps: &[String]) -> String {
    let mut line = format!("{id:<8} [{status}] - {title}");
    if !deps.is_empty() {
        line.push_str(" <- [");
        line.push_str(&deps.join(", "));
        line.push(']');
    }
    line
}
