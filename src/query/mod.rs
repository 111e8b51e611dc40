//! Query Projector: tickets to JSON lines, optionally filtered.
//!
//! Each ticket becomes one compact JSON object holding exactly the keys of
//! its header block (keys sorted, values as decoded). Without a filter
//! expression the lines are written as-is; with one, they are handed to a
//! [`FilterEngine`] and its output is written verbatim.

pub mod builtin;
pub mod filter;
pub mod jq;

use crate::config::{QueryEngine, Settings};
use crate::error::Result;
use crate::storage::{DecodeFailure, StoredTicket};
use std::io::Write;
use tracing::debug;

pub use builtin::BuiltinFilter;
pub use filter::{FilterEngine, select_program};
pub use jq::JqFilter;

/// JSON lines for the tickets that serialized, plus the ones that did not.
#[derive(Debug, Default)]
pub struct Projection {
    pub lines: Vec<String>,
    pub failures: Vec<DecodeFailure>,
}

impl Projection {
    /// Lines joined with newlines, newline-terminated when non-empty.
    #[must_use]
    pub fn to_text(&self) -> String {
        if self.lines.is_empty() {
            return String::new();
        }
        let mut text = self.lines.join("\n");
        text.push('\n');
        text
    }
}

/// Serialize each ticket's decoded header to one compact JSON line, in
/// input order.
#[must_use]
pub fn project(tickets: &[StoredTicket]) -> Projection {
    let mut projection = Projection::default();
    for stored in tickets {
        match serde_json::to_value(&stored.header) {
            Ok(value) => projection.lines.push(value.to_string()),
            Err(err) => {
                debug!(path = %stored.path.display(), error = %err, "Ticket not serializable");
                projection.failures.push(DecodeFailure {
                    path: stored.path.clone(),
                    error: err.into(),
                });
            }
        }
    }
    projection
}

/// Write the projection to `out`, filtered through `engine` when an
/// expression is given. An empty expression means no filter.
///
/// # Errors
///
/// Returns the engine's error when filtering fails, or an I/O error when
/// writing fails.
pub fn run_query<W: Write>(
    projection: &Projection,
    expression: Option<&str>,
    engine: &dyn FilterEngine,
    out: &mut W,
) -> Result<()> {
    if projection.lines.is_empty() {
        debug!("No tickets to query");
        return Ok(());
    }
    let input = projection.to_text();

    let output = match expression.filter(|expr| !expr.trim().is_empty()) {
        None => input,
        Some(expr) => {
            debug!(engine = engine.name(), expression = expr, "Filtering tickets");
            engine.filter(expr, &input)?
        }
    };

    if !output.is_empty() {
        out.write_all(output.as_bytes())?;
        out.flush()?;
    }
    Ok(())
}

/// Build the filter engine selected by configuration.
#[must_use]
pub fn engine_for(settings: &Settings) -> Box<dyn FilterEngine> {
    match settings.query_engine {
        QueryEngine::Jq => Box::new(JqFilter::new(settings.jq_path.clone())),
        QueryEngine::Builtin => Box::new(BuiltinFilter::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TicketError;
    use crate::format::{decode_header, encode_ticket, typed_ticket};
    use crate::model::{IssueType, Priority, Ticket, TicketBody};
    use crate::query::jq::JqFilter;
    use std::path::PathBuf;

    fn from_text(id: &str, text: &str) -> StoredTicket {
        let path = PathBuf::from(format!(".tickets/{id}.md"));
        let header = decode_header(&path, text).unwrap();
        StoredTicket {
            ticket: typed_ticket(&path, header.clone()),
            path,
            header,
            title: None,
            modified: None,
        }
    }

    fn stored(id: &str, priority: Priority) -> StoredTicket {
        let mut ticket = Ticket::new(id, "2026-01-01T00:00:00Z", IssueType::Bug, priority);
        ticket.assignee = Some("Jane".to_string());
        from_text(id, &encode_ticket(&ticket, &TicketBody::titled(id)))
    }

    #[test]
    fn test_project_sorted_keys_and_types() {
        let projection = project(&[stored("a-0001", Priority::Level(0))]);
        assert_eq!(
            projection.lines,
            vec![
                r#"{"assignee":"Jane","created":"2026-01-01T00:00:00Z","deps":[],"id":"a-0001","links":[],"priority":0,"status":"open","type":"bug"}"#
            ]
        );
    }

    #[test]
    fn test_project_raw_priority_is_string() {
        let projection = project(&[stored("a-0001", Priority::Raw("high".to_string()))]);
        assert!(projection.lines[0].contains(r#""priority":"high""#));
    }

    #[test]
    fn test_project_keeps_extra_keys() {
        let s = from_text("a-0001", "---\nid: a-0001\nestimate: 3d\n---\n");
        let projection = project(&[s]);
        assert_eq!(projection.lines, vec![r#"{"estimate":"3d","id":"a-0001"}"#]);
    }

    #[test]
    fn test_project_only_keys_in_file() {
        let only_id = from_text("x-0001", "---\nid: x-0001\n---\n");
        let sparse = from_text("x-0002", "---\nid: x-0002\nstatus: open\ndeps: x-0001\n---\n");
        let projection = project(&[only_id, sparse]);
        assert_eq!(
            projection.lines,
            vec![
                r#"{"id":"x-0001"}"#,
                r#"{"deps":"x-0001","id":"x-0002","status":"open"}"#,
            ]
        );
    }

    #[test]
    fn test_run_query_empty_skips_filter_engine() {
        let missing = JqFilter::new("definitely-not-a-real-jq-binary");
        let mut out = Vec::new();
        run_query(&Projection::default(), Some(".priority < 2"), &missing, &mut out).unwrap();
        run_query(&Projection::default(), Some(".priority <"), &BuiltinFilter::new(), &mut out)
            .unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_run_query_without_filter() {
        let projection = project(&[
            stored("a-0001", Priority::DEFAULT),
            stored("a-0002", Priority::DEFAULT),
        ]);
        let mut out = Vec::new();
        run_query(&projection, None, &BuiltinFilter::new(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(text.ends_with("}\n"));
    }

    #[test]
    fn test_run_query_empty_is_silent() {
        let mut out = Vec::new();
        run_query(&Projection::default(), None, &BuiltinFilter::new(), &mut out).unwrap();
        assert!(out.is_empty());

        run_query(
            &Projection::default(),
            Some(".id"),
            &BuiltinFilter::new(),
            &mut out,
        )
        .unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_run_query_empty_expression_means_no_filter() {
        let projection = project(&[stored("a-0001", Priority::DEFAULT)]);
        let mut out = Vec::new();
        run_query(&projection, Some("  "), &BuiltinFilter::new(), &mut out).unwrap();
        assert_eq!(out, projection.to_text().into_bytes());
    }

    #[test]
    fn test_run_query_filter_selects_one() {
        let projection = project(&[
            stored("a-0001", Priority::Level(0)),
            stored("a-0002", Priority::Level(3)),
        ]);
        let mut out = Vec::new();
        run_query(
            &projection,
            Some(".priority == 3"),
            &BuiltinFilter::new(),
            &mut out,
        )
        .unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, format!("{}\n", projection.lines[1]));
    }

    #[test]
    fn test_run_query_filter_error_writes_nothing() {
        let projection = project(&[stored("a-0001", Priority::DEFAULT)]);
        let mut out = Vec::new();
        let err = run_query(&projection, Some(".id.x"), &BuiltinFilter::new(), &mut out)
            .unwrap_err();
        assert!(matches!(err, TicketError::FilterFailed { .. }));
        assert!(out.is_empty());
    }
}
