//! List command implementation.

use crate::cli::ListArgs;
use crate::cli::commands::report_failures;
use crate::config::Settings;
use crate::error::Result;
use crate::format::format_ticket_line;
use crate::storage::{StoredTicket, TicketStore};
use std::io::Write;

/// Print one line per ticket, most urgent first.
///
/// Order is priority (integers ascending, unparseable values last) then ID.
///
/// # Errors
///
/// Returns an error if the tickets directory cannot be listed or output
/// cannot be written.
pub fn execute<W: Write, E: Write>(
    args: &ListArgs,
    settings: &Settings,
    out: &mut W,
    err: &mut E,
) -> Result<()> {
    let store = TicketStore::new(&settings.tickets_dir);
    let enumeration = store.enumerate()?;
    report_failures(&enumeration.failures, err);

    let mut tickets: Vec<&StoredTicket> = enumeration
        .tickets
        .iter()
        .filter(|stored| {
            args.status
                .as_deref()
                .is_none_or(|status| stored.ticket.status.as_str() == status)
        })
        .collect();
    tickets.sort_by(|a, b| {
        a.ticket
            .priority
            .cmp(&b.ticket.priority)
            .then_with(|| a.ticket.id.cmp(&b.ticket.id))
    });

    for stored in tickets {
        writeln!(out, "{}", list_line(stored))?;
    }
    Ok(())
}

/// Listing line for a stored ticket.
#[must_use]
pub fn list_line(stored: &StoredTicket) -> String {
    format_ticket_line(
        &stored.ticket.id,
        &stored.ticket.status,
        stored.title.as_deref().unwrap_or_default(),
        &stored.ticket.deps,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{IssueType, Priority, Status, Ticket, TicketBody};
    use std::fs;
    use tempfile::TempDir;

    fn settings(temp: &TempDir) -> Settings {
        Settings {
            tickets_dir: temp.path().join(".tickets"),
            ..Settings::default()
        }
    }

    fn add(settings: &Settings, id: &str, priority: i64, status: Status, deps: &[&str]) {
        let mut ticket = Ticket::new(
            id,
            "2026-01-01T00:00:00Z",
            IssueType::Task,
            Priority::Level(priority),
        );
        ticket.status = status;
        ticket.deps = deps.iter().map(|d| (*d).to_string()).collect();
        TicketStore::new(&settings.tickets_dir)
            .create(&ticket, &TicketBody::titled(format!("Title {id}")))
            .unwrap();
    }

    fn run(settings: &Settings, status: Option<&str>) -> Vec<String> {
        let args = ListArgs {
            status: status.map(str::to_string),
        };
        let mut out = Vec::new();
        execute(&args, settings, &mut out, &mut Vec::new()).unwrap();
        String::from_utf8(out)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_sorted_by_priority_then_id() {
        let temp = TempDir::new().unwrap();
        let settings = settings(&temp);
        add(&settings, "t-0003", 1, Status::Open, &[]);
        add(&settings, "t-0001", 2, Status::Open, &["t-0003"]);
        add(&settings, "t-0002", 1, Status::Closed, &[]);

        let lines = run(&settings, None);
        assert_eq!(
            lines,
            vec![
                "t-0002   [closed] - Title t-0002",
                "t-0003   [open] - Title t-0003",
                "t-0001   [open] - Title t-0001 <- [t-0003]",
            ]
        );
    }

    #[test]
    fn test_status_filter() {
        let temp = TempDir::new().unwrap();
        let settings = settings(&temp);
        add(&settings, "t-0001", 2, Status::Open, &[]);
        add(&settings, "t-0002", 2, Status::InProgress, &[]);

        let lines = run(&settings, Some("in_progress"));
        assert_eq!(lines, vec!["t-0002   [in_progress] - Title t-0002"]);
    }

    #[test]
    fn test_raw_priority_sorts_last() {
        let temp = TempDir::new().unwrap();
        let settings = settings(&temp);
        add(&settings, "t-0002", 9, Status::Open, &[]);
        fs::write(
            settings.tickets_dir.join("t-0001.md"),
            "---\nid: t-0001\nstatus: open\ncreated: x\npriority: high\n---\n\n# Raw\n",
        )
        .unwrap();

        let lines = run(&settings, None);
        assert!(lines[0].starts_with("t-0002"));
        assert!(lines[1].starts_with("t-0001"));
    }

    #[test]
    fn test_missing_title_is_blank() {
        let temp = TempDir::new().unwrap();
        let settings = settings(&temp);
        fs::create_dir_all(&settings.tickets_dir).unwrap();
        fs::write(
            settings.tickets_dir.join("t-0001.md"),
            "---\nid: t-0001\nstatus: open\ncreated: x\n---\n",
        )
        .unwrap();
        assert_eq!(run(&settings, None), vec!["t-0001   [open] - "]);
    }
}
