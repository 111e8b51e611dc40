//! Create command implementation.

use crate::cli::CreateArgs;
use crate::config::Settings;
use crate::error::{Result, TicketError};
use crate::model::{IssueType, Priority, Ticket, TicketBody};
use crate::storage::TicketStore;
use crate::util::{Environment, format_timestamp, generate_id};
use std::io::Write;
use std::path::PathBuf;
use tracing::debug;

/// A ticket just written to disk.
#[derive(Debug, Clone)]
pub struct Created {
    pub id: String,
    pub path: PathBuf,
}

/// Execute the create command: write the ticket and print its ID.
///
/// # Errors
///
/// Returns an error if the tickets directory or file cannot be written.
pub fn execute<W: Write>(
    args: &CreateArgs,
    settings: &Settings,
    env: &dyn Environment,
    out: &mut W,
) -> Result<()> {
    let created = create_ticket(args, settings, env)?;
    writeln!(out, "{}", created.id)?;
    Ok(())
}

/// Build the ticket from arguments, settings and the execution context, then
/// store it.
///
/// # Errors
///
/// Returns a validation error if a header value spans lines, or an error if
/// the ticket cannot be written.
pub fn create_ticket(
    args: &CreateArgs,
    settings: &Settings,
    env: &dyn Environment,
) -> Result<Created> {
    let id = generate_id(env);
    let created_at = format_timestamp(env.now());

    let issue_type = match non_empty(args.type_.as_deref()) {
        Some(value) => value.parse::<IssueType>()?,
        None => settings.default_type.clone(),
    };
    let priority = args
        .priority
        .map_or_else(|| settings.default_priority.clone(), Priority::Level);

    let mut ticket = Ticket::new(id, created_at, issue_type, priority);
    ticket.assignee = match &args.assignee {
        Some(assignee) => Some(assignee.clone()),
        None => env.git_user_name(),
    };
    ticket.external_ref.clone_from(&args.external_ref);
    ticket.parent.clone_from(&args.parent);

    let mut body = TicketBody::titled(args.title.clone().unwrap_or_default());
    body.description.clone_from(&args.description);
    body.design.clone_from(&args.design);
    body.acceptance.clone_from(&args.acceptance);

    check_single_line(&ticket)?;

    debug!(id = %ticket.id, title = %body.title, "Creating ticket");
    let store = TicketStore::new(&settings.tickets_dir);
    let path = store.create(&ticket, &body)?;

    Ok(Created {
        id: ticket.id,
        path,
    })
}

/// Each header value must stay on its own line.
fn check_single_line(ticket: &Ticket) -> Result<()> {
    for (key, value) in ticket.header_fields() {
        if value.contains(['\n', '\r']) {
            return Err(TicketError::validation(key, "must not contain line breaks"));
        }
    }
    Ok(())
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
