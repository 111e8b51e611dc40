//! Closed command implementation.

use crate::cli::ClosedArgs;
use crate::cli::commands::list::list_line;
use crate::config::Settings;
use crate::error::Result;
use crate::storage::TicketStore;
use std::io::Write;
use tracing::debug;

/// At most this many of the most recently modified files are inspected.
pub const MAX_SCANNED_FILES: usize = 100;

/// Print recently closed tickets, newest modification first.
///
/// # Errors
///
/// Returns an error if the tickets directory cannot be listed or output
/// cannot be written.
pub fn execute<W: Write>(args: &ClosedArgs, settings: &Settings, out: &mut W) -> Result<()> {
    let store = TicketStore::new(&settings.tickets_dir);
    let mut printed = 0;

    for path in store.recent_files(MAX_SCANNED_FILES)? {
        if printed >= args.limit {
            break;
        }
        let stored = match store.load(&path) {
            Ok(stored) => stored,
            Err(error) => {
                debug!(path = %path.display(), error = %error, "Skipping ticket file");
                continue;
            }
        };
        if stored.ticket.status.is_closed() {
            writeln!(out, "{}", list_line(&stored))?;
            printed += 1;
        }
    }

    Ok(())
}
