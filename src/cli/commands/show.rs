//! Show command implementation.

use crate::config::Settings;
use crate::error::Result;
use crate::storage::TicketStore;
use std::io::Write;
use tracing::debug;

/// Print the file of the ticket matching `id` (full or unique partial ID).
///
/// # Errors
///
/// Returns `TicketNotFound` or `AmbiguousId` if resolution fails, or an I/O
/// error.
pub fn execute<W: Write>(id: &str, settings: &Settings, out: &mut W) -> Result<()> {
    let store = TicketStore::new(&settings.tickets_dir);
    let resolved = store.resolve(id)?;
    debug!(input = id, id = %resolved, "Resolved ticket");

    out.write_all(store.read_text(&resolved)?.as_bytes())?;
    Ok(())
}
