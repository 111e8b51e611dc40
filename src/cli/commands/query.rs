//! Query command implementation.

use crate::cli::QueryArgs;
use crate::cli::commands::report_failures;
use crate::config::Settings;
use crate::error::Result;
use crate::query::{FilterEngine, engine_for, project, run_query};
use crate::storage::TicketStore;
use std::io::Write;

/// Execute the query command with the configured filter engine.
///
/// # Errors
///
/// Returns an error if the tickets directory cannot be listed, the filter
/// fails, or output cannot be written.
pub fn execute<W: Write, E: Write>(
    args: &QueryArgs,
    settings: &Settings,
    out: &mut W,
    err: &mut E,
) -> Result<()> {
    let engine = engine_for(settings);
    execute_with_engine(args, settings, engine.as_ref(), out, err)
}

/// Execute the query command with an explicit filter engine.
///
/// Files that fail to decode or serialize are reported on `err` and left
/// out of the output.
///
/// # Errors
///
/// Returns an error if the tickets directory cannot be listed, the filter
/// fails, or output cannot be written.
pub fn execute_with_engine<W: Write, E: Write>(
    args: &QueryArgs,
    settings: &Settings,
    engine: &dyn FilterEngine,
    out: &mut W,
    err: &mut E,
) -> Result<()> {
    let store = TicketStore::new(&settings.tickets_dir);
    let enumeration = store.enumerate()?;
    report_failures(&enumeration.failures, err);

    let projection = project(&enumeration.tickets);
    report_failures(&projection.failures, err);

    run_query(&projection, args.filter.as_deref(), engine, out)
}
