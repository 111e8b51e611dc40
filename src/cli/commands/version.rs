//! Version command implementation.

use crate::error::Result;
use std::io::Write;

/// Version line printed by `tk version`.
#[must_use]
pub fn version_line() -> String {
    let build = if cfg!(debug_assertions) {
        "dev"
    } else {
        "release"
    };
    format!("tk {} ({build})", env!("CARGO_PKG_VERSION"))
}

/// Execute the version command.
///
/// # Errors
///
/// Returns an error if writing to `out` fails.
pub fn execute<W: Write>(out: &mut W) -> Result<()> {
    writeln!(out, "{}", version_line())?;
    Ok(())
}
