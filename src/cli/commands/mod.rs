//! Command implementations.

pub mod closed;
pub mod completions;
pub mod create;
pub mod list;
pub mod query;
pub mod show;
pub mod version;

use crate::storage::DecodeFailure;
use std::io::Write;

/// Report per-file failures on stderr without aborting the command.
pub(crate) fn report_failures<W: Write>(failures: &[DecodeFailure], err: &mut W) {
    for failure in failures {
        let _ = writeln!(
            err,
            "Error parsing ticket {}: {}",
            failure.path.display(),
            failure.error
        );
    }
}
