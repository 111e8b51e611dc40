//! Filter engine abstraction.

use crate::error::Result;

/// A predicate evaluator applied to newline-delimited JSON.
pub trait FilterEngine {
    /// Short engine name for diagnostics.
    fn name(&self) -> &'static str;

    /// Keep the input lines for which `select(<expression>)` yields a value.
    ///
    /// Output is newline-terminated JSON, one value per line.
    ///
    /// # Errors
    ///
    /// Returns `InvalidFilter`, `FilterFailed` or `FilterUnavailable`
    /// depending on the engine and the failure.
    fn filter(&self, expression: &str, input: &str) -> Result<String>;
}

/// Wrap a user expression as a selection predicate.
#[must_use]
pub fn select_program(expression: &str) -> String {
    format!("select({expression})")
}
