//! Embedded filter engine for a subset of the jq language.
//!
//! Supported: paths (`.`, `.a.b`, `.["key"]`, `.[n]`), literals, the six
//! comparison operators with jq's cross-type ordering, `and`, `or`, `|`,
//! parentheses, and the builtins `not`, `length`, `has`, `contains`,
//! `startswith` and `endswith`.

mod eval;
mod lexer;
mod parser;

use crate::error::{Result, TicketError};
use crate::query::filter::FilterEngine;
use serde_json::Value;
use tracing::trace;

use eval::is_truthy;

/// Evaluates `select(<expr>)` in-process.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinFilter;

impl BuiltinFilter {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

fn compile(expression: &str) -> Result<parser::Expr> {
    lexer::tokenize(expression)
        .and_then(|tokens| parser::parse(&tokens))
        .map_err(|reason| TicketError::InvalidFilter {
            expression: expression.to_string(),
            reason,
        })
}

impl FilterEngine for BuiltinFilter {
    fn name(&self) -> &'static str {
        "builtin"
    }

    fn filter(&self, expression: &str, input: &str) -> Result<String> {
        let expr = compile(expression)?;

        let mut output = String::new();
        for (line_no, line) in input.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let value: Value = serde_json::from_str(line)?;
            let selected = eval::evaluate(&expr, &value).map_err(|message| {
                TicketError::FilterFailed {
                    stderr: format!("jq: error (at <stdin>:{}): {message}\n", line_no + 1),
                }
            })?;
            if is_truthy(&selected) {
                trace!(line = line_no + 1, "Line selected");
                output.push_str(line);
                output.push('\n');
            }
        }
        Ok(output)
    }
}
