//! External `jq` filter engine.

use crate::error::{Result, TicketError};
use crate::query::filter::{FilterEngine, select_program};
use std::io::{ErrorKind, Write};
use std::process::{Command, Stdio};
use std::thread;
use tracing::debug;

/// Default program name looked up on `PATH`.
pub const DEFAULT_JQ: &str = "jq";

/// Runs `<program> -c select(<expr>)` as a subprocess.
#[derive(Debug, Clone)]
pub struct JqFilter {
    program: String,
}

impl JqFilter {
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for JqFilter {
    fn default() -> Self {
        Self::new(DEFAULT_JQ)
    }
}

impl FilterEngine for JqFilter {
    fn name(&self) -> &'static str {
        "jq"
    }

    fn filter(&self, expression: &str, input: &str) -> Result<String> {
        let program = select_program(expression);
        debug!(jq = %self.program, program = %program, bytes = input.len(), "Running filter");

        let mut child = Command::new(&self.program)
            .arg("-c")
            .arg(&program)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| TicketError::FilterUnavailable {
                program: self.program.clone(),
                source,
            })?;

        let mut stdin = child.stdin.take().ok_or_else(|| {
            TicketError::Other(anyhow::anyhow!("Failed to capture filter stdin"))
        })?;

        // Feed stdin while draining stdout/stderr so neither pipe fills up.
        let (output, written) = thread::scope(|scope| {
            let writer = scope.spawn(move || stdin.write_all(input.as_bytes()));
            let output = child.wait_with_output();
            (output, writer.join())
        });
        let output = output?;

        match written {
            Ok(Ok(())) => {}
            Ok(Err(err)) if err.kind() == ErrorKind::BrokenPipe => {
                debug!("Filter closed its input early");
            }
            Ok(Err(err)) => return Err(err.into()),
            Err(_) => {
                return Err(TicketError::Other(anyhow::anyhow!(
                    "Filter input writer panicked"
                )));
            }
        }

        if !output.status.success() {
            debug!(status = ?output.status.code(), "Filter exited unsuccessfully");
            return Err(TicketError::FilterFailed {
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
