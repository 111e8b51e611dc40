//! Execution context for operations that read ambient process state.
//!
//! Identifier generation and ticket creation need the working directory,
//! the process id, the clock and the version-control identity. They take an
//! `&dyn Environment` so tests can pin every one of them.

use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::process::Command;
use tracing::debug;

/// Ambient state consumed by the creation path.
pub trait Environment {
    /// Directory the workspace prefix is derived from.
    fn current_dir(&self) -> Option<PathBuf>;

    /// Identifier of the running process.
    fn process_id(&self) -> u32;

    /// Current wall-clock time.
    fn now(&self) -> DateTime<Utc>;

    /// Configured version-control user name, if any.
    fn git_user_name(&self) -> Option<String>;
}

/// The real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemEnvironment;

impl Environment for SystemEnvironment {
    fn current_dir(&self) -> Option<PathBuf> {
        std::env::current_dir().ok()
    }

    fn process_id(&self) -> u32 {
        std::process::id()
    }

    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn git_user_name(&self) -> Option<String> {
        git_user_name()
    }
}

/// Ask git for `user.name`. Absence of git or of the setting yields `None`.
fn git_user_name() -> Option<String> {
    let output = match Command::new("git").args(["config", "user.name"]).output() {
        Ok(output) => output,
        Err(err) => {
            debug!(error = %err, "git unavailable; leaving assignee empty");
            return None;
        }
    };

    if !output.status.success() {
        return None;
    }

    let name = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if name.is_empty() { None } else { Some(name) }
}

/// A deterministic environment for tests.
#[derive(Debug, Clone)]
pub struct FixedEnvironment {
    pub current_dir: Option<PathBuf>,
    pub process_id: u32,
    pub now: DateTime<Utc>,
    pub git_user_name: Option<String>,
}

impl Environment for FixedEnvironment {
    fn current_dir(&self) -> Option<PathBuf> {
        self.current_dir.clone()
    }

    fn process_id(&self) -> u32 {
        self.process_id
    }

    fn now(&self) -> DateTime<Utc> {
        self.now
    }

    fn git_user_name(&self) -> Option<String> {
        self.git_user_name.clone()
    }
}
