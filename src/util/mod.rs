//! Shared utilities for `ticket_rust`.
//!
//! - ID generation (workspace prefix + SHA256 entropy) and partial-ID resolution
//! - Execution context (cwd, pid, clock, git identity)
//! - Timestamp formatting

pub mod env;
pub mod id;
pub mod time;

pub use env::{Environment, FixedEnvironment, SystemEnvironment};
pub use id::{IdGenerator, find_matching_ids, generate_id, resolve_id, workspace_prefix};
pub use time::format_timestamp;
