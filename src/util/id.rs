//! ID generation and resolution for tickets.
//!
//! Implements the `<prefix>-<hash>` format: the prefix is derived from the
//! workspace directory name, the hash is the first hex characters of a SHA256
//! over the process id and the Unix timestamp.
//!
//! Two `create` calls from the same process within the same second produce
//! the same ID. No existence check is made before writing.

use crate::error::{Result, TicketError};
use crate::util::env::Environment;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Number of hex characters in the hash part of an ID.
pub const HASH_LENGTH: usize = 4;

/// Directory name assumed when the working directory has no usable name.
const FALLBACK_DIR_NAME: &str = "ticket";

/// Number of leading characters used when the name yields no segments.
const FALLBACK_PREFIX_LEN: usize = 3;

/// ID generator bound to one workspace prefix.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    prefix: String,
}

impl IdGenerator {
    /// Create a generator with an explicit prefix.
    #[must_use]
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Create a generator whose prefix is derived from a workspace directory.
    #[must_use]
    pub fn for_workspace(dir: Option<&Path>) -> Self {
        let name = dir
            .and_then(Path::file_name)
            .map(|name| name.to_string_lossy().into_owned())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| FALLBACK_DIR_NAME.to_string());
        Self::with_prefix(workspace_prefix(&name))
    }

    /// Get the configured prefix.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Generate the ID for a given process id and Unix timestamp (seconds).
    #[must_use]
    pub fn generate(&self, process_id: u32, unix_seconds: i64) -> String {
        let seed = generate_id_seed(process_id, unix_seconds);
        format!("{}-{}", self.prefix, compute_id_hash(&seed, HASH_LENGTH))
    }
}

/// Generate an ID from the ambient execution context.
#[must_use]
pub fn generate_id(env: &dyn Environment) -> String {
    let dir = env.current_dir();
    IdGenerator::for_workspace(dir.as_deref()).generate(env.process_id(), env.now().timestamp())
}

/// Derive the ID prefix from a directory name.
///
/// The name is split on `-` and `_`; the first character of every non-empty
/// segment is kept, case preserved. A name made only of separators falls back
/// to its first three characters (or the whole name when shorter).
#[must_use]
pub fn workspace_prefix(dir_name: &str) -> String {
    let initials: String = dir_name
        .split(['-', '_'])
        .filter_map(|segment| segment.chars().next())
        .collect();

    if initials.is_empty() {
        dir_name.chars().take(FALLBACK_PREFIX_LEN).collect()
    } else {
        initials
    }
}

/// Seed string hashed into the ID: process id immediately followed by seconds.
#[must_use]
pub fn generate_id_seed(process_id: u32, unix_seconds: i64) -> String {
    format!("{process_id}{unix_seconds}")
}

/// Hex-encode the SHA256 of `input` and keep the first `length` characters.
#[must_use]
pub fn compute_id_hash(input: &str, length: usize) -> String {
    let digest = Sha256::digest(input.as_bytes());
    let hex = format!("{digest:x}");
    hex.chars().take(length).collect()
}

// ============================================================================
// ID Resolution
// ============================================================================

/// Find IDs containing the given substring.
#[must_use]
pub fn find_matching_ids(all_ids: &[String], pattern: &str) -> Vec<String> {
    all_ids
        .iter()
        .filter(|id| id.contains(pattern))
        .cloned()
        .collect()
}

/// Resolve a full or partial ID against the known IDs.
///
/// An exact match wins; otherwise the input must be a substring of exactly
/// one ID.
///
/// # Errors
///
/// Returns `TicketNotFound` when nothing matches and `AmbiguousId` when more
/// than one ID contains the input.
pub fn resolve_id(input: &str, all_ids: &[String]) -> Result<String> {
    let input = input.trim();
    if input.is_empty() {
        return Err(TicketError::validation("id", "cannot be empty"));
    }

    if all_ids.iter().any(|id| id == input) {
        return Ok(input.to_string());
    }

    let mut matches = find_matching_ids(all_ids, input);
    match matches.len() {
        0 => Err(TicketError::TicketNotFound {
            id: input.to_string(),
        }),
        1 => Ok(matches.remove(0)),
        _ => Err(TicketError::AmbiguousId {
            partial: input.to_string(),
            matches,
        }),
    }
}
