//! Error types and handling for `ticket_rust`.
//!
//! # Design
//!
//! - Uses `thiserror` for derive-based error types
//! - Supports `anyhow` integration for ad-hoc context
//! - Provides recovery hints for user-facing errors
//! - Every error maps to exit code 1

use std::path::PathBuf;
use thiserror::Error;

/// Primary error type for `ticket_rust` operations.
#[derive(Error, Debug)]
pub enum TicketError {
    // === Record Errors ===
    /// Ticket file does not contain an opening and closing separator.
    #[error("invalid header in {}", path.display())]
    InvalidHeader { path: PathBuf },

    /// Ticket with the specified ID was not found.
    #[error("ticket '{id}' not found")]
    TicketNotFound { id: String },

    /// Partial ID matches multiple tickets.
    #[error("ambiguous ID '{partial}' matches multiple tickets: {}", matches.join(", "))]
    AmbiguousId {
        partial: String,
        matches: Vec<String>,
    },

    // === Validation Errors ===
    /// Field validation failed.
    #[error("Validation failed: {field}: {reason}")]
    Validation { field: String, reason: String },

    // === Query Errors ===
    /// The filter program exited unsuccessfully.
    #[error("{stderr}")]
    FilterFailed { stderr: String },

    /// The filter program could not be started.
    #[error("cannot run filter program '{program}': {source}")]
    FilterUnavailable {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The builtin engine could not parse the filter expression.
    #[error("invalid filter '{expression}': {reason}")]
    InvalidFilter { expression: String, reason: String },

    // === Configuration Errors ===
    /// Configuration value error.
    #[error("Configuration error: {0}")]
    Config(String),

    // === I/O Errors ===
    /// File system I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Wrapped anyhow error.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TicketError {
    /// Human-friendly suggestion for fixing this error.
    #[must_use]
    pub const fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::AmbiguousId { .. } => Some("Provide more characters of the ID"),
            Self::TicketNotFound { .. } => Some("Run: tk ls"),
            Self::FilterUnavailable { .. } => {
                Some("Install jq, set jq-path, or use --engine builtin")
            }
            Self::InvalidHeader { .. } => {
                Some("A ticket starts with a '---' header block closed by another '---' line")
            }
            _ => None,
        }
    }

    /// Get the exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        1
    }

    /// Create a validation error for a specific field.
    #[must_use]
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Result type using `TicketError`.
pub type Result<T> = std::result::Result<T, TicketError>;
