//! `ticket_rust` - a file-backed ticket tracker.
//!
//! Each ticket is a markdown file `<id>.md` with a `---` delimited header
//! block. The crate provides:
//! - [`util::id`] - short workspace-scoped identifiers
//! - [`format`] - the on-disk encoder and decoder
//! - [`storage`] - the ticket directory
//! - [`query`] - JSON lines projection with pluggable filtering

#![forbid(unsafe_code)]

pub mod cli;
pub mod config;
pub mod error;
pub mod format;
pub mod logging;
pub mod model;
pub mod query;
pub mod storage;
pub mod util;

pub use error::{Result, TicketError};
