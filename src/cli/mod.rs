//! CLI definitions and entry point.

use clap::error::ErrorKind;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

pub mod commands;

/// Minimal ticket tracker (markdown files + JSON lines)
#[derive(Parser, Debug)]
#[command(name = "tk", author, version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Tickets directory (default: .tickets)
    #[arg(long, global = true)]
    pub dir: Option<PathBuf>,

    /// Query engine: external jq or the builtin evaluator
    #[arg(long, global = true, value_parser = ["jq", "builtin"])]
    pub engine: Option<String>,

    /// Path to the jq program
    #[arg(long, global = true)]
    pub jq: Option<String>,

    /// Also write JSON log events to this file
    #[arg(long, global = true, hide = true)]
    pub log_file: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (no log output)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Exit status for a parse outcome clap reports as an error. Help and
/// version displays succeed, including the help shown for a bare `tk`.
#[must_use]
pub const fn parse_exit_code(kind: ErrorKind) -> i32 {
    match kind {
        ErrorKind::DisplayHelp
        | ErrorKind::DisplayVersion
        | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => 0,
        _ => 1,
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a ticket and print its ID
    Create(CreateArgs),

    /// Print tickets as JSON lines, optionally filtered
    Query(QueryArgs),

    /// Print a ticket file (full or partial ID)
    Show {
        /// Ticket ID or unique part of one
        id: String,
    },

    /// List tickets by priority
    #[command(alias = "list")]
    Ls(ListArgs),

    /// List recently closed tickets
    Closed(ClosedArgs),

    /// Show version information
    Version,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args, Debug, Default, Clone)]
pub struct CreateArgs {
    /// Ticket title
    pub title: Option<String>,

    /// Description text
    #[arg(long, short = 'd')]
    pub description: Option<String>,

    /// Design notes
    #[arg(long)]
    pub design: Option<String>,

    /// Acceptance criteria
    #[arg(long)]
    pub acceptance: Option<String>,

    /// Ticket type (bug, feature, task, chore, epic)
    #[arg(long = "type", short = 't')]
    pub type_: Option<String>,

    /// Priority (lower is more urgent)
    #[arg(long, short = 'p', allow_negative_numbers = true, value_parser = parse_priority)]
    pub priority: Option<i64>,

    /// Assignee (default: git user.name)
    #[arg(long, short = 'a')]
    pub assignee: Option<String>,

    /// External reference (e.g. gh-123)
    #[arg(long)]
    pub external_ref: Option<String>,

    /// Parent ticket ID
    #[arg(long)]
    pub parent: Option<String>,
}

fn parse_priority(value: &str) -> Result<i64, String> {
    value
        .trim()
        .parse()
        .map_err(|_| "invalid priority value".to_string())
}

#[derive(Args, Debug, Default, Clone)]
pub struct QueryArgs {
    /// jq expression, applied as select(<expr>)
    pub filter: Option<String>,
}

#[derive(Args, Debug, Default, Clone)]
pub struct ListArgs {
    /// Only tickets with this status
    #[arg(long, short = 's')]
    pub status: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct ClosedArgs {
    /// Maximum tickets to print
    #[arg(long, short = 'n', default_value_t = 20)]
    pub limit: usize,
}

impl Default for ClosedArgs {
    fn default() -> Self {
        Self { limit: 20 }
    }
}

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: ShellType,

    /// Output file (default: stdout)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

/// Supported shells for completion generation.
#[derive(ValueEnum, Debug, Clone, Copy, Eq, PartialEq)]
pub enum ShellType {
    Bash,
    Zsh,
    Fish,
    #[value(name = "powershell")]
    #[value(alias = "pwsh")]
    PowerShell,
    Elvish,
}
