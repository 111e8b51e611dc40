//! Core data types for `ticket_rust`.
//!
//! This module defines the fundamental types used throughout the application:
//! - `Ticket` - The header record of one ticket file
//! - `TicketBody` - Title and free-form sections written under the header
//! - `Status` - Ticket lifecycle states
//! - `IssueType` - Categories of tickets
//! - `Priority` - Urgency, with a degraded form for unparseable values
//! - `Header` / `HeaderValue` - The untyped `key: value` mapping a decoder recovers

use crate::error::TicketError;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Title used when a ticket is created without one.
pub const UNTITLED: &str = "Untitled";

/// Ticket lifecycle status.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    #[default]
    Open,
    InProgress,
    Closed,
    #[serde(untagged)]
    Custom(String),
}

impl Status {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Open => "open",
            Self::InProgress => "in_progress",
            Self::Closed => "closed",
            Self::Custom(value) => value,
        }
    }

    /// Closed, or the legacy `done` spelling.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        match self {
            Self::Closed => true,
            Self::Custom(value) => value == "done",
            _ => false,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Status {
    type Err = TicketError;

    /// Unknown spellings are kept verbatim so a decoded file re-encodes unchanged.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s {
            "open" => Self::Open,
            "in_progress" => Self::InProgress,
            "closed" => Self::Closed,
            other => Self::Custom(other.to_string()),
        })
    }
}

/// Ticket type category.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum IssueType {
    Bug,
    Feature,
    #[default]
    Task,
    Chore,
    Epic,
    #[serde(untagged)]
    Custom(String),
}

impl IssueType {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Bug => "bug",
            Self::Feature => "feature",
            Self::Task => "task",
            Self::Chore => "chore",
            Self::Epic => "epic",
            Self::Custom(value) => value,
        }
    }
}

impl fmt::Display for IssueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for IssueType {
    type Err = TicketError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s {
            "bug" => Self::Bug,
            "feature" => Self::Feature,
            "task" => Self::Task,
            "chore" => Self::Chore,
            "epic" => Self::Epic,
            other => Self::Custom(other.to_string()),
        })
    }
}

/// Ticket priority (lower is more urgent).
///
/// A header value that does not parse as an integer is preserved as `Raw`
/// instead of failing the whole record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Priority {
    Level(i64),
    Raw(String),
}

impl Priority {
    pub const DEFAULT: Self = Self::Level(2);

    /// Parse leniently: integers become `Level`, anything else stays `Raw`.
    #[must_use]
    pub fn parse_lenient(value: &str) -> Self {
        value
            .parse::<i64>()
            .map_or_else(|_| Self::Raw(value.to_string()), Self::Level)
    }

    #[must_use]
    pub const fn level(&self) -> Option<i64> {
        match self {
            Self::Level(level) => Some(*level),
            Self::Raw(_) => None,
        }
    }
}

impl Default for Priority {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Level(level) => write!(f, "{level}"),
            Self::Raw(raw) => write!(f, "{raw}"),
        }
    }
}

impl PartialOrd for Priority {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Integer levels sort ascending; raw values sort after every level.
impl Ord for Priority {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Level(a), Self::Level(b)) => a.cmp(b),
            (Self::Level(_), Self::Raw(_)) => Ordering::Less,
            (Self::Raw(_), Self::Level(_)) => Ordering::Greater,
            (Self::Raw(a), Self::Raw(b)) => a.cmp(b),
        }
    }
}

/// One decoded header value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HeaderValue {
    Integer(i64),
    List(Vec<String>),
    Text(String),
}

impl HeaderValue {
    /// Render the value the way it appears after `key: ` in a ticket file.
    #[must_use]
    pub fn to_header_text(&self) -> String {
        match self {
            Self::Integer(value) => value.to_string(),
            Self::List(items) => format!("[{}]", items.join(", ")),
            Self::Text(value) => value.clone(),
        }
    }

    fn into_list(self) -> Vec<String> {
        match self {
            Self::List(items) => items,
            Self::Text(value) if value.is_empty() => Vec::new(),
            Self::Text(value) => vec![value],
            Self::Integer(value) => vec![value.to_string()],
        }
    }

    fn into_text(self) -> String {
        match self {
            Self::Text(value) => value,
            other => other.to_header_text(),
        }
    }
}

/// The untyped `key: value` mapping recovered from a header block.
pub type Header = BTreeMap<String, HeaderValue>;

/// The header record of one ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    /// Unique ID (e.g., "nw-5c46"), equal to the file stem.
    pub id: String,

    /// Workflow status.
    #[serde(default)]
    pub status: Status,

    /// Tickets this one depends on.
    #[serde(default)]
    pub deps: Vec<String>,

    /// Symmetrically linked tickets.
    #[serde(default)]
    pub links: Vec<String>,

    /// Creation timestamp, `YYYY-MM-DDTHH:MM:SSZ`, kept as written.
    pub created: String,

    /// Ticket type (bug, feature, etc.).
    #[serde(rename = "type", default)]
    pub issue_type: IssueType,

    /// Priority (0 is the most urgent).
    #[serde(default)]
    pub priority: Priority,

    /// Assigned user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,

    /// External tracker reference (e.g., gh-123).
    #[serde(
        rename = "external-ref",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub external_ref: Option<String>,

    /// Parent ticket ID.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,

    /// Header keys outside the known set, preserved as decoded.
    #[serde(flatten)]
    pub extra: BTreeMap<String, HeaderValue>,
}

impl Ticket {
    /// A freshly created ticket: open, no deps or links.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        created: impl Into<String>,
        issue_type: IssueType,
        priority: Priority,
    ) -> Self {
        Self {
            id: id.into(),
            status: Status::Open,
            deps: Vec::new(),
            links: Vec::new(),
            created: created.into(),
            issue_type,
            priority,
            assignee: None,
            external_ref: None,
            parent: None,
            extra: BTreeMap::new(),
        }
    }

    /// Typed view of a decoded header, for listings.
    ///
    /// Never fails: a missing `id` falls back to the file stem, a missing
    /// `status` to `open`, and other absent keys to creation defaults. A
    /// scalar where a list is expected becomes a one-element list.
    #[must_use]
    pub fn from_header(path: &Path, mut header: Header) -> Self {
        let mut take = |key: &str| header.remove(key);

        let id = take("id").map(HeaderValue::into_text).unwrap_or_else(|| {
            path.file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default()
        });
        let status = take("status")
            .and_then(|value| value.into_text().parse().ok())
            .unwrap_or_default();
        let created = take("created").map(HeaderValue::into_text).unwrap_or_default();
        let deps = take("deps").map(HeaderValue::into_list).unwrap_or_default();
        let links = take("links").map(HeaderValue::into_list).unwrap_or_default();
        let issue_type = take("type")
            .and_then(|value| value.into_text().parse().ok())
            .unwrap_or_default();
        let priority = match take("priority") {
            Some(HeaderValue::Integer(level)) => Priority::Level(level),
            Some(other) => Priority::Raw(other.to_header_text()),
            None => Priority::default(),
        };
        let assignee = take("assignee").map(HeaderValue::into_text);
        let external_ref = take("external-ref").map(HeaderValue::into_text);
        let parent = take("parent").map(HeaderValue::into_text);

        Self {
            id,
            status,
            deps,
            links,
            created,
            issue_type,
            priority,
            assignee,
            external_ref,
            parent,
            extra: header,
        }
    }

    /// Header lines in encoder order as `(key, rendered value)` pairs.
    #[must_use]
    pub fn header_fields(&self) -> Vec<(&str, String)> {
        let list = |items: &[String]| HeaderValue::List(items.to_vec()).to_header_text();
        let mut fields = vec![
            ("id", self.id.clone()),
            ("status", self.status.to_string()),
            ("deps", list(&self.deps)),
            ("links", list(&self.links)),
            ("created", self.created.clone()),
            ("type", self.issue_type.to_string()),
            ("priority", self.priority.to_string()),
        ];

        let optional = [
            ("assignee", &self.assignee),
            ("external-ref", &self.external_ref),
            ("parent", &self.parent),
        ];
        for (key, value) in optional {
            if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
                fields.push((key, value.to_string()));
            }
        }

        for (key, value) in &self.extra {
            fields.push((key.as_str(), value.to_header_text()));
        }
        fields
    }
}

/// Markdown content written beneath the header block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TicketBody {
    pub title: String,
    pub description: Option<String>,
    pub design: Option<String>,
    pub acceptance: Option<String>,
}

impl TicketBody {
    /// Body with the given title, falling back to `Untitled` when empty.
    #[must_use]
    pub fn titled(title: impl Into<String>) -> Self {
        let title = title.into();
        Self {
            title: if title.is_empty() {
                UNTITLED.to_string()
            } else {
                title
            },
            ..Self::default()
        }
    }
}
