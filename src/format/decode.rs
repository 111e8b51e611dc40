//! Record decoder: ticket file text back to a header mapping.
//!
//! Only the header block is interpreted. The first line whose trimmed
//! content is `---` opens it, the second closes it; fewer than two such lines
//! is an invalid record.
//!
//! Inside the block every non-blank line is split on its first colon. Lines
//! without a colon are skipped. Values wrapped in `[` `]` become lists (split
//! on commas, trimmed, empty elements dropped). `priority` becomes an integer
//! when it parses as one and stays text otherwise.

use crate::error::{Result, TicketError};
use crate::format::SEPARATOR;
use crate::model::{Header, HeaderValue, Ticket};
use std::path::Path;
use tracing::{trace, warn};

/// Decode the header block of a ticket file.
///
/// # Errors
///
/// Returns `InvalidHeader` (naming `path`) when the text has fewer than two
/// separator lines.
pub fn decode_header(path: &Path, text: &str) -> Result<Header> {
    let (header_lines, _) = split_header(text).ok_or_else(|| TicketError::InvalidHeader {
        path: path.to_path_buf(),
    })?;

    let mut header = Header::new();
    for line in header_lines {
        if line.trim().is_empty() {
            continue;
        }
        let Some((key, value)) = line.split_once(':') else {
            trace!(path = %path.display(), line, "Skipping header line without a colon");
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        header.insert(key.to_string(), parse_value(key, value.trim()));
    }

    Ok(header)
}

/// Typed view of a decoded header. Warns when the `id` disagrees with the
/// file name.
#[must_use]
pub fn typed_ticket(path: &Path, header: Header) -> Ticket {
    let ticket = Ticket::from_header(path, header);

    if let Some(stem) = path.file_stem().map(|s| s.to_string_lossy()) {
        if stem != ticket.id {
            warn!(path = %path.display(), id = %ticket.id, "Ticket id differs from file name");
        }
    }

    ticket
}

/// Extract the title: the first `# ` heading after the header block.
#[must_use]
pub fn parse_title(text: &str) -> Option<String> {
    let (_, body_lines) = split_header(text)?;
    body_lines
        .into_iter()
        .find_map(|line| line.strip_prefix("# "))
        .map(|title| title.trim().to_string())
}

/// Split text into header lines and the lines following the closing separator.
fn split_header(text: &str) -> Option<(Vec<&str>, Vec<&str>)> {
    let lines: Vec<&str> = text.lines().collect();
    let mut separators = lines
        .iter()
        .enumerate()
        .filter(|(_, line)| line.trim() == SEPARATOR)
        .map(|(idx, _)| idx);

    let start = separators.next()?;
    let end = separators.next()?;
    Some((lines[start + 1..end].to_vec(), lines[end + 1..].to_vec()))
}

fn parse_value(key: &str, value: &str) -> HeaderValue {
    if let Some(inner) = value
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
    {
        let items = inner
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect();
        return HeaderValue::List(items);
    }

    if key == "priority" {
        if let Ok(level) = value.parse::<i64>() {
            return HeaderValue::Integer(level);
        }
    }

    HeaderValue::Text(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{IssueType, Priority, Status};

    fn decode_ticket(path: &Path, text: &str) -> Result<Ticket> {
        decode_header(path, text).map(|header| typed_ticket(path, header))
    }

    const SAMPLE: &str = "---
id: nw-5c46
status: open
deps: []
links: [nw-0001, nw-0002]
created: 2026-01-01T00:00:00Z
type: bug
priority: 0
assignee: Jane Doe
---

# Fix bug

Body text with a colon: here.
";

    fn path() -> &'static Path {
        Path::new(".tickets/nw-5c46.md")
    }

    #[test]
    fn test_decode_header_fields() {
        let header = decode_header(path(), SAMPLE).unwrap();
        assert_eq!(
            header.get("id"),
            Some(&HeaderValue::Text("nw-5c46".to_string()))
        );
        assert_eq!(header.get("deps"), Some(&HeaderValue::List(vec![])));
        assert_eq!(
            header.get("links"),
            Some(&HeaderValue::List(vec![
                "nw-0001".to_string(),
                "nw-0002".to_string()
            ]))
        );
        assert_eq!(header.get("priority"), Some(&HeaderValue::Integer(0)));
        assert_eq!(
            header.get("created"),
            Some(&HeaderValue::Text("2026-01-01T00:00:00Z".to_string()))
        );
        assert!(!header.contains_key("Body text with a colon"));
    }

    #[test]
    fn test_decode_single_separator_is_invalid() {
        let text = "---\nid: x\nstatus: open\n";
        let err = decode_header(path(), text).unwrap_err();
        assert!(matches!(err, TicketError::InvalidHeader { .. }));
        assert!(err.to_string().contains("nw-5c46.md"));
    }

    #[test]
    fn test_decode_no_separator_is_invalid() {
        assert!(decode_header(path(), "# Just a title\n").is_err());
        assert!(decode_header(path(), "").is_err());
    }

    #[test]
    fn test_separator_is_trimmed() {
        let text = "  ---  \nid: a\n---\r\n";
        let header = decode_header(path(), text).unwrap();
        assert_eq!(header.len(), 1);
    }

    #[test]
    fn test_array_tolerates_stray_commas_and_spaces() {
        let text = "---\ndeps: [ a ,, b , ]\nlinks: [   ]\n---\n";
        let header = decode_header(path(), text).unwrap();
        assert_eq!(
            header.get("deps"),
            Some(&HeaderValue::List(vec!["a".to_string(), "b".to_string()]))
        );
        assert_eq!(header.get("links"), Some(&HeaderValue::List(vec![])));
    }

    #[test]
    fn test_invalid_priority_is_kept_as_text() {
        let text = "---\npriority: high\n---\n";
        let header = decode_header(path(), text).unwrap();
        assert_eq!(
            header.get("priority"),
            Some(&HeaderValue::Text("high".to_string()))
        );
    }

    #[test]
    fn test_only_priority_is_parsed_as_integer() {
        let text = "---\nestimate: 5\n---\n";
        let header = decode_header(path(), text).unwrap();
        assert_eq!(
            header.get("estimate"),
            Some(&HeaderValue::Text("5".to_string()))
        );
    }

    #[test]
    fn test_line_without_colon_is_skipped() {
        let text = "---\nid: a\nnot a field\n\nstatus: open\n---\n";
        let header = decode_header(path(), text).unwrap();
        assert_eq!(header.len(), 2);
    }

    #[test]
    fn test_value_keeps_later_colons() {
        let text = "---\ncreated: 2026-01-01T00:00:00Z\n---\n";
        let header = decode_header(path(), text).unwrap();
        assert_eq!(
            header.get("created"),
            Some(&HeaderValue::Text("2026-01-01T00:00:00Z".to_string()))
        );
    }

    #[test]
    fn test_header_order_does_not_matter() {
        let text = "---\npriority: 1\ncreated: c\nstatus: closed\nid: z-0000\n---\n";
        let ticket = decode_ticket(Path::new("z-0000.md"), text).unwrap();
        assert_eq!(ticket.id, "z-0000");
        assert_eq!(ticket.status, Status::Closed);
        assert_eq!(ticket.priority, Priority::Level(1));
    }

    #[test]
    fn test_header_without_created_still_decodes() {
        let text = "---\nid: x-0001\nstatus: open\n---\n";
        let header = decode_header(Path::new("x-0001.md"), text).unwrap();
        assert_eq!(header.len(), 2);
        assert!(!header.contains_key("created"));

        let ticket = decode_ticket(Path::new("x-0001.md"), text).unwrap();
        assert_eq!(ticket.id, "x-0001");
        assert_eq!(ticket.created, "");
    }

    #[test]
    fn test_scalar_deps_kept_as_text_in_header() {
        let text = "---\nid: x-0001\ndeps: x-0000\n---\n";
        let header = decode_header(Path::new("x-0001.md"), text).unwrap();
        assert_eq!(
            header.get("deps"),
            Some(&HeaderValue::Text("x-0000".to_string()))
        );
        assert_eq!(decode_ticket(Path::new("x-0001.md"), text).unwrap().deps, vec!["x-0000"]);
    }

    #[test]
    fn test_decode_ticket_typed() {
        let ticket = decode_ticket(path(), SAMPLE).unwrap();
        assert_eq!(ticket.issue_type, IssueType::Bug);
        assert_eq!(ticket.assignee.as_deref(), Some("Jane Doe"));
        assert!(ticket.deps.is_empty());
        assert_eq!(ticket.links.len(), 2);
    }

    #[test]
    fn test_parse_title() {
        assert_eq!(parse_title(SAMPLE).as_deref(), Some("Fix bug"));
        assert_eq!(parse_title("---\nid: a\n---\nno heading\n"), None);
        assert_eq!(parse_title("# Outside header\n"), None);
    }
}
