//! Text formats for `ticket_rust`.
//!
//! - [`encode`] - Record Encoder: ticket fields to the on-disk markdown form
//! - [`decode`] - Record Decoder: on-disk text back to a header mapping
//! - [`text`] - One-line listing format used by `ls` and `closed`

pub mod decode;
pub mod encode;
mod text;

/// Line that opens and closes the header block.
pub const SEPARATOR: &str = "---";

pub use decode::{decode_header, parse_title, typed_ticket};
pub use encode::encode_ticket;
pub use text::format_ticket_line;
