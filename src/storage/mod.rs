//! Ticket Store: a directory of `<id>.md` files.
//!
//! The store never mutates an existing ticket. `create` writes one new file;
//! everything else reads. Enumeration decodes each file independently and
//! collects per-file failures next to the tickets that loaded.

use crate::error::{Result, TicketError};
use crate::format::{decode_header, encode_ticket, parse_title, typed_ticket};
use crate::model::{Header, Ticket, TicketBody};
use crate::util::resolve_id;
use chrono::{DateTime, Utc};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// File extension of ticket files.
pub const TICKET_EXTENSION: &str = "md";

/// A ticket loaded from disk, with the file facts listings need.
#[derive(Debug, Clone)]
pub struct StoredTicket {
    pub path: PathBuf,
    /// Header exactly as decoded; this is what queries project.
    pub header: Header,
    /// Typed view of `header` used for listings.
    pub ticket: Ticket,
    /// First `# ` heading after the header block, if any.
    pub title: Option<String>,
    pub modified: Option<DateTime<Utc>>,
}

/// A file that could not be turned into a ticket.
#[derive(Debug)]
pub struct DecodeFailure {
    pub path: PathBuf,
    pub error: TicketError,
}

/// Result of reading every ticket file in the store.
#[derive(Debug, Default)]
pub struct Enumeration {
    pub tickets: Vec<StoredTicket>,
    pub failures: Vec<DecodeFailure>,
}

/// Directory-backed ticket storage.
#[derive(Debug, Clone)]
pub struct TicketStore {
    dir: PathBuf,
}

impl TicketStore {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file holding ticket `id`.
    #[must_use]
    pub fn ticket_path(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{id}.{TICKET_EXTENSION}"))
    }

    /// Encode and write a new ticket, creating the directory when absent.
    ///
    /// No uniqueness check is made: an existing file with the same ID is
    /// overwritten after a warning.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the directory cannot be created or the file
    /// cannot be written.
    pub fn create(&self, ticket: &Ticket, body: &TicketBody) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;

        let path = self.ticket_path(&ticket.id);
        if path.exists() {
            warn!(id = %ticket.id, path = %path.display(), "Ticket file already exists; overwriting");
        }

        fs::write(&path, encode_ticket(ticket, body))?;
        info!(id = %ticket.id, path = %path.display(), "Created ticket");
        Ok(path)
    }

    /// Ticket files sorted by file name. A missing directory yields none.
    ///
    /// Only regular `*.md` files count; dot-files are ignored.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the directory exists but cannot be read.
    pub fn ticket_files(&self) -> Result<Vec<PathBuf>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(dir = %self.dir.display(), "Tickets directory does not exist");
                return Ok(Vec::new());
            }
            Err(err) => return Err(err.into()),
        };

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let path = entry.path();
            if is_ticket_file(&path) {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    /// IDs (file stems) of every ticket file, sorted.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the directory cannot be read.
    pub fn ids(&self) -> Result<Vec<String>> {
        Ok(self
            .ticket_files()?
            .iter()
            .filter_map(|path| path.file_stem())
            .map(|stem| stem.to_string_lossy().into_owned())
            .collect())
    }

    /// Resolve a full or partial ID to an existing ticket ID.
    ///
    /// # Errors
    ///
    /// Returns `TicketNotFound` or `AmbiguousId` when resolution fails.
    pub fn resolve(&self, input: &str) -> Result<String> {
        if self.ticket_path(input.trim()).is_file() {
            return Ok(input.trim().to_string());
        }
        resolve_id(input, &self.ids()?)
    }

    /// Raw file text of ticket `id`.
    ///
    /// # Errors
    ///
    /// Returns `TicketNotFound` if the file does not exist.
    pub fn read_text(&self, id: &str) -> Result<String> {
        let path = self.ticket_path(id);
        fs::read_to_string(&path).map_err(|err| {
            if err.kind() == ErrorKind::NotFound {
                TicketError::TicketNotFound { id: id.to_string() }
            } else {
                err.into()
            }
        })
    }

    /// Read and decode one ticket file.
    ///
    /// # Errors
    ///
    /// Returns an I/O error or the decoder's failure for this file.
    pub fn load(&self, path: &Path) -> Result<StoredTicket> {
        let text = fs::read_to_string(path)?;
        let header = decode_header(path, &text)?;
        let ticket = typed_ticket(path, header.clone());
        let modified = fs::metadata(path)
            .and_then(|meta| meta.modified())
            .ok()
            .map(DateTime::<Utc>::from);

        Ok(StoredTicket {
            path: path.to_path_buf(),
            header,
            ticket,
            title: parse_title(&text),
            modified,
        })
    }

    /// Decode every ticket file, in file-name order.
    ///
    /// A file that fails to read or decode is recorded in
    /// [`Enumeration::failures`]; the rest still load.
    ///
    /// # Errors
    ///
    /// Returns an I/O error only if the directory listing itself fails.
    pub fn enumerate(&self) -> Result<Enumeration> {
        let mut enumeration = Enumeration::default();
        for path in self.ticket_files()? {
            match self.load(&path) {
                Ok(stored) => enumeration.tickets.push(stored),
                Err(error) => {
                    debug!(path = %path.display(), error = %error, "Skipping ticket file");
                    enumeration.failures.push(DecodeFailure { path, error });
                }
            }
        }
        debug!(
            loaded = enumeration.tickets.len(),
            failed = enumeration.failures.len(),
            "Enumerated tickets"
        );
        Ok(enumeration)
    }

    /// Ticket files ordered by modification time, newest first, capped at
    /// `max_files`.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the directory cannot be read.
    pub fn recent_files(&self, max_files: usize) -> Result<Vec<PathBuf>> {
        let mut files: Vec<(PathBuf, Option<DateTime<Utc>>)> = self
            .ticket_files()?
            .into_iter()
            .map(|path| {
                let modified = fs::metadata(&path)
                    .and_then(|meta| meta.modified())
                    .ok()
                    .map(DateTime::<Utc>::from);
                (path, modified)
            })
            .collect();

        // Newest first; ties keep file-name order.
        files.sort_by(|a, b| b.1.cmp(&a.1));
        files.truncate(max_files);
        Ok(files.into_iter().map(|(path, _)| path).collect())
    }
}

fn is_ticket_file(path: &Path) -> bool {
    let hidden = path
        .file_name()
        .is_some_and(|name| name.to_string_lossy().starts_with('.'));
    let is_md = path
        .extension()
        .is_some_and(|ext| ext == TICKET_EXTENSION);
    is_md && !hidden
}
