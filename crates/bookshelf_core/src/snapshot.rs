//! Catalog and notification snapshot loading.
//!
//! # Responsibility
//! - Decode bundled JSON assets (or REST payloads) into typed records.
//! - Reject malformed input loudly instead of producing partial data.
//!
//! # Invariants
//! - A decoded book collection never contains duplicate `bookId`s.
//! - Chapter foreign keys are reported, not enforced.

use crate::model::book::{BookId, BookRecord};
use crate::model::chapter::ChapterRecord;
use crate::model::notification::NotificationEvent;
use log::{info, warn};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub type SnapshotResult<T> = Result<T, SnapshotError>;

/// Input contract violation while loading a snapshot.
#[derive(Debug)]
pub enum SnapshotError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Payload is not a JSON array of well-formed records.
    Json {
        what: &'static str,
        source: serde_json::Error,
    },
    DuplicateBookId(BookId),
}

impl Display for SnapshotError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read `{}`: {source}", path.display())
            }
            Self::Json { what, source } => write!(f, "invalid {what} payload: {source}"),
            Self::DuplicateBookId(id) => write!(f, "duplicate bookId `{id}`"),
        }
    }
}

impl Error for SnapshotError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
            Self::DuplicateBookId(_) => None,
        }
    }
}

/// Books and chapters loaded together.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogSnapshot {
    pub books: Vec<BookRecord>,
    pub chapters: Vec<ChapterRecord>,
}

impl CatalogSnapshot {
    pub fn new(books: Vec<BookRecord>, chapters: Vec<ChapterRecord>) -> Self {
        Self { books, chapters }
    }

    /// Decodes both collections from JSON text.
    pub fn from_json(books_json: &str, chapters_json: &str) -> SnapshotResult<Self> {
        Ok(Self {
            books: parse_books(books_json)?,
            chapters: parse_chapters(chapters_json)?,
        })
    }

    /// Reads and decodes both collections from asset files.
    ///
    /// # Side effects
    /// - Emits a `snapshot_load` event with record counts.
    pub fn from_files(
        books_path: impl AsRef<Path>,
        chapters_path: impl AsRef<Path>,
    ) -> SnapshotResult<Self> {
        let snapshot = Self::from_json(
            &read_text(books_path.as_ref())?,
            &read_text(chapters_path.as_ref())?,
        )?;

        let orphans = snapshot.orphan_chapters().len();
        if orphans > 0 {
            warn!(
                "event=snapshot_load module=snapshot status=degraded reason=orphan_chapters count={}",
                orphans
            );
        }
        info!(
            "event=snapshot_load module=snapshot status=ok books={} chapters={}",
            snapshot.books.len(),
            snapshot.chapters.len()
        );
        Ok(snapshot)
    }

    /// Checks the unique-`bookId` invariant.
    pub fn validate(&self) -> SnapshotResult<()> {
        ensure_unique_ids(&self.books)
    }

    /// Returns chapters whose `bookId` matches no book in this snapshot.
    pub fn orphan_chapters(&self) -> Vec<&ChapterRecord> {
        let known = self
            .books
            .iter()
            .map(|book| &book.book_id)
            .collect::<HashSet<_>>();
        self.chapters
            .iter()
            .filter(|chapter| !known.contains(&chapter.book_id))
            .collect()
    }
}

/// Decodes a JSON array of books and checks id uniqueness.
pub fn parse_books(json: &str) -> SnapshotResult<Vec<BookRecord>> {
    let books: Vec<BookRecord> =
        serde_json::from_str(json).map_err(|source| SnapshotError::Json {
            what: "book",
            source,
        })?;
    ensure_unique_ids(&books)?;
    Ok(books)
}

/// Decodes a JSON array of chapters.
pub fn parse_chapters(json: &str) -> SnapshotResult<Vec<ChapterRecord>> {
    serde_json::from_str(json).map_err(|source| SnapshotError::Json {
        what: "chapter",
        source,
    })
}

/// Decodes a JSON array of notification events.
pub fn parse_notifications(json: &str) -> SnapshotResult<Vec<NotificationEvent>> {
    serde_json::from_str(json).map_err(|source| SnapshotError::Json {
        what: "notification",
        source,
    })
}

/// Reads and decodes a notification asset file.
pub fn read_notifications(path: impl AsRef<Path>) -> SnapshotResult<Vec<NotificationEvent>> {
    parse_notifications(&read_text(path.as_ref())?)
}

fn read_text(path: &Path) -> SnapshotResult<String> {
    std::fs::read_to_string(path).map_err(|source| SnapshotError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn ensure_unique_ids(books: &[BookRecord]) -> SnapshotResult<()> {
    let mut seen = HashSet::<&BookId>::new();
    for book in books {
        if !seen.insert(&book.book_id) {
            return Err(SnapshotError::DuplicateBookId(book.book_id.clone()));
        }
    }
    Ok(())
}
