//! Remote catalog providers and the fallback refresh policy.
//!
//! # Responsibility
//! - Define the provider contract for fetching catalog snapshots.
//! - Drive the fetch lifecycle actions on [`CatalogState`].
//!
//! # Invariants
//! - A failed fetch never replaces the current databases.
//! - `fetch_all` succeeds only when both collections arrive.

pub mod http;

use crate::model::book::BookRecord;
use crate::model::chapter::ChapterRecord;
use crate::snapshot::{CatalogSnapshot, SnapshotError};
use crate::state::catalog::{CatalogAction, CatalogState};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type TransportResult<T> = Result<T, TransportError>;

/// Fetch failure surfaced to callers as an error flag.
#[derive(Debug)]
pub enum TransportError {
    /// Request could not be sent or the body could not be read.
    Request {
        endpoint: String,
        message: String,
    },
    /// Server answered with a non-success status.
    Status { endpoint: String, status: u16 },
    /// Body arrived but violates the record contract.
    Payload(SnapshotError),
}

impl Display for TransportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Request { endpoint, message } => {
                write!(f, "request to `{endpoint}` failed: {message}")
            }
            Self::Status { endpoint, status } => {
                write!(f, "HTTP error! status: {status} ({endpoint})")
            }
            Self::Payload(err) => write!(f, "{err}"),
        }
    }
}

impl Error for TransportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Payload(err) => Some(err),
            Self::Request { .. } | Self::Status { .. } => None,
        }
    }
}

impl From<SnapshotError> for TransportError {
    fn from(value: SnapshotError) -> Self {
        Self::Payload(value)
    }
}

/// Provider of catalog data from outside the process.
pub trait CatalogSource {
    fn fetch_books(&self) -> TransportResult<Vec<BookRecord>>;
    fn fetch_chapters(&self) -> TransportResult<Vec<ChapterRecord>>;

    /// Fetches both collections; either failure fails the whole call.
    fn fetch_all(&self) -> TransportResult<CatalogSnapshot> {
        let books = self.fetch_books()?;
        let chapters = self.fetch_chapters()?;
        Ok(CatalogSnapshot::new(books, chapters))
    }
}

/// Refreshes the book database, keeping the old one on failure.
pub fn refresh_books(state: CatalogState, source: &dyn CatalogSource) -> CatalogState {
    let state = state.reduce(CatalogAction::FetchStarted);
    let action = match source.fetch_books() {
        Ok(books) => CatalogAction::BookDatabaseLoaded(books),
        Err(err) => CatalogAction::FetchFailed(err.to_string()),
    };
    finish(state, action, "books")
}

/// Refreshes the chapter database, keeping the old one on failure.
pub fn refresh_chapters(state: CatalogState, source: &dyn CatalogSource) -> CatalogState {
    let state = state.reduce(CatalogAction::FetchStarted);
    let action = match source.fetch_chapters() {
        Ok(chapters) => CatalogAction::ChapterDatabaseLoaded(chapters),
        Err(err) => CatalogAction::FetchFailed(err.to_string()),
    };
    finish(state, action, "chapters")
}

/// Refreshes both databases together, keeping both on any failure.
pub fn refresh_all(state: CatalogState, source: &dyn CatalogSource) -> CatalogState {
    let state = state.reduce(CatalogAction::FetchStarted);
    finish(state, fetch_all_action(source), "all")
}

/// Fetches both databases and returns the completing action.
///
/// Touches no state, so callers sharing a `CatalogState` can run it without
/// holding their lock and apply the result with [`complete_refresh_all`].
pub fn fetch_all_action(source: &dyn CatalogSource) -> CatalogAction {
    match source.fetch_all() {
        Ok(snapshot) => CatalogAction::AllDataLoaded(snapshot),
        Err(err) => CatalogAction::FetchFailed(err.to_string()),
    }
}

/// Applies an action from [`fetch_all_action`] to a state already in `FetchStarted`.
pub fn complete_refresh_all(state: CatalogState, action: CatalogAction) -> CatalogState {
    finish(state, action, "all")
}

fn finish(state: CatalogState, action: CatalogAction, scope: &str) -> CatalogState {
    let failed = matches!(action, CatalogAction::FetchFailed(_));
    let next = state.reduce(action);
    if !failed {
        info!(
            "event=catalog_fetch module=remote status=ok scope={} books={} chapters={}",
            scope,
            next.book_database.len(),
            next.chapter_database.len()
        );
    }
    next
}
