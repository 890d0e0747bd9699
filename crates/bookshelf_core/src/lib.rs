//! Core domain logic for the Bookshelf reading app.
//! This crate is the single source of truth for catalog and notification rules.

pub mod config;
pub mod logging;
pub mod model;
pub mod notify;
pub mod remote;
pub mod search;
pub mod snapshot;
pub mod state;

pub use config::RemoteConfig;
pub use logging::{init_logging, logging_status, LogLevel, LoggingError};
pub use model::book::{BookId, BookRecord, PropertyError};
pub use model::chapter::{ChapterId, ChapterRecord};
pub use model::notification::{DisplayNotification, NotificationEvent, NotificationGroup};
pub use notify::aggregate::{
    aggregate, format_events, group_notifications, parse_timestamp, TimestampError,
};
pub use remote::http::HttpCatalogSource;
pub use remote::{
    complete_refresh_all, fetch_all_action, refresh_all, refresh_books, refresh_chapters,
    CatalogSource, TransportError, TransportResult,
};
pub use search::catalog::{search, search_by_label, SearchKind};
pub use snapshot::{CatalogSnapshot, SnapshotError, SnapshotResult};
pub use state::catalog::{CatalogAction, CatalogState, PropertyChange};
pub use state::notification::{NotificationAction, NotificationState};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
