//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose stable, screen-level functions to Dart via FRB.
//! - Own the process-wide catalog and notification state.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - Every call swaps the stored state for the reduced one; no partial writes.
//! - Network calls never run while the catalog lock is held.

use bookshelf_core::snapshot::parse_notifications;
use bookshelf_core::{
    core_version as core_version_inner, init_logging as init_logging_inner,
    complete_refresh_all, fetch_all_action, ping as ping_inner, BookRecord, CatalogAction,
    CatalogSnapshot, CatalogSource, CatalogState, HttpCatalogSource, NotificationGroup,
    NotificationState, RemoteConfig,
};
use chrono::Utc;
use log::info;
use std::sync::{Mutex, MutexGuard, OnceLock};

static CATALOG_STATE: OnceLock<Mutex<CatalogState>> = OnceLock::new();
static NOTIFICATION_STATE: OnceLock<Mutex<NotificationState>> = OnceLock::new();
static REMOTE_CONFIG: OnceLock<RemoteConfig> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// # FFI contract
/// - `level`: `trace|debug|info|warn|error`, case-insensitive.
/// - `log_dir`: absolute directory for rolling log files.
/// - Returns an empty string on success and the error message otherwise.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Book summary rendered by list screens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookItem {
    pub book_id: String,
    pub title: String,
    pub author: String,
    pub translator: String,
    pub series: String,
    pub kind: String,
    pub genres: Vec<String>,
}

/// Book list envelope for search and type views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookListResponse {
    pub items: Vec<BookItem>,
    /// Human-readable response message for diagnostics.
    pub message: String,
}

/// Generic action envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResponse {
    pub ok: bool,
    /// Book id created or affected by the action, when there is one.
    pub book_id: Option<String>,
    pub message: String,
}

impl ActionResponse {
    fn success(message: impl Into<String>, book_id: Option<String>) -> Self {
        Self {
            ok: true,
            book_id,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            book_id: None,
            message: message.into(),
        }
    }
}

/// One formatted notification row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationItem {
    pub text: String,
    pub time: String,
}

/// Notification section with its day label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationSection {
    pub title: String,
    pub items: Vec<NotificationItem>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationsResponse {
    pub sections: Vec<NotificationSection>,
    /// Empty on success, error text when the payload was rejected.
    pub error: String,
}

/// Replaces catalog state with bundled asset data.
///
/// # FFI contract
/// - Rejects malformed JSON without touching the current state.
#[flutter_rust_bridge::frb(sync)]
pub fn catalog_load_local(books_json: String, chapters_json: String) -> ActionResponse {
    match CatalogSnapshot::from_json(&books_json, &chapters_json) {
        Ok(snapshot) => {
            let books = snapshot.books.len();
            *lock(catalog_cell()) = CatalogState::new(snapshot);
            ActionResponse::success(format!("Loaded {books} book(s)."), None)
        }
        Err(err) => ActionResponse::failure(format!("catalog_load_local failed: {err}")),
    }
}

/// Runs a search and returns the stored result list.
///
/// `search_type` is a screen label such as `tác giả`; unknown labels return
/// no items. A blank keyword returns the previous results unchanged.
#[flutter_rust_bridge::frb(sync)]
pub fn catalog_search(search_type: String, keyword: String) -> BookListResponse {
    with_catalog(
        CatalogAction::SearchForBooks {
            search_type,
            keyword: Some(keyword),
        },
        |state| list_response(&state.search_result_list),
    )
}

/// Lists books of one type (`novel`, `short story`, ...).
#[flutter_rust_bridge::frb(sync)]
pub fn catalog_view_type(book_type: String) -> BookListResponse {
    with_catalog(CatalogAction::ViewBookType(book_type), |state| {
        list_response(&state.view_book_list)
    })
}

/// Creates a draft book at the head of the catalog.
#[flutter_rust_bridge::frb(sync)]
pub fn catalog_create_book(title: String, book_type: String) -> ActionResponse {
    let title = title.trim().to_string();
    if title.is_empty() {
        return ActionResponse::failure("catalog_create_book failed: title must not be blank");
    }
    let draft = BookRecord::draft(title, book_type.trim().to_lowercase());
    let book_id = draft.book_id.to_string();
    with_catalog(CatalogAction::AddNewBook(draft), |_| ());
    ActionResponse::success("Book created.", Some(book_id))
}

/// Pulls books and chapters from the backend.
///
/// # FFI contract
/// - Blocking network call; run off the UI thread.
/// - On failure the previous catalog stays active and `ok=false`.
pub fn catalog_refresh() -> ActionResponse {
    let config = REMOTE_CONFIG.get_or_init(RemoteConfig::from_env).clone();
    let source = match HttpCatalogSource::new(config) {
        Ok(source) => source,
        Err(err) => return ActionResponse::failure(format!("catalog_refresh failed: {err}")),
    };

    refresh_from(&source)
}

fn refresh_from(source: &dyn CatalogSource) -> ActionResponse {
    with_catalog(CatalogAction::FetchStarted, |_| ());
    let action = fetch_all_action(source);

    let mut guard = lock(catalog_cell());
    let next = complete_refresh_all(std::mem::take(&mut *guard), action);
    let response = match &next.error {
        Some(message) => ActionResponse::failure(format!("catalog_refresh failed: {message}")),
        None => ActionResponse::success(
            format!("Fetched {} book(s).", next.book_database.len()),
            None,
        ),
    };
    *guard = next;
    response
}

/// Restores the bundled catalog after a failed refresh.
#[flutter_rust_bridge::frb(sync)]
pub fn catalog_reset_local() -> ActionResponse {
    with_catalog(CatalogAction::ResetToLocalData, |state| {
        ActionResponse::success(
            format!("Restored {} local book(s).", state.book_database.len()),
            None,
        )
    })
}

/// Formats and groups notification events given as a JSON array.
#[flutter_rust_bridge::frb(sync)]
pub fn notifications_load(events_json: String) -> NotificationsResponse {
    let mut guard = lock(notification_cell());
    let next = std::mem::take(&mut *guard).load_json(&events_json, Utc::now());
    let response = NotificationsResponse {
        sections: next
            .grouped_notifications
            .iter()
            .map(to_section)
            .collect(),
        error: next.error.clone().unwrap_or_default(),
    };
    *guard = next;
    response
}

/// Clears the notification lists.
#[flutter_rust_bridge::frb(sync)]
pub fn notifications_clear() {
    let mut guard = lock(notification_cell());
    *guard = std::mem::take(&mut *guard).reduce(bookshelf_core::NotificationAction::Clear);
}

/// Validates a notification payload without storing it.
#[flutter_rust_bridge::frb(sync)]
pub fn notifications_validate(events_json: String) -> String {
    match parse_notifications(&events_json) {
        Ok(events) => {
            info!(
                "event=notifications_validate module=ffi status=ok items={}",
                events.len()
            );
            String::new()
        }
        Err(err) => err.to_string(),
    }
}

fn catalog_cell() -> &'static Mutex<CatalogState> {
    CATALOG_STATE.get_or_init(|| Mutex::new(CatalogState::default()))
}

fn notification_cell() -> &'static Mutex<NotificationState> {
    NOTIFICATION_STATE.get_or_init(|| Mutex::new(NotificationState::default()))
}

fn lock<T>(cell: &Mutex<T>) -> MutexGuard<'_, T> {
    // Poisoning is ignored. A reducer that panics after the state was taken
    // leaves the default state in the slot, never a half-reduced one.
    cell.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Reduces the stored catalog and reads from the result under one lock.
fn with_catalog<R>(action: CatalogAction, read: impl FnOnce(&CatalogState) -> R) -> R {
    let mut guard = lock(catalog_cell());
    *guard = std::mem::take(&mut *guard).reduce(action);
    read(&guard)
}

fn list_response(books: &[BookRecord]) -> BookListResponse {
    let items = books.iter().map(to_book_item).collect::<Vec<_>>();
    let message = if items.is_empty() {
        "No results.".to_string()
    } else {
        format!("Found {} result(s).", items.len())
    };
    BookListResponse { items, message }
}

fn to_book_item(book: &BookRecord) -> BookItem {
    BookItem {
        book_id: book.book_id.to_string(),
        title: book.title.clone(),
        author: book.author.clone(),
        translator: book.translator.clone(),
        series: book.series.clone(),
        kind: book.kind.clone(),
        genres: book.genre_list.clone(),
    }
}

fn to_section(group: &NotificationGroup) -> NotificationSection {
    NotificationSection {
        title: group.title.clone(),
        items: group
            .items
            .iter()
            .map(|item| NotificationItem {
                text: item.text.clone(),
                time: item.time.clone(),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::{
        catalog_cell, catalog_create_book, catalog_load_local, catalog_reset_local,
        catalog_search, catalog_view_type, core_version, init_logging, lock, notifications_clear,
        notifications_load, notifications_validate, ping, refresh_from,
    };
    use bookshelf_core::{
        BookRecord, CatalogSnapshot, CatalogSource, ChapterRecord, TransportError,
        TransportResult,
    };
    use std::cell::Cell;
    use std::sync::Mutex;

    // Exported functions share process-wide state.
    static SERIAL: Mutex<()> = Mutex::new(());

    const BOOKS: &str = r#"[
        {"bookId": "1", "title": "Dế Mèn phiêu lưu ký", "author": "Tô Hoài", "translator": "",
         "series": "", "type": "novel", "genreList": ["Thiếu nhi"]},
        {"bookId": "2", "title": "Vợ chồng A Phủ", "author": "Tô Hoài", "translator": "",
         "series": "", "type": "short story", "genreList": []}
    ]"#;

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_bad_input() {
        assert!(!init_logging("info".to_string(), String::new()).is_empty());
        assert!(!init_logging("verbose".to_string(), "/tmp/logs".to_string()).is_empty());
    }

    #[test]
    fn load_search_and_view_flow() {
        let _serial = SERIAL.lock().unwrap_or_else(|p| p.into_inner());
        let loaded = catalog_load_local(BOOKS.to_string(), "[]".to_string());
        assert!(loaded.ok, "{}", loaded.message);

        let response = catalog_search("Tác giả".to_string(), "tô hoài".to_string());
        assert_eq!(response.items.len(), 2);
        assert_eq!(response.message, "Found 2 result(s).");

        let unknown = catalog_search("xyz".to_string(), "tô hoài".to_string());
        assert!(unknown.items.is_empty());

        let novels = catalog_view_type(" Novel ".to_string());
        assert_eq!(novels.items.len(), 1);
        assert_eq!(novels.items[0].book_id, "1");
    }

    #[test]
    fn malformed_local_data_is_rejected() {
        let _serial = SERIAL.lock().unwrap_or_else(|p| p.into_inner());
        let response = catalog_load_local("{}".to_string(), "[]".to_string());
        assert!(!response.ok);
        assert!(response.message.contains("catalog_load_local failed"));
    }

    #[test]
    fn created_book_is_searchable_until_reset() {
        let _serial = SERIAL.lock().unwrap_or_else(|p| p.into_inner());
        assert!(catalog_load_local(BOOKS.to_string(), "[]".to_string()).ok);

        let created = catalog_create_book("Truyện mới tinh".to_string(), "Novel".to_string());
        assert!(created.ok);
        let created_id = created.book_id.expect("created book id");

        let found = catalog_search("tìm kiếm".to_string(), "mới tinh".to_string());
        assert_eq!(found.items.len(), 1);
        assert_eq!(found.items[0].book_id, created_id);

        let reset = catalog_reset_local();
        assert_eq!(reset.message, "Restored 2 local book(s).");
        assert!(catalog_create_book("  ".to_string(), "novel".to_string()).book_id.is_none());
    }

    #[test]
    fn notifications_are_grouped_or_rejected() {
        let _serial = SERIAL.lock().unwrap_or_else(|p| p.into_inner());
        let response = notifications_load(
            r#"[{"text": "a", "time": "bad"}, {"text": "b", "time": "bad too"}]"#.to_string(),
        );
        assert!(response.error.is_empty());
        assert_eq!(response.sections.len(), 1);
        assert_eq!(response.sections[0].title, "Không xác định");
        assert_eq!(response.sections[0].items[1].time, "--:--");

        let rejected = notifications_load("null".to_string());
        assert!(!rejected.error.is_empty());
        assert_eq!(rejected.sections.len(), 1);

        notifications_clear();
        assert!(notifications_validate("[]".to_string()).is_empty());
        assert!(!notifications_validate("{}".to_string()).is_empty());
    }

    /// Source that records whether the catalog lock was free while fetching.
    struct LockObservingSource {
        books_json: &'static str,
        lock_free_during_fetch: Cell<bool>,
    }

    impl CatalogSource for LockObservingSource {
        fn fetch_books(&self) -> TransportResult<Vec<BookRecord>> {
            self.lock_free_during_fetch
                .set(catalog_cell().try_lock().is_ok());
            Ok(CatalogSnapshot::from_json(self.books_json, "[]")?.books)
        }

        fn fetch_chapters(&self) -> TransportResult<Vec<ChapterRecord>> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn refresh_fetches_without_holding_the_catalog_lock() {
        let _serial = SERIAL.lock().unwrap_or_else(|p| p.into_inner());
        assert!(catalog_load_local("[]".to_string(), "[]".to_string()).ok);

        let source = LockObservingSource {
            books_json: BOOKS,
            lock_free_during_fetch: Cell::new(false),
        };
        let response = refresh_from(&source);

        assert!(response.ok, "{}", response.message);
        assert!(source.lock_free_during_fetch.get());
        assert_eq!(response.message, "Fetched 2 book(s).");
        let found = catalog_search("tác giả".to_string(), "Tô Hoài".to_string());
        assert_eq!(found.items.len(), 2);
    }

    struct FailingSource;

    impl CatalogSource for FailingSource {
        fn fetch_books(&self) -> TransportResult<Vec<BookRecord>> {
            Err(TransportError::Status {
                endpoint: "getBookDatabase".to_string(),
                status: 503,
            })
        }

        fn fetch_chapters(&self) -> TransportResult<Vec<ChapterRecord>> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn failed_refresh_keeps_loaded_catalog() {
        let _serial = SERIAL.lock().unwrap_or_else(|p| p.into_inner());
        assert!(catalog_load_local(BOOKS.to_string(), "[]".to_string()).ok);

        let response = refresh_from(&FailingSource);
        assert!(!response.ok);
        assert!(response.message.contains("503"));
        assert_eq!(catalog_view_type("novel".to_string()).items.len(), 1);
    }

    #[test]
    fn lock_recovers_from_a_poisoned_mutex() {
        let cell = Mutex::new(7);
        let _ = std::panic::catch_unwind(|| {
            let _guard = cell.lock().unwrap();
            panic!("reducer failed");
        });
        assert!(cell.is_poisoned());
        assert_eq!(*lock(&cell), 7);
    }
}
