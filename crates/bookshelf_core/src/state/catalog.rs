//! Book catalog state and transitions.
//!
//! # Responsibility
//! - Hold the working catalog, selections, views and search results.
//! - Apply reader, creator and remote-fetch actions.
//!
//! # Invariants
//! - A failed fetch keeps the last good databases and records the error.
//! - An absent or blank search keyword leaves the state untouched.
//! - An unknown search type clears results but keeps the previous
//!   `search_type` / `search_keyword`.

use crate::model::book::{BookId, BookRecord};
use crate::model::chapter::ChapterRecord;
use crate::search::catalog::{search, SearchKind};
use crate::snapshot::CatalogSnapshot;
use log::{debug, info, warn};
use serde_json::Value;

/// By-name edit of the selected creation.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyChange {
    Single { name: String, value: Value },
    /// Parallel lists, e.g. `["series", "bookNum"]` with two values.
    Many { names: Vec<String>, values: Vec<Value> },
}

impl PropertyChange {
    fn into_pairs(self) -> Vec<(String, Value)> {
        match self {
            Self::Single { name, value } => vec![(name, value)],
            Self::Many { names, values } => {
                if names.len() != values.len() {
                    warn!(
                        "event=creation_update module=state status=degraded reason=length_mismatch names={} values={}",
                        names.len(),
                        values.len()
                    );
                }
                names.into_iter().zip(values).collect()
            }
        }
    }
}

/// Actions accepted by [`CatalogState::reduce`].
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogAction {
    SearchForBooks {
        search_type: String,
        keyword: Option<String>,
    },
    SelectBook(BookRecord),
    SelectChapter {
        current_book: Option<BookRecord>,
        current_chapter: usize,
    },
    ViewBookType(String),
    AddNewBook(BookRecord),
    AddNewChapter(ChapterRecord),
    UpdateChapter(ChapterRecord),
    UpdateSelectedCreation(PropertyChange),
    SetUserCreation(BookId),
    ResetToLocalData,
    FetchStarted,
    BookDatabaseLoaded(Vec<BookRecord>),
    ChapterDatabaseLoaded(Vec<ChapterRecord>),
    AllDataLoaded(CatalogSnapshot),
    FetchFailed(String),
}

/// Catalog slice of application state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogState {
    pub book_database: Vec<BookRecord>,
    pub chapter_database: Vec<ChapterRecord>,
    pub loading: bool,
    /// Last transport error message; databases still hold the last good data.
    pub error: Option<String>,

    pub selected_book: Option<BookRecord>,
    pub chapters_of_selected_book: Vec<ChapterRecord>,

    pub current_book: Option<BookRecord>,
    pub current_chapter: usize,
    pub chapters_of_current_book: Vec<ChapterRecord>,

    pub view_book_type: Option<String>,
    pub view_book_list: Vec<BookRecord>,

    pub search_type: Option<SearchKind>,
    pub search_keyword: Option<String>,
    pub search_result_list: Vec<BookRecord>,

    pub selected_creation_id: Option<BookId>,
    pub selected_creation: Option<BookRecord>,
    pub chapters_of_selected_creation: Vec<ChapterRecord>,

    local: CatalogSnapshot,
}

impl CatalogState {
    /// Creates state whose databases start from the bundled snapshot.
    pub fn new(local: CatalogSnapshot) -> Self {
        Self {
            book_database: local.books.clone(),
            chapter_database: local.chapters.clone(),
            local,
            ..Self::default()
        }
    }

    /// Snapshot restored by [`CatalogAction::ResetToLocalData`].
    pub fn local_snapshot(&self) -> &CatalogSnapshot {
        &self.local
    }

    /// Applies one action and returns the next state.
    pub fn reduce(mut self, action: CatalogAction) -> Self {
        match action {
            CatalogAction::SearchForBooks {
                search_type,
                keyword,
            } => self.search_for_books(&search_type, keyword),
            CatalogAction::SelectBook(book) => {
                self.chapters_of_selected_book = chapters_for(&self.chapter_database, &book.book_id);
                self.selected_book = Some(book);
            }
            CatalogAction::SelectChapter {
                current_book,
                current_chapter,
            } => self.select_chapter(current_book, current_chapter),
            CatalogAction::ViewBookType(raw) => {
                let kind = raw.trim().to_lowercase();
                self.view_book_list = self
                    .book_database
                    .iter()
                    .filter(|book| book.kind == kind)
                    .cloned()
                    .collect();
                self.view_book_type = Some(kind);
            }
            CatalogAction::AddNewBook(book) => {
                if self
                    .book_database
                    .iter()
                    .any(|existing| existing.book_id == book.book_id)
                {
                    warn!(
                        "event=book_add module=state status=skipped reason=duplicate_id book_id={}",
                        book.book_id
                    );
                } else {
                    self.book_database.insert(0, book);
                }
            }
            CatalogAction::AddNewChapter(chapter) => self.chapter_database.insert(0, chapter),
            CatalogAction::UpdateChapter(updated) => {
                match self
                    .chapter_database
                    .iter_mut()
                    .find(|chapter| chapter.chapter_id == updated.chapter_id)
                {
                    Some(slot) => *slot = updated,
                    None => warn!(
                        "event=chapter_update module=state status=skipped reason=not_found chapter_id={}",
                        updated.chapter_id
                    ),
                }
            }
            CatalogAction::UpdateSelectedCreation(change) => self.update_selected_creation(change),
            CatalogAction::SetUserCreation(book_id) => {
                self.selected_creation = self
                    .book_database
                    .iter()
                    .find(|book| book.book_id == book_id)
                    .cloned();
                self.chapters_of_selected_creation = chapters_for(&self.chapter_database, &book_id);
                self.selected_creation_id = Some(book_id);
            }
            CatalogAction::ResetToLocalData => {
                self.book_database = self.local.books.clone();
                self.chapter_database = self.local.chapters.clone();
                self.error = None;
                self.loading = false;
                info!("event=catalog_reset module=state status=ok source=local");
            }
            CatalogAction::FetchStarted => {
                self.loading = true;
                self.error = None;
            }
            CatalogAction::BookDatabaseLoaded(books) => {
                self.loading = false;
                self.book_database = books;
                self.error = None;
            }
            CatalogAction::ChapterDatabaseLoaded(chapters) => {
                self.loading = false;
                self.chapter_database = chapters;
                self.error = None;
            }
            CatalogAction::AllDataLoaded(snapshot) => {
                self.loading = false;
                self.book_database = snapshot.books;
                self.chapter_database = snapshot.chapters;
                self.error = None;
            }
            CatalogAction::FetchFailed(message) => {
                self.loading = false;
                self.error = Some(message);
                warn!(
                    "event=catalog_fetch module=state status=error fallback=last_snapshot books={} chapters={}",
                    self.book_database.len(),
                    self.chapter_database.len()
                );
            }
        }
        self
    }

    fn search_for_books(&mut self, search_type: &str, keyword: Option<String>) {
        let Some(keyword) = keyword
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
        else {
            debug!("event=catalog_search module=state status=skipped reason=absent_keyword");
            return;
        };

        let Some(kind) = SearchKind::parse(search_type) else {
            self.search_result_list.clear();
            warn!("event=catalog_search module=state status=rejected reason=unknown_kind");
            return;
        };

        self.search_result_list = search(&self.book_database, kind, &keyword);
        self.search_type = Some(kind);
        self.search_keyword = Some(keyword);
    }

    fn select_chapter(&mut self, current_book: Option<BookRecord>, current_chapter: usize) {
        let mut book_changed = false;
        if let Some(book) = current_book {
            book_changed = self.current_book.as_ref().map(|current| &current.book_id)
                != Some(&book.book_id);
            self.current_book = Some(book);
        }
        self.current_chapter = current_chapter;

        if book_changed || self.chapters_of_current_book.is_empty() {
            if let Some(book) = &self.current_book {
                self.chapters_of_current_book = chapters_for(&self.chapter_database, &book.book_id);
            }
        }
    }

    fn update_selected_creation(&mut self, change: PropertyChange) {
        let Some(mut creation) = self.selected_creation.take() else {
            warn!("event=creation_update module=state status=skipped reason=no_selection");
            return;
        };

        let mut applied = 0_usize;
        for (name, value) in change.into_pairs() {
            match creation.set_property(&name, value) {
                Ok(()) => applied += 1,
                Err(err) => warn!(
                    "event=creation_update module=state status=skipped book_id={} error={}",
                    creation.book_id, err
                ),
            }
        }

        if applied > 0 {
            if let Some(slot) = self
                .book_database
                .iter_mut()
                .find(|book| book.book_id == creation.book_id)
            {
                *slot = creation.clone();
            }
        }
        self.selected_creation = Some(creation);
    }
}

fn chapters_for(chapters: &[ChapterRecord], book_id: &BookId) -> Vec<ChapterRecord> {
    chapters
        .iter()
        .filter(|chapter| chapter.belongs_to(book_id))
        .cloned()
        .collect()
}
