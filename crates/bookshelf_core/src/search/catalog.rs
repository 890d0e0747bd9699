//! In-memory catalog query engine.
//!
//! # Responsibility
//! - Filter book records by free text, author, translator, genre or series.
//! - Return deduplicated hits in deterministic order.
//!
//! # Invariants
//! - Results never contain two records with the same `book_id`.
//! - Hit order is the concatenation of per-field passes, first occurrence kept.
//! - Blank keywords produce no hits.

use crate::model::book::{BookId, BookRecord};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Label for free-text search across title, series, author and genre.
pub const SEARCH_LABEL_FREE_TEXT: &str = "tìm kiếm";
/// Label for exact author search.
pub const SEARCH_LABEL_AUTHOR: &str = "tác giả";
/// Label for exact translator search.
pub const SEARCH_LABEL_TRANSLATOR: &str = "dịch giả";
/// Label for genre membership search.
pub const SEARCH_LABEL_GENRE: &str = "thể loại";
/// Label for exact series search.
pub const SEARCH_LABEL_SERIES: &str = "series";

/// Query kind selected by the search screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchKind {
    FreeText,
    Author,
    Translator,
    Genre,
    Series,
}

impl SearchKind {
    /// Parses a screen label or an English alias, case-insensitively.
    ///
    /// Returns `None` for unknown kinds.
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            SEARCH_LABEL_FREE_TEXT | "free_text" | "search" => Some(Self::FreeText),
            SEARCH_LABEL_AUTHOR | "author" => Some(Self::Author),
            SEARCH_LABEL_TRANSLATOR | "translator" => Some(Self::Translator),
            SEARCH_LABEL_GENRE | "genre" => Some(Self::Genre),
            SEARCH_LABEL_SERIES => Some(Self::Series),
            _ => None,
        }
    }

    /// Screen label for this kind.
    pub fn label(self) -> &'static str {
        match self {
            Self::FreeText => SEARCH_LABEL_FREE_TEXT,
            Self::Author => SEARCH_LABEL_AUTHOR,
            Self::Translator => SEARCH_LABEL_TRANSLATOR,
            Self::Genre => SEARCH_LABEL_GENRE,
            Self::Series => SEARCH_LABEL_SERIES,
        }
    }

    fn log_name(self) -> &'static str {
        match self {
            Self::FreeText => "free_text",
            Self::Author => "author",
            Self::Translator => "translator",
            Self::Genre => "genre",
            Self::Series => "series",
        }
    }
}

/// Searches `records` and returns deduplicated hits.
///
/// Rules per kind:
/// - `FreeText`: whitespace tokens must all be case-insensitive substrings of
///   the title; then the same over series; then over author; then records
///   whose genre list contains the whole keyword. Passes are concatenated.
/// - `Author` / `Translator` / `Series`: case-insensitive equality after trim.
/// - `Genre`: genre list contains the keyword verbatim.
pub fn search(records: &[BookRecord], kind: SearchKind, keyword: &str) -> Vec<BookRecord> {
    if keyword.trim().is_empty() {
        return Vec::new();
    }

    let hits: Vec<&BookRecord> = match kind {
        SearchKind::FreeText => free_text_hits(records, keyword),
        SearchKind::Author => records
            .iter()
            .filter(|book| equals_folded(&book.author, keyword))
            .collect(),
        SearchKind::Translator => records
            .iter()
            .filter(|book| equals_folded(&book.translator, keyword))
            .collect(),
        SearchKind::Genre => records
            .iter()
            .filter(|book| book.has_genre(keyword))
            .collect(),
        SearchKind::Series => records
            .iter()
            .filter(|book| equals_folded(&book.series, keyword))
            .collect(),
    };

    let results = dedupe_by_id(hits);
    debug!(
        "event=catalog_search module=search status=ok kind={} records={} hits={}",
        kind.log_name(),
        records.len(),
        results.len()
    );
    results
}

/// Searches using a screen label instead of a parsed kind.
///
/// Unknown labels yield an empty result and a warning.
pub fn search_by_label(records: &[BookRecord], label: &str, keyword: &str) -> Vec<BookRecord> {
    match SearchKind::parse(label) {
        Some(kind) => search(records, kind, keyword),
        None => {
            warn!(
                "event=catalog_search module=search status=rejected reason=unknown_kind label_len={}",
                label.chars().count()
            );
            Vec::new()
        }
    }
}

fn free_text_hits<'a>(records: &'a [BookRecord], keyword: &str) -> Vec<&'a BookRecord> {
    let tokens = keyword
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>();

    let fields: [fn(&BookRecord) -> &str; 3] = [
        |book| book.title.as_str(),
        |book| book.series.as_str(),
        |book| book.author.as_str(),
    ];

    let mut hits = Vec::new();
    for field in fields {
        hits.extend(
            records
                .iter()
                .filter(|book| contains_all_tokens(field(book), &tokens)),
        );
    }

    hits.extend(records.iter().filter(|book| book.has_genre(keyword)));
    hits
}

fn contains_all_tokens(field: &str, tokens: &[String]) -> bool {
    let haystack = field.to_lowercase();
    tokens.iter().all(|token| haystack.contains(token.as_str()))
}

fn equals_folded(field: &str, keyword: &str) -> bool {
    field.trim().to_lowercase() == keyword.trim().to_lowercase()
}

fn dedupe_by_id(hits: Vec<&BookRecord>) -> Vec<BookRecord> {
    let mut seen = HashSet::<&BookId>::new();
    hits.into_iter()
        .filter(|&book| seen.insert(&book.book_id))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{contains_all_tokens, equals_folded, SearchKind};

    #[test]
    fn parse_accepts_labels_and_aliases() {
        assert_eq!(SearchKind::parse(" Tác Giả "), Some(SearchKind::Author));
        assert_eq!(SearchKind::parse("TÌM KIẾM"), Some(SearchKind::FreeText));
        assert_eq!(SearchKind::parse("genre"), Some(SearchKind::Genre));
        assert_eq!(SearchKind::parse("Series"), Some(SearchKind::Series));
        assert_eq!(SearchKind::parse("xyz"), None);
    }

    #[test]
    fn label_round_trips_through_parse() {
        for kind in [
            SearchKind::FreeText,
            SearchKind::Author,
            SearchKind::Translator,
            SearchKind::Genre,
            SearchKind::Series,
        ] {
            assert_eq!(SearchKind::parse(kind.label()), Some(kind));
        }
    }

    #[test]
    fn tokens_are_substrings_not_words() {
        let tokens = vec!["foo".to_string(), "bar".to_string()];
        assert!(contains_all_tokens("Foobar", &tokens));
        assert!(contains_all_tokens("Foo Bar Saga", &tokens));
        assert!(!contains_all_tokens("Foo Saga", &tokens));
    }

    #[test]
    fn folded_equality_trims_both_sides() {
        assert!(equals_folded("  Nguyễn Nhật Ánh ", "nguyễn nhật ánh"));
        assert!(!equals_folded("Nguyễn Nhật", "nguyễn nhật ánh"));
    }
}
