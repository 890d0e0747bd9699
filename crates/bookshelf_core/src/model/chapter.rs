//! Chapter record belonging to a catalog book.

use super::book::BookId;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt::{Display, Formatter};

/// Stable identifier of a chapter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ChapterId(String);

impl ChapterId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ChapterId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ChapterId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        super::deserialize_key(deserializer).map(Self)
    }
}

/// One chapter of a book.
///
/// `book_id` points at a [`super::book::BookRecord`]; the reference is not
/// checked on load (see `CatalogSnapshot::orphan_chapters`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterRecord {
    pub chapter_id: ChapterId,
    pub book_id: BookId,
    /// Title, body and ordering fields, kept as-is.
    #[serde(flatten)]
    pub content: Map<String, Value>,
}

impl ChapterRecord {
    pub fn belongs_to(&self, book_id: &BookId) -> bool {
        &self.book_id == book_id
    }
}
