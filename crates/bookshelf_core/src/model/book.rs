//! Book catalog record.
//!
//! # Responsibility
//! - Define the canonical catalog entry loaded from assets or REST.
//! - Apply by-name property edits for the user-creation flow.
//!
//! # Invariants
//! - `book_id` is unique within one catalog and never edited in place.
//! - Unknown properties are rejected instead of being silently added.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier of a catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct BookId(String);

impl BookId {
    /// Wraps an existing identifier, trimming surrounding whitespace.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into().trim().to_string())
    }

    /// Generates a fresh identifier for books created on this device.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for BookId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BookId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl<'de> Deserialize<'de> for BookId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        super::deserialize_key(deserializer).map(Self)
    }
}

/// Catalog entry for one literary work.
///
/// Serialized with the camelCase field names used by the asset files and the
/// backend (`bookId`, `genreList`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookRecord {
    pub book_id: BookId,
    pub title: String,
    pub author: String,
    pub translator: String,
    pub series: String,
    /// Serialized as `type`; compared verbatim by book-type views.
    #[serde(rename = "type")]
    pub kind: String,
    pub genre_list: Vec<String>,
    /// Presentation fields (cover, description, bookNum, ...) kept as-is.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Error for by-name property edits on [`BookRecord`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyError {
    /// Record has no property with this name.
    UnknownProperty(String),
    /// `bookId` is the record identity and cannot be edited.
    IdentityChange,
    /// Value has the wrong JSON shape for the property.
    InvalidValue {
        property: String,
        expected: &'static str,
    },
}

impl Display for PropertyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownProperty(name) => write!(f, "book has no property `{name}`"),
            Self::IdentityChange => write!(f, "bookId cannot be changed"),
            Self::InvalidValue { property, expected } => {
                write!(f, "property `{property}` expects {expected}")
            }
        }
    }
}

impl Error for PropertyError {}

impl BookRecord {
    /// Creates an empty draft with a generated id.
    ///
    /// Used when a reader starts a new creation before filling in metadata.
    pub fn draft(title: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            book_id: BookId::generate(),
            title: title.into(),
            author: String::new(),
            translator: String::new(),
            series: String::new(),
            kind: kind.into(),
            genre_list: Vec::new(),
            extra: Map::new(),
        }
    }

    /// Returns whether `genre` is listed verbatim in `genre_list`.
    pub fn has_genre(&self, genre: &str) -> bool {
        self.genre_list.iter().any(|candidate| candidate == genre)
    }

    /// Returns whether the record exposes a property with this wire name.
    pub fn has_property(&self, name: &str) -> bool {
        matches!(
            name,
            "bookId" | "title" | "author" | "translator" | "series" | "type" | "genreList"
        ) || self.extra.contains_key(name)
    }

    /// Replaces one property addressed by its wire name.
    ///
    /// # Errors
    /// - `IdentityChange` for `bookId`.
    /// - `InvalidValue` when a typed field receives the wrong JSON shape.
    /// - `UnknownProperty` when the name is neither a typed field nor an
    ///   existing extra field.
    pub fn set_property(&mut self, name: &str, value: Value) -> Result<(), PropertyError> {
        let slot = match name {
            "bookId" => return Err(PropertyError::IdentityChange),
            "title" => &mut self.title,
            "author" => &mut self.author,
            "translator" => &mut self.translator,
            "series" => &mut self.series,
            "type" => &mut self.kind,
            "genreList" => {
                self.genre_list = string_list(name, value)?;
                return Ok(());
            }
            other => {
                return match self.extra.get_mut(other) {
                    Some(existing) => {
                        *existing = value;
                        Ok(())
                    }
                    None => Err(PropertyError::UnknownProperty(other.to_string())),
                };
            }
        };

        match value {
            Value::String(text) => {
                *slot = text;
                Ok(())
            }
            _ => Err(PropertyError::InvalidValue {
                property: name.to_string(),
                expected: "a string",
            }),
        }
    }
}

fn string_list(name: &str, value: Value) -> Result<Vec<String>, PropertyError> {
    let invalid = || PropertyError::InvalidValue {
        property: name.to_string(),
        expected: "an array of strings",
    };
    let Value::Array(items) = value else {
        return Err(invalid());
    };
    items
        .into_iter()
        .map(|item| match item {
            Value::String(text) => Ok(text),
            _ => Err(invalid()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{BookId, BookRecord, PropertyError};
    use serde_json::json;

    fn sample() -> BookRecord {
        serde_json::from_value(json!({
            "bookId": 7,
            "title": "Dế Mèn",
            "author": "Tô Hoài",
            "translator": "",
            "series": "",
            "type": "novel",
            "genreList": ["Thiếu nhi"],
            "bookNum": 1
        }))
        .expect("sample book should decode")
    }

    #[test]
    fn numeric_ids_are_read_as_text() {
        assert_eq!(sample().book_id, BookId::new("7"));
    }

    #[test]
    fn extra_fields_survive_round_trip() {
        let value = serde_json::to_value(sample()).unwrap();
        assert_eq!(value["bookNum"], 1);
        assert_eq!(value["type"], "novel");
        assert_eq!(value["bookId"], "7");
    }

    #[test]
    fn blank_ids_are_rejected() {
        let result = serde_json::from_value::<BookRecord>(json!({
            "bookId": "  ",
            "title": "x",
            "author": "",
            "translator": "",
            "series": "",
            "type": "novel",
            "genreList": []
        }));
        assert!(result.is_err());
    }

    #[test]
    fn set_property_updates_typed_and_extra_fields() {
        let mut book = sample();
        book.set_property("series", json!("Truyện dài")).unwrap();
        book.set_property("bookNum", json!(2)).unwrap();
        book.set_property("genreList", json!(["A", "B"])).unwrap();

        assert_eq!(book.series, "Truyện dài");
        assert_eq!(book.extra["bookNum"], 2);
        assert_eq!(book.genre_list, vec!["A".to_string(), "B".to_string()]);
    }

    #[test]
    fn set_property_rejects_unknown_identity_and_bad_shapes() {
        let mut book = sample();
        assert_eq!(
            book.set_property("rating", json!(5)).unwrap_err(),
            PropertyError::UnknownProperty("rating".to_string())
        );
        assert_eq!(
            book.set_property("bookId", json!("9")).unwrap_err(),
            PropertyError::IdentityChange
        );
        assert!(matches!(
            book.set_property("title", json!(3)).unwrap_err(),
            PropertyError::InvalidValue { .. }
        ));
        assert_eq!(book, sample());
    }

    #[test]
    fn draft_generates_distinct_ids() {
        let first = BookRecord::draft("a", "novel");
        let second = BookRecord::draft("a", "novel");
        assert_ne!(first.book_id, second.book_id);
        assert!(first.has_property("type"));
        assert!(!first.has_property("bookNum"));
    }
}
