//! Catalog and notification domain records.
//!
//! # Responsibility
//! - Define the JSON shapes exchanged with bundled assets and the REST backend.
//! - Keep record identity explicit through key newtypes.
//!
//! # Invariants
//! - Record keys are never blank.
//! - Fields the core does not model are preserved verbatim on round-trip.

pub mod book;
pub mod chapter;
pub mod notification;

use serde::{Deserialize, Deserializer};

/// Wire shapes accepted for record keys.
///
/// Asset files mix numeric and string ids, so both are read and compared as
/// text afterwards.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawKey {
    Text(String),
    Integer(i64),
    Float(f64),
}

pub(crate) fn deserialize_key<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let key = match RawKey::deserialize(deserializer)? {
        RawKey::Text(value) => value.trim().to_string(),
        RawKey::Integer(value) => value.to_string(),
        RawKey::Float(value) => value.to_string(),
    };
    if key.is_empty() {
        return Err(serde::de::Error::custom("record key must not be blank"));
    }
    Ok(key)
}
