//! Catalog search entry points.
//!
//! # Responsibility
//! - Expose the in-memory query engine over book records.
//! - Keep query-kind parsing and result shaping inside core.

pub mod catalog;
