//! Application state containers and their transition functions.
//!
//! # Responsibility
//! - Model each screen-facing state slice as a plain value.
//! - Apply actions through `reduce(self, action) -> Self`.
//!
//! # Invariants
//! - Transitions consume the previous state; versions never alias.
//! - No transition performs I/O.

pub mod catalog;
pub mod notification;
