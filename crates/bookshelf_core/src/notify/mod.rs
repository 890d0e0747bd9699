//! Notification display pipeline.
//!
//! # Responsibility
//! - Normalize raw event timestamps into the fixed display zone.
//! - Bucket formatted notifications under day labels.
//!
//! # Invariants
//! - One malformed timestamp never fails the batch.
//! - Results do not depend on the host timezone or locale.

pub mod aggregate;
