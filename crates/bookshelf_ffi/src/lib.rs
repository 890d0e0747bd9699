//! Flutter-facing bridge over `bookshelf_core`.

pub mod api;
