//! `biblio_core`
//!
//! Core library for a single-user personal book-collection manager. This crate owns the
//! persistence and query layer (the SQLite table of books plus the cover-image side store)
//! so that it can be used by any presentation shell without implementing the same logic
//! twice.

pub mod catalog;

pub mod stats;
