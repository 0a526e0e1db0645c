//! Catalog store
//!
//! Exposes the `CatalogStore` struct and its methods to interact with the on-disk book
//! table and the cover-image directory through pre-defined queries.
pub mod covers;
pub mod queries;
pub mod types;
