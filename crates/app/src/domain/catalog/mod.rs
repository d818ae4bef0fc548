//! Catalog

pub mod errors;
pub mod store;

pub use errors::CatalogError;
pub use store::{CatalogSnapshot, CatalogStore};
