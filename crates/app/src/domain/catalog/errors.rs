//! Catalog store errors.

use thiserror::Error;
use vitrine::watches::WatchId;

use crate::backend::BackendError;

/// Errors raised by [`crate::domain::catalog::CatalogStore`].
#[derive(Debug, Error)]
pub enum CatalogError {
    /// One of the catalog fetches failed, so the catalog is not loaded.
    #[error("failed to load catalog")]
    LoadFailed(#[source] BackendError),

    /// The watch does not exist.
    #[error("Watch not found: {0}")]
    NotFound(WatchId),

    /// The backend call failed.
    #[error("backend error")]
    Backend(#[from] BackendError),
}
