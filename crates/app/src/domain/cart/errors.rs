//! Cart store errors.

use thiserror::Error;
use vitrine::cart::CartValueError;

use crate::backend::BackendError;

/// Errors raised by [`crate::domain::cart::CartStore`].
#[derive(Debug, Error)]
pub enum CartError {
    /// No backend connection yet.
    #[error("backend not connected")]
    NotConnected,

    /// Quantity below one.
    #[error("invalid quantity")]
    InvalidQuantity(#[from] CartValueError),

    /// The backend call failed.
    #[error("backend error")]
    Backend(#[source] BackendError),
}

impl From<BackendError> for CartError {
    fn from(error: BackendError) -> Self {
        Self::Backend(error)
    }
}
