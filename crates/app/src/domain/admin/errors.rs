//! Admin errors.

use thiserror::Error;
use vitrine::drafts::DraftError;

use crate::{backend::BackendError, identity::IdentityError};

/// Errors raised by [`crate::domain::admin::AdminGate`].
#[derive(Debug, Error)]
pub enum GateError {
    /// The password does not match.
    #[error("Incorrect password. Please try again.")]
    IncorrectPassword,

    /// No admin session; the caller should be sent to the login step.
    #[error("admin login required")]
    LoginRequired,

    /// The session store failed.
    #[error("session store error")]
    Session(#[from] IdentityError),
}

/// Errors raised by [`crate::domain::admin::CatalogAdmin`].
#[derive(Debug, Error)]
pub enum AdminError {
    /// The form is incomplete or invalid.
    #[error("invalid watch: {0}")]
    Draft(#[from] DraftError),

    /// No backend connection yet.
    #[error("backend not connected")]
    NotConnected,

    /// The backend call failed.
    #[error("backend error")]
    Backend(#[from] BackendError),
}
