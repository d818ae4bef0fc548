//! Admin

pub mod catalog;
pub mod errors;
pub mod gate;

pub use catalog::CatalogAdmin;
pub use errors::{AdminError, GateError};
pub use gate::{ADMIN_SESSION_KEY, AdminAccess, AdminGate, DEFAULT_ADMIN_PASSWORD, SessionStore};
