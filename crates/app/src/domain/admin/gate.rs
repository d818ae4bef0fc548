//! Admin gate.
//!
//! A client-side password check that records a flag in a session-scoped store. It only
//! decides what the client shows; the backend does not rely on it.

use std::{
    fmt::{self, Debug, Formatter},
    sync::Arc,
};

use tracing::{info, warn};
use zeroize::Zeroizing;

use crate::{
    domain::admin::GateError,
    identity::{KeyValueStore, MemoryStore},
};

/// Password accepted when none is configured.
pub const DEFAULT_ADMIN_PASSWORD: &str = "GRANTH";

/// Session key holding the admin flag.
pub const ADMIN_SESSION_KEY: &str = "adminAuth";

/// Session-scoped key-value state, dropped with the process.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    entries: Arc<MemoryStore>,
}

impl SessionStore {
    /// Create an empty session.
    pub fn new() -> Self {
        Self::default()
    }

    fn store(&self) -> &dyn KeyValueStore {
        self.entries.as_ref()
    }
}

/// Proof of a live admin session. Only [`AdminGate`] hands these out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdminAccess {
    _private: (),
}

/// Gate in front of the admin area.
pub struct AdminGate {
    password: Zeroizing<String>,
    session: SessionStore,
}

impl AdminGate {
    /// Create a gate checking against `password`.
    pub fn new(password: impl Into<String>, session: SessionStore) -> Self {
        Self {
            password: Zeroizing::new(password.into()),
            session,
        }
    }

    /// Check `attempt` and open an admin session on a match.
    ///
    /// # Errors
    ///
    /// Returns [`GateError::IncorrectPassword`] on a mismatch.
    pub fn login(&self, attempt: &str) -> Result<AdminAccess, GateError> {
        if attempt != self.password.as_str() {
            warn!("admin login rejected");

            return Err(GateError::IncorrectPassword);
        }

        self.session.store().set(ADMIN_SESSION_KEY, "true")?;
        info!("admin session opened");

        Ok(AdminAccess { _private: () })
    }

    /// Access for the current session.
    ///
    /// # Errors
    ///
    /// Returns [`GateError::LoginRequired`] when no admin session is open.
    pub fn require(&self) -> Result<AdminAccess, GateError> {
        if self.is_authenticated()? {
            Ok(AdminAccess { _private: () })
        } else {
            Err(GateError::LoginRequired)
        }
    }

    /// Whether an admin session is open.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub fn is_authenticated(&self) -> Result<bool, GateError> {
        Ok(self.session.store().get(ADMIN_SESSION_KEY)?.as_deref() == Some("true"))
    }

    /// Close the admin session.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub fn logout(&self) -> Result<(), GateError> {
        self.session.store().remove(ADMIN_SESSION_KEY)?;
        info!("admin session closed");

        Ok(())
    }
}

impl Debug for AdminGate {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminGate")
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}
