//! Storefront backend client interface.
//!
//! The backend owns persistence, identifier assignment, cart arithmetic and search. The
//! client only talks to it through [`StorefrontBackend`], reached via a [`Connection`] that
//! may not be established yet.

use std::{
    fmt::{self, Debug, Formatter},
    sync::{Arc, PoisonError, RwLock},
};

use async_trait::async_trait;
use mockall::automock;
use thiserror::Error;
use vitrine::{
    cart::{CartItem, Quantity},
    watches::{Watch, WatchDetails, WatchId},
};

use crate::identity::UserId;

mod http;

pub use http::HttpBackend;

/// Errors that can occur when calling the backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// An HTTP transport or serialization error occurred.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend returned a server error or a body the client cannot read.
    #[error("unexpected response from backend: {0}")]
    UnexpectedResponse(String),

    /// The backend refused the call.
    #[error("backend rejected the request: {0}")]
    Rejected(String),
}

/// Remote storefront operations.
#[automock]
#[async_trait]
pub trait StorefrontBackend: Send + Sync {
    /// Create a watch and return its backend-assigned identifier.
    async fn add_watch(&self, details: WatchDetails) -> Result<WatchId, BackendError>;

    /// Replace every field of an existing watch.
    async fn update_watch(&self, id: WatchId, details: WatchDetails) -> Result<(), BackendError>;

    /// Delete a watch.
    async fn delete_watch(&self, id: WatchId) -> Result<(), BackendError>;

    /// Every watch, in backend order.
    async fn get_all_watches(&self) -> Result<Vec<Watch>, BackendError>;

    /// Featured watches, in backend order.
    async fn get_featured_watches(&self) -> Result<Vec<Watch>, BackendError>;

    /// A single watch, `None` when it does not exist.
    async fn get_watch(&self, id: WatchId) -> Result<Option<Watch>, BackendError>;

    /// Backend-side search.
    async fn search_watches(&self, term: String) -> Result<Vec<Watch>, BackendError>;

    /// Add units of a watch to a user's cart.
    async fn add_to_cart(
        &self,
        user: UserId,
        watch: WatchId,
        quantity: Quantity,
    ) -> Result<(), BackendError>;

    /// Remove a watch from a user's cart.
    async fn remove_from_cart(&self, user: UserId, watch: WatchId) -> Result<(), BackendError>;

    /// Set the quantity of a cart line.
    async fn update_cart_item_quantity(
        &self,
        user: UserId,
        watch: WatchId,
        quantity: Quantity,
    ) -> Result<(), BackendError>;

    /// A user's cart lines.
    async fn get_cart(&self, user: UserId) -> Result<Vec<CartItem>, BackendError>;

    /// A user's cart total, computed by the backend.
    async fn get_cart_total(&self, user: UserId) -> Result<u64, BackendError>;

    /// Empty a user's cart.
    async fn clear_cart(&self, user: UserId) -> Result<(), BackendError>;
}

/// Handle to the backend, which starts out pending and is established later.
#[derive(Clone, Default)]
pub struct Connection {
    backend: Arc<RwLock<Option<Arc<dyn StorefrontBackend>>>>,
}

impl Connection {
    /// A connection with no backend yet.
    pub fn pending() -> Self {
        Self::default()
    }

    /// A connection that is already established.
    pub fn established(backend: Arc<dyn StorefrontBackend>) -> Self {
        let connection = Self::pending();
        connection.establish(backend);

        connection
    }

    /// Attach the backend. Clones of this connection see it too.
    pub fn establish(&self, backend: Arc<dyn StorefrontBackend>) {
        let mut slot = self
            .backend
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        *slot = Some(backend);
    }

    /// The backend, if established.
    pub fn current(&self) -> Option<Arc<dyn StorefrontBackend>> {
        self.backend
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Whether a backend is attached.
    pub fn is_established(&self) -> bool {
        self.current().is_some()
    }
}

impl Debug for Connection {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("established", &self.is_established())
            .finish()
    }
}
