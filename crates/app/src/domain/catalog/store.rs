//! Catalog store.

use std::sync::Arc;

use tracing::{debug, warn};
use vitrine::watches::{Watch, WatchId};

use crate::{
    backend::{BackendError, Connection},
    cache::{QueryCache, QueryKey},
    domain::catalog::CatalogError,
};

/// Both catalog lists, fetched together.
#[derive(Debug, Clone)]
pub struct CatalogSnapshot {
    /// Every watch, in backend order.
    pub all: Arc<[Watch]>,

    /// Featured watches, in backend order.
    pub featured: Arc<[Watch]>,
}

/// Cached view of the watch catalog.
///
/// Reads return empty lists until the backend connection is established.
#[derive(Debug, Clone)]
pub struct CatalogStore {
    connection: Connection,
    cache: QueryCache,
}

impl CatalogStore {
    /// Create a store over a shared connection and cache.
    #[must_use]
    pub fn new(connection: Connection, cache: QueryCache) -> Self {
        Self { connection, cache }
    }

    async fn fetch_all(&self) -> Result<Arc<[Watch]>, BackendError> {
        let Some(backend) = self.connection.current() else {
            return Ok(Arc::from(Vec::new()));
        };

        self.cache
            .get_or_fetch(QueryKey::AllWatches, || async move {
                backend.get_all_watches().await.map(Arc::from)
            })
            .await
    }

    async fn fetch_featured(&self) -> Result<Arc<[Watch]>, BackendError> {
        let Some(backend) = self.connection.current() else {
            return Ok(Arc::from(Vec::new()));
        };

        self.cache
            .get_or_fetch(QueryKey::FeaturedWatches, || async move {
                backend.get_featured_watches().await.map(Arc::from)
            })
            .await
    }

    /// Every watch.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails.
    pub async fn get_all_watches(&self) -> Result<Arc<[Watch]>, CatalogError> {
        Ok(self.fetch_all().await?)
    }

    /// Featured watches.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails.
    pub async fn get_featured_watches(&self) -> Result<Arc<[Watch]>, CatalogError> {
        Ok(self.fetch_featured().await?)
    }

    /// Fetch both lists concurrently. The catalog counts as loaded only once both resolve.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::LoadFailed`] if either fetch fails.
    pub async fn load(&self) -> Result<CatalogSnapshot, CatalogError> {
        let (all, featured) = tokio::join!(self.fetch_all(), self.fetch_featured());

        let snapshot = CatalogSnapshot {
            all: all.map_err(CatalogError::LoadFailed)?,
            featured: featured.map_err(CatalogError::LoadFailed)?,
        };

        debug!(
            watches = snapshot.all.len(),
            featured = snapshot.featured.len(),
            "catalog loaded"
        );

        Ok(snapshot)
    }

    /// A single watch for the detail page.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] if the watch does not exist (or nothing is
    /// connected yet), otherwise an error if the backend call fails.
    pub async fn get_watch(&self, id: WatchId) -> Result<Watch, CatalogError> {
        let Some(backend) = self.connection.current() else {
            return Err(CatalogError::NotFound(id));
        };

        let watch: Option<Watch> = self
            .cache
            .get_or_fetch(QueryKey::Watch(id), || async move {
                backend.get_watch(id).await
            })
            .await?;

        watch.ok_or(CatalogError::NotFound(id))
    }

    /// Backend-side search. The listing filters locally and does not use this.
    ///
    /// Only the latest term stays cached; results for earlier terms are dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails.
    pub async fn search_watches(&self, term: &str) -> Result<Arc<[Watch]>, CatalogError> {
        let Some(backend) = self.connection.current() else {
            return Ok(Arc::from(Vec::new()));
        };

        let owned = term.to_string();

        self.cache
            .invalidate_where(|key| matches!(key, QueryKey::Search(other) if other != term));

        Ok(self
            .cache
            .get_or_fetch(QueryKey::Search(term.to_string()), || async move {
                backend.search_watches(owned).await.map(Arc::from)
            })
            .await
            .inspect_err(|error| warn!(term, %error, "search failed"))?)
    }

    /// Drop every cached catalog query.
    pub fn invalidate(&self) {
        self.cache.invalidate_where(QueryKey::is_watch_scoped);
    }
}
