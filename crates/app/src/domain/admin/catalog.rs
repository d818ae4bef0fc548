//! Catalog administration.

use std::sync::Arc;

use tracing::{info, warn};
use vitrine::{drafts::WatchDraft, watches::WatchId};

use crate::{
    backend::{Connection, StorefrontBackend},
    domain::{
        admin::{AdminAccess, AdminError},
        catalog::CatalogStore,
    },
};

/// Create, update and delete watches. Every operation needs an [`AdminAccess`].
///
/// Drafts are validated before the backend is called. A successful write invalidates every
/// cached catalog query; a failed one leaves the cache alone.
#[derive(Debug, Clone)]
pub struct CatalogAdmin {
    connection: Connection,
    catalog: CatalogStore,
}

impl CatalogAdmin {
    /// Create an admin over the given connection, invalidating `catalog` after writes.
    #[must_use]
    pub fn new(connection: Connection, catalog: CatalogStore) -> Self {
        Self {
            connection,
            catalog,
        }
    }

    fn backend(&self) -> Result<Arc<dyn StorefrontBackend>, AdminError> {
        self.connection.current().ok_or(AdminError::NotConnected)
    }

    /// Add a new watch.
    ///
    /// # Errors
    ///
    /// Returns an error if the draft is invalid, nothing is connected, or the backend
    /// rejects the call.
    pub async fn add_watch(
        &self,
        _access: AdminAccess,
        draft: &WatchDraft,
    ) -> Result<WatchId, AdminError> {
        let details = draft.validate()?;
        let backend = self.backend()?;

        let id = backend
            .add_watch(details)
            .await
            .inspect_err(|error| warn!(%error, "add watch failed"))?;

        info!(%id, name = %draft.name, "watch added");
        self.catalog.invalidate();

        Ok(id)
    }

    /// Replace every field of an existing watch.
    ///
    /// # Errors
    ///
    /// Returns an error if the draft is invalid, nothing is connected, or the backend
    /// rejects the call.
    pub async fn update_watch(
        &self,
        _access: AdminAccess,
        id: WatchId,
        draft: &WatchDraft,
    ) -> Result<(), AdminError> {
        let details = draft.validate()?;
        let backend = self.backend()?;

        backend
            .update_watch(id, details)
            .await
            .inspect_err(|error| warn!(%id, %error, "update watch failed"))?;

        info!(%id, "watch updated");
        self.catalog.invalidate();

        Ok(())
    }

    /// Delete a watch.
    ///
    /// # Errors
    ///
    /// Returns an error if nothing is connected or the backend rejects the call.
    pub async fn delete_watch(&self, _access: AdminAccess, id: WatchId) -> Result<(), AdminError> {
        let backend = self.backend()?;

        backend
            .delete_watch(id)
            .await
            .inspect_err(|error| warn!(%id, %error, "delete watch failed"))?;

        info!(%id, "watch deleted");
        self.catalog.invalidate();

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;
    use vitrine::{drafts::DraftError, fixtures::Fixture, watches::Watch};

    use crate::{
        backend::{BackendError, MockStorefrontBackend},
        cache::QueryCache,
        domain::admin::{AdminGate, DEFAULT_ADMIN_PASSWORD, SessionStore},
    };

    use super::*;

    fn access() -> Result<AdminAccess, crate::domain::admin::GateError> {
        AdminGate::new(DEFAULT_ADMIN_PASSWORD, SessionStore::new()).login(DEFAULT_ADMIN_PASSWORD)
    }

    fn admin(backend: MockStorefrontBackend) -> (CatalogAdmin, CatalogStore) {
        let connection = Connection::established(Arc::new(backend));
        let catalog = CatalogStore::new(connection.clone(), QueryCache::new());

        (CatalogAdmin::new(connection, catalog.clone()), catalog)
    }

    fn fixture_watch() -> Result<Watch, Box<dyn std::error::Error>> {
        let mut fixture = Fixture::new();
        fixture.load_watches("catalog")?;

        Ok(fixture.watches().first().cloned().ok_or("empty catalog")?)
    }

    #[tokio::test]
    async fn invalid_draft_never_reaches_backend() -> TestResult {
        let mut backend = MockStorefrontBackend::new();
        backend.expect_add_watch().never();

        let (admin, _) = admin(backend);
        let result = admin.add_watch(access()?, &WatchDraft::new()).await;

        assert!(matches!(result, Err(AdminError::Draft(DraftError::MissingField(_)))));

        Ok(())
    }

    #[tokio::test]
    async fn add_returns_backend_id_and_invalidates_catalog() -> TestResult {
        let watch = fixture_watch()?;
        let draft = WatchDraft::from_watch(&watch);
        let expected = watch.details();

        let mut backend = MockStorefrontBackend::new();
        backend
            .expect_get_all_watches()
            .times(2)
            .returning(|| Ok(Vec::new()));
        backend
            .expect_add_watch()
            .once()
            .withf(move |details| *details == expected)
            .return_once(|_| Ok(WatchId::new(77)));

        let (admin, catalog) = admin(backend);

        catalog.get_all_watches().await?;
        let id = admin.add_watch(access()?, &draft).await?;
        catalog.get_all_watches().await?;

        assert_eq!(id, WatchId::new(77));

        Ok(())
    }

    #[tokio::test]
    async fn failed_update_keeps_catalog_cache() -> TestResult {
        let watch = fixture_watch()?;
        let draft = WatchDraft::from_watch(&watch);

        let mut backend = MockStorefrontBackend::new();
        backend
            .expect_get_all_watches()
            .once()
            .returning(|| Ok(Vec::new()));
        backend
            .expect_update_watch()
            .once()
            .return_once(|_, _| Err(BackendError::UnexpectedResponse("down".to_string())));

        let (admin, catalog) = admin(backend);

        catalog.get_all_watches().await?;
        let result = admin.update_watch(access()?, watch.id, &draft).await;
        catalog.get_all_watches().await?;

        assert!(matches!(result, Err(AdminError::Backend(_))));

        Ok(())
    }

    #[tokio::test]
    async fn delete_targets_the_given_watch() -> TestResult {
        let mut backend = MockStorefrontBackend::new();
        backend
            .expect_delete_watch()
            .once()
            .withf(|id| *id == WatchId::new(3))
            .return_once(|_| Ok(()));

        let (admin, _) = admin(backend);

        admin.delete_watch(access()?, WatchId::new(3)).await?;

        Ok(())
    }

    #[tokio::test]
    async fn writes_fail_without_connection() -> TestResult {
        let connection = Connection::pending();
        let catalog = CatalogStore::new(connection.clone(), QueryCache::new());
        let admin = CatalogAdmin::new(connection, catalog);

        let result = admin.delete_watch(access()?, WatchId::new(1)).await;

        assert!(matches!(result, Err(AdminError::NotConnected)));

        Ok(())
    }
}
