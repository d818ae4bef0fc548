//! Cart store.

use std::sync::Arc;

use tracing::{info, warn};
use vitrine::{
    cart::{CartItem, CartLine, Quantity, cart_count, join_with_catalog},
    watches::{Watch, WatchId},
};

use crate::{
    backend::{Connection, StorefrontBackend},
    cache::{QueryCache, QueryKey},
    domain::cart::CartError,
    identity::UserId,
};

/// Cached view of one user's cart, plus the mutations on it.
///
/// Reads return an empty cart (or a zero total) until the backend connection is
/// established. Every successful mutation invalidates both the cart and its total; a failed
/// one leaves the cache untouched.
#[derive(Debug, Clone)]
pub struct CartStore {
    connection: Connection,
    cache: QueryCache,
    user: UserId,
}

impl CartStore {
    /// Create a store for `user`'s cart.
    #[must_use]
    pub fn new(connection: Connection, cache: QueryCache, user: UserId) -> Self {
        Self {
            connection,
            cache,
            user,
        }
    }

    /// The user this cart belongs to.
    pub fn user(&self) -> &UserId {
        &self.user
    }

    fn backend(&self) -> Result<Arc<dyn StorefrontBackend>, CartError> {
        self.connection.current().ok_or(CartError::NotConnected)
    }

    fn invalidate(&self) {
        self.cache.invalidate(&QueryKey::Cart(self.user.clone()));
        self.cache.invalidate(&QueryKey::CartTotal(self.user.clone()));
    }

    /// Current cart lines.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails.
    pub async fn get_cart(&self) -> Result<Vec<CartItem>, CartError> {
        let Some(backend) = self.connection.current() else {
            return Ok(Vec::new());
        };

        let user = self.user.clone();

        self.cache
            .get_or_fetch(QueryKey::Cart(self.user.clone()), || async move {
                backend.get_cart(user).await.map_err(CartError::from)
            })
            .await
    }

    /// Backend-computed cart total.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails.
    pub async fn get_cart_total(&self) -> Result<u64, CartError> {
        let Some(backend) = self.connection.current() else {
            return Ok(0);
        };

        let user = self.user.clone();

        self.cache
            .get_or_fetch(QueryKey::CartTotal(self.user.clone()), || async move {
                backend.get_cart_total(user).await.map_err(CartError::from)
            })
            .await
    }

    /// Total units across the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be fetched.
    pub async fn cart_count(&self) -> Result<u64, CartError> {
        Ok(cart_count(&self.get_cart().await?))
    }

    /// Cart lines joined with `catalog`, skipping watches the catalog does not know.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be fetched.
    pub async fn lines<'a>(&self, catalog: &'a [Watch]) -> Result<Vec<CartLine<'a>>, CartError> {
        Ok(join_with_catalog(&self.get_cart().await?, catalog))
    }

    /// Add units of a watch.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is not connected or rejects the call.
    pub async fn add_to_cart(&self, watch: WatchId, quantity: Quantity) -> Result<(), CartError> {
        let backend = self.backend()?;

        backend
            .add_to_cart(self.user.clone(), watch, quantity)
            .await
            .inspect_err(|error| warn!(%watch, %error, "add to cart failed"))?;

        info!(%watch, %quantity, user = %self.user, "added to cart");
        self.invalidate();

        Ok(())
    }

    /// Remove a watch from the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is not connected or rejects the call.
    pub async fn remove_from_cart(&self, watch: WatchId) -> Result<(), CartError> {
        let backend = self.backend()?;

        backend
            .remove_from_cart(self.user.clone(), watch)
            .await
            .inspect_err(|error| warn!(%watch, %error, "remove from cart failed"))?;

        info!(%watch, user = %self.user, "removed from cart");
        self.invalidate();

        Ok(())
    }

    /// Set the quantity of a cart line. Quantities below one never reach the backend.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::InvalidQuantity`] for zero, otherwise an error if the backend is
    /// not connected or rejects the call.
    pub async fn update_quantity(&self, watch: WatchId, quantity: u64) -> Result<(), CartError> {
        let quantity = Quantity::new(quantity)?;
        let backend = self.backend()?;

        backend
            .update_cart_item_quantity(self.user.clone(), watch, quantity)
            .await
            .inspect_err(|error| warn!(%watch, %error, "update quantity failed"))?;

        info!(%watch, %quantity, user = %self.user, "updated cart quantity");
        self.invalidate();

        Ok(())
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is not connected or rejects the call.
    pub async fn clear_cart(&self) -> Result<(), CartError> {
        let backend = self.backend()?;

        backend
            .clear_cart(self.user.clone())
            .await
            .inspect_err(|error| warn!(%error, "clear cart failed"))?;

        info!(user = %self.user, "cleared cart");
        self.invalidate();

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;
    use vitrine::fixtures::Fixture;

    use crate::backend::{BackendError, MockStorefrontBackend};

    use super::*;

    fn user() -> UserId {
        UserId::from("user_1718000000000_abcdefghi")
    }

    fn store(backend: MockStorefrontBackend) -> CartStore {
        CartStore::new(
            Connection::established(Arc::new(backend)),
            QueryCache::new(),
            user(),
        )
    }

    fn fixture_cart() -> Result<Fixture, vitrine::fixtures::FixtureError> {
        let mut fixture = Fixture::new();
        fixture.load_watches("catalog")?.load_cart("basic")?;

        Ok(fixture)
    }

    #[tokio::test]
    async fn reads_are_empty_without_connection() -> TestResult {
        let store = CartStore::new(Connection::pending(), QueryCache::new(), user());

        assert!(store.get_cart().await?.is_empty());
        assert_eq!(store.get_cart_total().await?, 0);
        assert_eq!(store.cart_count().await?, 0);

        Ok(())
    }

    #[tokio::test]
    async fn mutations_fail_without_connection() {
        let store = CartStore::new(Connection::pending(), QueryCache::new(), user());

        let result = store.add_to_cart(WatchId::new(1), Quantity::ONE).await;

        assert!(matches!(result, Err(CartError::NotConnected)));
    }

    #[tokio::test]
    async fn cart_is_fetched_once_and_cached() -> TestResult {
        let fixture = fixture_cart()?;
        let items = fixture.cart_items().to_vec();
        let mut backend = MockStorefrontBackend::new();

        backend
            .expect_get_cart()
            .once()
            .withf(|requested| *requested == user())
            .return_once(move |_| Ok(items));

        let store = store(backend);

        assert_eq!(store.cart_count().await?, 3);
        assert_eq!(store.get_cart().await?.len(), 2);

        Ok(())
    }

    #[tokio::test]
    async fn successful_add_invalidates_cart_and_total() -> TestResult {
        let mut backend = MockStorefrontBackend::new();

        backend.expect_get_cart().times(2).returning(|_| Ok(Vec::new()));
        backend.expect_get_cart_total().times(2).returning(|_| Ok(0));
        backend
            .expect_add_to_cart()
            .once()
            .withf(|_, watch, quantity| *watch == WatchId::new(2) && quantity.get() == 1)
            .return_once(|_, _, _| Ok(()));

        let store = store(backend);

        store.get_cart().await?;
        store.get_cart_total().await?;

        store.add_to_cart(WatchId::new(2), Quantity::ONE).await?;

        store.get_cart().await?;
        store.get_cart_total().await?;

        Ok(())
    }

    #[tokio::test]
    async fn failed_mutation_keeps_cache() -> TestResult {
        let mut backend = MockStorefrontBackend::new();

        backend.expect_get_cart().once().returning(|_| Ok(Vec::new()));
        backend
            .expect_remove_from_cart()
            .once()
            .return_once(|_, _| Err(BackendError::Rejected("not in cart".to_string())));

        let store = store(backend);

        store.get_cart().await?;
        let result = store.remove_from_cart(WatchId::new(9)).await;
        store.get_cart().await?;

        assert!(matches!(
            result,
            Err(CartError::Backend(BackendError::Rejected(_)))
        ));

        Ok(())
    }

    #[tokio::test]
    async fn zero_quantity_never_reaches_backend() {
        let mut backend = MockStorefrontBackend::new();
        backend.expect_update_cart_item_quantity().never();

        let result = store(backend).update_quantity(WatchId::new(1), 0).await;

        assert!(matches!(result, Err(CartError::InvalidQuantity(_))));
    }

    #[tokio::test]
    async fn update_quantity_passes_the_new_value() -> TestResult {
        let mut backend = MockStorefrontBackend::new();

        backend
            .expect_update_cart_item_quantity()
            .once()
            .withf(|_, watch, quantity| *watch == WatchId::new(1) && quantity.get() == 4)
            .return_once(|_, _, _| Ok(()));

        store(backend).update_quantity(WatchId::new(1), 4).await?;

        Ok(())
    }

    #[tokio::test]
    async fn clear_cart_invalidates() -> TestResult {
        let mut backend = MockStorefrontBackend::new();

        backend.expect_get_cart_total().times(2).returning(|_| Ok(100));
        backend.expect_clear_cart().once().return_once(|_| Ok(()));

        let store = store(backend);

        store.get_cart_total().await?;
        store.clear_cart().await?;
        store.get_cart_total().await?;

        Ok(())
    }

    #[tokio::test]
    async fn lines_skip_watches_missing_from_catalog() -> TestResult {
        let mut fixture = Fixture::new();
        fixture
            .load_watches("catalog")?
            .load_cart("with_deleted_watch")?;

        let items = fixture.cart_items().to_vec();
        let mut backend = MockStorefrontBackend::new();
        backend.expect_get_cart().return_once(move |_| Ok(items));

        let store = store(backend);
        let lines = store.lines(fixture.watches()).await?;

        let names: Vec<&str> = lines.iter().map(|line| line.watch.name.as_str()).collect();
        assert_eq!(names, ["Aria", "Atlas"]);

        Ok(())
    }
}
