//! Storefront Context

use std::{
    fmt::{self, Debug, Formatter},
    sync::Arc,
};

use thiserror::Error;
use tracing::{info, warn};
use vitrine::{
    cart::{CartItem, CartSummary, Quantity, join_with_catalog},
    drafts::WatchDraft,
    images::SharedImageHandles,
    listing::{CatalogState, Facets, ListingFilter, ListingView},
    watches::{Watch, WatchId},
};

use crate::{
    backend::{Connection, HttpBackend},
    cache::QueryCache,
    config::ClientConfig,
    domain::{
        admin::{AdminError, AdminGate, CatalogAdmin, GateError, SessionStore},
        cart::{CartError, CartStore},
        catalog::{CatalogError, CatalogSnapshot, CatalogStore},
    },
    identity::{FileStore, IdentityError, UserId, load_or_create},
    notify::Notifier,
};

/// Errors raised while building the storefront context.
#[derive(Debug, Error)]
pub enum AppInitError {
    /// The user id could not be loaded or persisted.
    #[error("failed to load client identity")]
    Identity(#[from] IdentityError),
}

/// Errors raised by admin actions on the storefront.
#[derive(Debug, Error)]
pub enum AdminActionError {
    /// The gate refused access.
    #[error(transparent)]
    Gate(#[from] GateError),

    /// The catalog write failed.
    #[error(transparent)]
    Admin(#[from] AdminError),
}

/// The catalog as the listing page sees it.
#[derive(Debug, Clone)]
pub struct Listing {
    snapshot: Option<CatalogSnapshot>,
}

impl Listing {
    /// Results for `filter`.
    pub fn view<'a>(&'a self, filter: &ListingFilter) -> ListingView<'a> {
        let state = match &self.snapshot {
            Some(snapshot) => CatalogState::Loaded(&snapshot.all),
            None => CatalogState::Failed,
        };

        ListingView::compute(state, filter)
    }

    /// Filter dimensions over the full catalog.
    pub fn facets(&self) -> Facets {
        Facets::from_catalog(self.catalog())
    }

    /// The full catalog, empty if loading failed.
    pub fn catalog(&self) -> &[Watch] {
        match &self.snapshot {
            Some(snapshot) => &snapshot.all,
            None => &[],
        }
    }

    /// Featured watches, empty if loading failed.
    pub fn featured(&self) -> &[Watch] {
        match &self.snapshot {
            Some(snapshot) => &snapshot.featured,
            None => &[],
        }
    }
}

/// The cart joined with the catalog it refers to.
#[derive(Debug, Clone)]
pub struct CartPage {
    catalog: Arc<[Watch]>,
    items: Vec<CartItem>,
    total: u64,
}

impl CartPage {
    /// Printable summary; items whose watch is unknown are left out.
    pub fn summary(&self) -> CartSummary<'_> {
        CartSummary::new(join_with_catalog(&self.items, &self.catalog), self.total)
    }

    /// Raw cart lines.
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }
}

/// Process-wide client state: one connection, one cache, one user, one admin session.
///
/// User-facing actions report their outcome through the [`Notifier`].
pub struct Storefront {
    connection: Connection,
    user: UserId,
    gate: AdminGate,
    notifier: Arc<dyn Notifier>,
    images: SharedImageHandles,
    cart: CartStore,
    catalog: CatalogStore,
    admin: CatalogAdmin,
}

impl Storefront {
    /// Wire the stores around an existing connection.
    pub fn new(
        connection: Connection,
        user: UserId,
        admin_password: impl Into<String>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let cache = QueryCache::new();
        let catalog = CatalogStore::new(connection.clone(), cache.clone());

        Self {
            cart: CartStore::new(connection.clone(), cache, user.clone()),
            admin: CatalogAdmin::new(connection.clone(), catalog.clone()),
            catalog,
            gate: AdminGate::new(admin_password, SessionStore::new()),
            images: SharedImageHandles::new(),
            connection,
            user,
            notifier,
        }
    }

    /// Build the storefront from configuration.
    ///
    /// Without a backend URL the connection stays pending.
    ///
    /// # Errors
    ///
    /// Returns an error if the persisted user id cannot be loaded or created.
    pub fn from_config(
        config: &ClientConfig,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, AppInitError> {
        let user = load_or_create(&FileStore::new(config.storage.client_state_path()))?;

        let connection = match &config.backend.backend_url {
            Some(url) => {
                info!(%url, "connecting to backend");
                Connection::established(Arc::new(HttpBackend::new(url.as_str())))
            }
            None => Connection::pending(),
        };

        Ok(Self::new(
            connection,
            user,
            config.admin.admin_password.as_str(),
            notifier,
        ))
    }

    /// The backend connection.
    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    /// This client's user id.
    pub fn user(&self) -> &UserId {
        &self.user
    }

    /// Cart store.
    pub fn cart(&self) -> &CartStore {
        &self.cart
    }

    /// Catalog store.
    pub fn catalog(&self) -> &CatalogStore {
        &self.catalog
    }

    /// Admin gate.
    pub fn gate(&self) -> &AdminGate {
        &self.gate
    }

    /// Notification sink.
    pub fn notifier(&self) -> &dyn Notifier {
        self.notifier.as_ref()
    }

    /// Display handle registry for image buffers.
    pub fn images(&self) -> &SharedImageHandles {
        &self.images
    }

    /// Load the catalog for the listing page. A failed load yields a listing in the failed
    /// state rather than an error.
    pub async fn listing(&self) -> Listing {
        Listing {
            snapshot: self
                .catalog
                .load()
                .await
                .inspect_err(|error| warn!(%error, "catalog load failed"))
                .ok(),
        }
    }

    /// A watch for the detail page.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] for unknown watches.
    pub async fn watch_detail(&self, id: WatchId) -> Result<Watch, CatalogError> {
        self.catalog.get_watch(id).await
    }

    /// The cart joined with the catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart or the catalog cannot be fetched.
    pub async fn cart_page(&self) -> Result<CartPage, CartError> {
        let (catalog, items, total) = tokio::join!(
            self.catalog.get_all_watches(),
            self.cart.get_cart(),
            self.cart.get_cart_total()
        );

        Ok(CartPage {
            catalog: catalog
                .inspect_err(|error| warn!(%error, "catalog unavailable, cart lines hidden"))
                .unwrap_or_else(|_err| Arc::from(Vec::new())),
            items: items?,
            total: total?,
        })
    }

    /// Add one unit of `watch` to the cart.
    ///
    /// # Errors
    ///
    /// Returns the cart error after notifying the user.
    pub async fn add_to_cart(&self, watch: &Watch) -> Result<(), CartError> {
        self.add_units_to_cart(watch, Quantity::ONE).await
    }

    /// Add several units of `watch` to the cart.
    ///
    /// # Errors
    ///
    /// Returns the cart error after notifying the user.
    pub async fn add_units_to_cart(
        &self,
        watch: &Watch,
        quantity: Quantity,
    ) -> Result<(), CartError> {
        match self.cart.add_to_cart(watch.id, quantity).await {
            Ok(()) => {
                self.notifier.success(&format!("{} added to cart", watch.name));
                Ok(())
            }
            Err(error) => {
                self.notifier.error("Failed to add to cart");
                Err(error)
            }
        }
    }

    /// Remove a watch from the cart.
    ///
    /// # Errors
    ///
    /// Returns the cart error after notifying the user.
    pub async fn remove_from_cart(&self, watch: WatchId) -> Result<(), CartError> {
        match self.cart.remove_from_cart(watch).await {
            Ok(()) => {
                self.notifier.success("Item removed from cart");
                Ok(())
            }
            Err(error) => {
                self.notifier.error("Failed to remove item");
                Err(error)
            }
        }
    }

    /// Set a cart line's quantity. Quantities below one are refused without a notice.
    ///
    /// # Errors
    ///
    /// Returns the cart error; backend failures also notify the user.
    pub async fn update_quantity(&self, watch: WatchId, quantity: u64) -> Result<(), CartError> {
        match self.cart.update_quantity(watch, quantity).await {
            Err(error @ CartError::InvalidQuantity(_)) => Err(error),
            Err(error) => {
                self.notifier.error("Failed to update quantity");
                Err(error)
            }
            Ok(()) => Ok(()),
        }
    }

    /// Open an admin session.
    ///
    /// # Errors
    ///
    /// Returns the gate error after notifying the user of a wrong password.
    pub fn login(&self, password: &str) -> Result<(), GateError> {
        self.gate.login(password).map(|_access| ()).inspect_err(|error| {
            if matches!(error, GateError::IncorrectPassword) {
                self.notifier.error(&error.to_string());
            }
        })
    }

    /// Add a watch from an admin form.
    ///
    /// # Errors
    ///
    /// Returns an error without a session, for an invalid draft or a failed backend call.
    pub async fn add_watch(&self, draft: &WatchDraft) -> Result<WatchId, AdminActionError> {
        let access = self.gate.require()?;

        self.notify_admin(
            self.admin.add_watch(access, draft).await,
            "Watch added successfully",
            "Failed to add watch",
        )
    }

    /// Replace a watch from an admin form.
    ///
    /// # Errors
    ///
    /// Returns an error without a session, for an invalid draft or a failed backend call.
    pub async fn update_watch(
        &self,
        id: WatchId,
        draft: &WatchDraft,
    ) -> Result<(), AdminActionError> {
        let access = self.gate.require()?;

        self.notify_admin(
            self.admin.update_watch(access, id, draft).await,
            "Watch updated successfully",
            "Failed to update watch",
        )
    }

    /// Delete a watch.
    ///
    /// # Errors
    ///
    /// Returns an error without a session or for a failed backend call.
    pub async fn delete_watch(&self, id: WatchId) -> Result<(), AdminActionError> {
        let access = self.gate.require()?;

        self.notify_admin(
            self.admin.delete_watch(access, id).await,
            "Watch deleted successfully",
            "Failed to delete watch",
        )
    }

    fn notify_admin<T>(
        &self,
        result: Result<T, AdminError>,
        success: &str,
        failure: &str,
    ) -> Result<T, AdminActionError> {
        match &result {
            Ok(_) => self.notifier.success(success),
            Err(AdminError::Draft(error)) => self.notifier.error(&error.to_string()),
            Err(_) => self.notifier.error(failure),
        }

        result.map_err(AdminActionError::from)
    }
}

impl Debug for Storefront {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Storefront")
            .field("connection", &self.connection)
            .field("user", &self.user)
            .field("gate", &self.gate)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;
    use vitrine::{drafts::DraftError, fixtures::Fixture};

    use crate::{
        backend::{BackendError, MockStorefrontBackend},
        domain::admin::DEFAULT_ADMIN_PASSWORD,
        notify::MockNotifier,
    };

    use super::*;

    fn storefront(backend: MockStorefrontBackend, notifier: MockNotifier) -> Storefront {
        Storefront::new(
            Connection::established(Arc::new(backend)),
            UserId::from("user_1_abcdefghi"),
            DEFAULT_ADMIN_PASSWORD,
            Arc::new(notifier),
        )
    }

    fn catalog() -> Result<Fixture, vitrine::fixtures::FixtureError> {
        let mut fixture = Fixture::new();
        fixture.load_watches("catalog")?;

        Ok(fixture)
    }

    #[tokio::test]
    async fn add_to_cart_announces_the_watch_name() -> TestResult {
        let fixture = catalog()?;
        let watch = fixture.watches().first().cloned().ok_or("empty catalog")?;

        let mut backend = MockStorefrontBackend::new();
        backend.expect_add_to_cart().return_once(|_, _, _| Ok(()));

        let mut notifier = MockNotifier::new();
        notifier
            .expect_success()
            .once()
            .withf(|message| message == "Aria added to cart")
            .return_const(());

        storefront(backend, notifier).add_to_cart(&watch).await?;

        Ok(())
    }

    #[tokio::test]
    async fn failed_removal_is_announced() {
        let mut backend = MockStorefrontBackend::new();
        backend
            .expect_remove_from_cart()
            .return_once(|_, _| Err(BackendError::Rejected("gone".to_string())));

        let mut notifier = MockNotifier::new();
        notifier
            .expect_error()
            .once()
            .withf(|message| message == "Failed to remove item")
            .return_const(());

        let result = storefront(backend, notifier)
            .remove_from_cart(WatchId::new(1))
            .await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn zero_quantity_is_silent() {
        let mut backend = MockStorefrontBackend::new();
        backend.expect_update_cart_item_quantity().never();

        let mut notifier = MockNotifier::new();
        notifier.expect_error().never();
        notifier.expect_success().never();

        let result = storefront(backend, notifier)
            .update_quantity(WatchId::new(1), 0)
            .await;

        assert!(matches!(result, Err(CartError::InvalidQuantity(_))));
    }

    #[tokio::test]
    async fn admin_actions_require_login() {
        let mut backend = MockStorefrontBackend::new();
        backend.expect_delete_watch().never();

        let result = storefront(backend, MockNotifier::new())
            .delete_watch(WatchId::new(1))
            .await;

        assert!(matches!(
            result,
            Err(AdminActionError::Gate(GateError::LoginRequired))
        ));
    }

    #[tokio::test]
    async fn wrong_password_is_announced() {
        let mut notifier = MockNotifier::new();
        notifier
            .expect_error()
            .once()
            .withf(|message| message == "Incorrect password. Please try again.")
            .return_const(());

        let result = storefront(MockStorefrontBackend::new(), notifier).login("nope");

        assert!(matches!(result, Err(GateError::IncorrectPassword)));
    }

    #[tokio::test]
    async fn draft_problems_are_announced_verbatim() -> TestResult {
        let fixture = catalog()?;
        let watch = fixture.watches().first().ok_or("empty catalog")?;
        let mut draft = WatchDraft::from_watch(watch);
        draft.remove_image(1);
        draft.remove_image(0);

        let mut backend = MockStorefrontBackend::new();
        backend.expect_add_watch().never();

        let mut notifier = MockNotifier::new();
        notifier.expect_success().never();
        notifier
            .expect_error()
            .once()
            .withf(|message| message == "Please select at least one image")
            .return_const(());

        let storefront = storefront(backend, notifier);
        storefront.login(DEFAULT_ADMIN_PASSWORD)?;

        let result = storefront.add_watch(&draft).await;

        assert!(matches!(
            result,
            Err(AdminActionError::Admin(AdminError::Draft(DraftError::NoImages)))
        ));

        Ok(())
    }

    #[tokio::test]
    async fn delete_announces_success() -> TestResult {
        let mut backend = MockStorefrontBackend::new();
        backend.expect_delete_watch().return_once(|_| Ok(()));

        let mut notifier = MockNotifier::new();
        notifier
            .expect_success()
            .once()
            .withf(|message| message == "Watch deleted successfully")
            .return_const(());

        let storefront = storefront(backend, notifier);
        storefront.login(DEFAULT_ADMIN_PASSWORD)?;
        storefront.delete_watch(WatchId::new(3)).await?;

        Ok(())
    }

    #[tokio::test]
    async fn failed_catalog_load_yields_failed_listing() {
        let mut backend = MockStorefrontBackend::new();
        backend
            .expect_get_all_watches()
            .return_once(|| Err(BackendError::UnexpectedResponse("down".to_string())));
        backend
            .expect_get_featured_watches()
            .return_once(|| Ok(Vec::new()));

        let listing = storefront(backend, MockNotifier::new()).listing().await;

        assert_eq!(listing.view(&ListingFilter::default()), ListingView::Failed);
        assert!(listing.catalog().is_empty());
    }

    #[tokio::test]
    async fn cart_page_joins_items_with_catalog() -> TestResult {
        let mut fixture = catalog()?;
        fixture.load_cart("with_deleted_watch")?;

        let watches = fixture.watches().to_vec();
        let items = fixture.cart_items().to_vec();
        let total = fixture.cart_total();

        let mut backend = MockStorefrontBackend::new();
        backend
            .expect_get_all_watches()
            .return_once(move || Ok(watches));
        backend.expect_get_cart().return_once(move |_| Ok(items));
        backend
            .expect_get_cart_total()
            .return_once(move |_| Ok(total));

        let page = storefront(backend, MockNotifier::new()).cart_page().await?;

        assert_eq!(page.items().len(), 3);
        assert_eq!(page.summary().lines().len(), 2);
        assert_eq!(page.summary().total(), total);

        Ok(())
    }

    #[tokio::test]
    async fn cart_page_survives_a_catalog_failure() -> TestResult {
        let mut fixture = catalog()?;
        fixture.load_cart("basic")?;

        let items = fixture.cart_items().to_vec();

        let mut backend = MockStorefrontBackend::new();
        backend
            .expect_get_all_watches()
            .return_once(|| Err(BackendError::UnexpectedResponse("down".to_string())));
        backend.expect_get_cart().return_once(move |_| Ok(items));
        backend.expect_get_cart_total().return_once(|_| Ok(19_200));

        let page = storefront(backend, MockNotifier::new()).cart_page().await?;

        assert_eq!(page.items().len(), 2);
        assert!(page.summary().lines().is_empty());
        assert_eq!(page.summary().total(), 19_200);

        Ok(())
    }
}
