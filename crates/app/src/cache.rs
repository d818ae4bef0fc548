//! Query cache.
//!
//! Results of backend reads keyed by [`QueryKey`]. Mutations invalidate keys instead of
//! patching cached values. Every key carries an epoch that invalidation bumps, so a fetch
//! that started before an invalidation can never store its (stale) result afterwards.

use std::{
    future::Future,
    sync::{Arc, Mutex, PoisonError},
};

use rustc_hash::FxHashMap;
use tracing::debug;
use vitrine::{
    cart::CartItem,
    watches::{Watch, WatchId},
};

use crate::identity::UserId;

/// Identity of a cached query.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    /// Full catalog.
    AllWatches,

    /// Featured subset.
    FeaturedWatches,

    /// A single watch. Bounded by the catalog size.
    Watch(WatchId),

    /// Backend search results for a term. Callers keep at most one term cached.
    Search(String),

    /// A user's cart lines.
    Cart(UserId),

    /// A user's cart total.
    CartTotal(UserId),
}

impl QueryKey {
    /// Whether the key belongs to the watch catalog, as opposed to a cart.
    pub fn is_watch_scoped(&self) -> bool {
        matches!(
            self,
            Self::AllWatches | Self::FeaturedWatches | Self::Watch(_) | Self::Search(_)
        )
    }
}

/// A cached query result.
#[derive(Debug, Clone)]
pub enum CachedValue {
    /// A list of watches.
    Watches(Arc<[Watch]>),

    /// A single watch lookup.
    Watch(Option<Watch>),

    /// Cart lines.
    CartItems(Vec<CartItem>),

    /// A cart total.
    Total(u64),
}

/// Values that can live in the cache.
pub trait Cacheable: Clone {
    /// Wrap for storage.
    fn into_cached(self) -> CachedValue;

    /// Unwrap a stored value of the matching kind.
    fn from_cached(value: &CachedValue) -> Option<Self>;
}

impl Cacheable for Arc<[Watch]> {
    fn into_cached(self) -> CachedValue {
        CachedValue::Watches(self)
    }

    fn from_cached(value: &CachedValue) -> Option<Self> {
        match value {
            CachedValue::Watches(watches) => Some(Arc::clone(watches)),
            _ => None,
        }
    }
}

impl Cacheable for Option<Watch> {
    fn into_cached(self) -> CachedValue {
        CachedValue::Watch(self)
    }

    fn from_cached(value: &CachedValue) -> Option<Self> {
        match value {
            CachedValue::Watch(watch) => Some(watch.clone()),
            _ => None,
        }
    }
}

impl Cacheable for Vec<CartItem> {
    fn into_cached(self) -> CachedValue {
        CachedValue::CartItems(self)
    }

    fn from_cached(value: &CachedValue) -> Option<Self> {
        match value {
            CachedValue::CartItems(items) => Some(items.clone()),
            _ => None,
        }
    }
}

impl Cacheable for u64 {
    fn into_cached(self) -> CachedValue {
        CachedValue::Total(self)
    }

    fn from_cached(value: &CachedValue) -> Option<Self> {
        match value {
            CachedValue::Total(total) => Some(*total),
            _ => None,
        }
    }
}

/// Proof that a fetch started at a given epoch of its key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    key: QueryKey,
    epoch: u64,
}

#[derive(Debug, Default)]
struct CacheState {
    entries: FxHashMap<QueryKey, CachedValue>,
    epochs: FxHashMap<QueryKey, u64>,
}

/// Shared query cache. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct QueryCache {
    state: Arc<Mutex<CacheState>>,
}

impl QueryCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    fn with<R>(&self, f: impl FnOnce(&mut CacheState) -> R) -> R {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);

        f(&mut state)
    }

    /// Cached value for `key`, if present and of type `T`.
    pub fn get<T: Cacheable>(&self, key: &QueryKey) -> Option<T> {
        self.with(|state| state.entries.get(key).and_then(T::from_cached))
    }

    /// Whether `key` currently holds a value.
    pub fn contains(&self, key: &QueryKey) -> bool {
        self.with(|state| state.entries.contains_key(key))
    }

    /// Record the start of a fetch for `key`.
    pub fn ticket(&self, key: QueryKey) -> FetchTicket {
        self.with(|state| {
            let epoch = *state.epochs.entry(key.clone()).or_default();

            FetchTicket { key, epoch }
        })
    }

    /// Store a fetched value unless the key was invalidated since the ticket was taken.
    ///
    /// Returns whether the value was stored.
    pub fn store<T: Cacheable>(&self, ticket: FetchTicket, value: T) -> bool {
        self.with(|state| {
            let current = state.epochs.get(&ticket.key).copied().unwrap_or_default();

            if current != ticket.epoch {
                debug!(key = ?ticket.key, "discarding result of superseded fetch");

                return false;
            }

            state.entries.insert(ticket.key, value.into_cached());

            true
        })
    }

    /// Drop the value for `key` and supersede fetches in flight for it.
    pub fn invalidate(&self, key: &QueryKey) {
        self.invalidate_where(|candidate| candidate == key);
    }

    /// Drop every key matching `predicate` and supersede fetches in flight for them.
    pub fn invalidate_where(&self, predicate: impl Fn(&QueryKey) -> bool) {
        self.with(|state| {
            state.entries.retain(|key, _| !predicate(key));

            for (key, epoch) in &mut state.epochs {
                if predicate(key) {
                    debug!(?key, "invalidated");
                    *epoch = epoch.wrapping_add(1);
                }
            }
        });
    }

    /// Return the cached value, or run `fetch` and cache its result.
    ///
    /// Errors are returned as-is and never cached.
    ///
    /// # Errors
    ///
    /// Returns whatever `fetch` fails with.
    pub async fn get_or_fetch<T, E, F, Fut>(&self, key: QueryKey, fetch: F) -> Result<T, E>
    where
        T: Cacheable,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(value) = self.get::<T>(&key) {
            debug!(?key, "cache hit");

            return Ok(value);
        }

        debug!(?key, "cache miss");

        let ticket = self.ticket(key);
        let value = fetch().await?;

        self.store(ticket, value.clone());

        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn stale_fetch_does_not_overwrite_after_invalidation() {
        let cache = QueryCache::new();
        let key = QueryKey::CartTotal(UserId::from("user_1_a"));

        let stale = cache.ticket(key.clone());
        cache.invalidate(&key);
        let fresh = cache.ticket(key.clone());

        assert!(cache.store(fresh, 20_u64));
        assert!(!cache.store(stale, 10_u64));
        assert_eq!(cache.get::<u64>(&key), Some(20));
    }

    #[test]
    fn concurrent_fetches_without_invalidation_last_wins() {
        let cache = QueryCache::new();
        let key = QueryKey::CartTotal(UserId::from("user_1_a"));

        let first = cache.ticket(key.clone());
        let second = cache.ticket(key.clone());

        assert!(cache.store(second, 2_u64));
        assert!(cache.store(first, 1_u64));
        assert_eq!(cache.get::<u64>(&key), Some(1));
    }

    #[test]
    fn watch_scoped_invalidation_keeps_cart_entries() {
        let cache = QueryCache::new();
        let user = UserId::from("user_1_a");

        let watches: Arc<[Watch]> = Arc::from(Vec::new());
        cache.store(cache.ticket(QueryKey::AllWatches), watches);
        cache.store(cache.ticket(QueryKey::Watch(WatchId::new(1))), None::<Watch>);
        cache.store(cache.ticket(QueryKey::CartTotal(user.clone())), 5_u64);

        cache.invalidate_where(QueryKey::is_watch_scoped);

        assert!(!cache.contains(&QueryKey::AllWatches));
        assert!(!cache.contains(&QueryKey::Watch(WatchId::new(1))));
        assert!(cache.contains(&QueryKey::CartTotal(user)));
    }

    #[test]
    fn mismatched_type_reads_as_missing() {
        let cache = QueryCache::new();
        cache.store(cache.ticket(QueryKey::AllWatches), 3_u64);

        assert!(cache.get::<Arc<[Watch]>>(&QueryKey::AllWatches).is_none());
    }

    #[tokio::test]
    async fn get_or_fetch_fetches_once_then_hits() -> TestResult {
        let cache = QueryCache::new();
        let key = QueryKey::CartTotal(UserId::from("user_1_a"));

        let first: u64 = cache
            .get_or_fetch(key.clone(), || async { Ok::<_, String>(7) })
            .await?;

        let second: u64 = cache
            .get_or_fetch(key, || async { Err::<u64, _>("should not fetch".to_string()) })
            .await?;

        assert_eq!((first, second), (7, 7));

        Ok(())
    }

    #[tokio::test]
    async fn errors_are_not_cached() {
        let cache = QueryCache::new();
        let key = QueryKey::AllWatches;

        let result = cache
            .get_or_fetch(key.clone(), || async {
                Err::<Arc<[Watch]>, _>("offline".to_string())
            })
            .await;

        assert!(result.is_err());
        assert!(!cache.contains(&key));
    }
}
