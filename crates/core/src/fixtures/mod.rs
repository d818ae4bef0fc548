//! Fixtures

use std::{fs, path::PathBuf};

use rustc_hash::FxHashSet;
use thiserror::Error;

use crate::{
    cart::CartItem,
    fixtures::{carts::CartFixture, watches::WatchesFixture},
    watches::{Watch, WatchId},
};

pub mod carts;
pub mod watches;

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Two watches share an identifier
    #[error("Duplicate watch id: {0}")]
    DuplicateWatch(WatchId),
}

/// Catalog and cart state loaded from YAML files.
#[derive(Debug)]
pub struct Fixture {
    base_path: PathBuf,
    watches: Vec<Watch>,
    cart: Vec<CartItem>,
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}

impl Fixture {
    /// Create an empty fixture reading from this crate's bundled `fixtures` directory
    pub fn new() -> Self {
        Self::with_base_path(concat!(env!("CARGO_MANIFEST_DIR"), "/fixtures"))
    }

    /// Create an empty fixture with custom base path
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            watches: Vec::new(),
            cart: Vec::new(),
        }
    }

    /// Load watches from a YAML fixture file, appending them to the catalog
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if an id is reused.
    pub fn load_watches(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self.base_path.join("watches").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;
        let fixture: WatchesFixture = serde_norway::from_str(&contents)?;

        let mut seen: FxHashSet<WatchId> = self.watches.iter().map(|watch| watch.id).collect();

        for watch_fixture in fixture.watches {
            let watch = Watch::from(watch_fixture);

            if !seen.insert(watch.id) {
                return Err(FixtureError::DuplicateWatch(watch.id));
            }

            self.watches.push(watch);
        }

        Ok(self)
    }

    /// Load cart items from a YAML fixture file, replacing the current cart
    ///
    /// Items may reference watches missing from the catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_cart(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self.base_path.join("carts").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;
        let fixture: CartFixture = serde_norway::from_str(&contents)?;

        self.cart = fixture.items;

        Ok(self)
    }

    /// Loaded watches, in file order
    pub fn watches(&self) -> &[Watch] {
        &self.watches
    }

    /// Look up a loaded watch
    pub fn watch(&self, id: WatchId) -> Option<&Watch> {
        self.watches.iter().find(|watch| watch.id == id)
    }

    /// Featured subset of the loaded watches, in file order
    pub fn featured(&self) -> Vec<Watch> {
        self.watches
            .iter()
            .filter(|watch| watch.is_featured)
            .cloned()
            .collect()
    }

    /// Loaded cart items
    pub fn cart_items(&self) -> &[CartItem] {
        &self.cart
    }

    /// Cart total over the items whose watch is in the catalog
    pub fn cart_total(&self) -> u64 {
        self.cart
            .iter()
            .filter_map(|item| {
                self.watch(item.watch_id)
                    .map(|watch| watch.price.saturating_mul(item.quantity.get()))
            })
            .fold(0, u64::saturating_add)
    }
}
