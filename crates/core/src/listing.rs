//! Listing
//!
//! The product listing view-model. Every call rescans the full in-memory catalog; there is
//! no index and no incremental recomputation.

use std::{collections::BTreeSet, fmt, str::FromStr};

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::watches::{Gender, Watch};

/// Upper bound of the price control when the catalog is empty.
pub const DEFAULT_MAX_PRICE: u64 = 100_000;

/// Granularity of the price range control.
pub const PRICE_STEP: u64 = 100;

/// Unknown sort directive.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown sort directive '{0}', expected one of: none, asc, desc")]
pub struct SortDirectiveError(String);

/// How the listing orders watches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirective {
    /// Keep the order the backend returned.
    #[default]
    Unsorted,

    /// Cheapest first.
    PriceAscending,

    /// Most expensive first.
    PriceDescending,
}

impl FromStr for SortDirective {
    type Err = SortDirectiveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "unsorted" => Ok(Self::Unsorted),
            "asc" | "price-asc" => Ok(Self::PriceAscending),
            "desc" | "price-desc" => Ok(Self::PriceDescending),
            _ => Err(SortDirectiveError(s.to_string())),
        }
    }
}

impl fmt::Display for SortDirective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Unsorted => "none",
            Self::PriceAscending => "asc",
            Self::PriceDescending => "desc",
        })
    }
}

/// Inclusive price bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PriceRange {
    /// Lowest accepted price.
    pub low: u64,

    /// Highest accepted price.
    pub high: u64,
}

impl PriceRange {
    /// Create a range. Bounds are used as given, so `low > high` matches nothing.
    #[must_use]
    pub const fn new(low: u64, high: u64) -> Self {
        Self { low, high }
    }

    /// Whether `price` lies within the bounds.
    #[must_use]
    pub const fn contains(&self, price: u64) -> bool {
        self.low <= price && price <= self.high
    }
}

impl Default for PriceRange {
    fn default() -> Self {
        Self::new(0, DEFAULT_MAX_PRICE)
    }
}

/// Search, filter and sort inputs of the listing page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingFilter {
    /// Free-text search over name, brand and model number. Empty disables it.
    pub search: String,

    /// Accepted price range.
    pub price: PriceRange,

    /// Accepted genders. Empty accepts all.
    pub genders: FxHashSet<Gender>,

    /// Accepted brands. Empty accepts all.
    pub brands: FxHashSet<String>,

    /// Result ordering.
    pub sort: SortDirective,
}

impl ListingFilter {
    /// Select `gender` if it is not selected, deselect it otherwise.
    pub fn toggle_gender(&mut self, gender: Gender) {
        if !self.genders.remove(&gender) {
            self.genders.insert(gender);
        }
    }

    /// Select `brand` if it is not selected, deselect it otherwise.
    pub fn toggle_brand(&mut self, brand: &str) {
        if !self.brands.remove(brand) {
            self.brands.insert(brand.to_string());
        }
    }

    /// Whether a single watch passes every active predicate.
    #[must_use]
    pub fn matches(&self, watch: &Watch) -> bool {
        self.matches_search(watch, &self.search.to_lowercase())
            && self.price.contains(watch.price)
            && (self.genders.is_empty() || self.genders.contains(&watch.gender))
            && (self.brands.is_empty() || self.brands.contains(&watch.company))
    }

    /// Filter and sort the catalog.
    ///
    /// Sorting is stable, so watches with equal prices keep their catalog order.
    #[must_use]
    pub fn apply<'a>(&self, catalog: &'a [Watch]) -> Vec<&'a Watch> {
        let term = self.search.to_lowercase();

        let mut watches: Vec<&Watch> = catalog
            .iter()
            .filter(|watch| self.matches_search(watch, &term))
            .filter(|watch| self.price.contains(watch.price))
            .filter(|watch| self.genders.is_empty() || self.genders.contains(&watch.gender))
            .filter(|watch| self.brands.is_empty() || self.brands.contains(&watch.company))
            .collect();

        match self.sort {
            SortDirective::Unsorted => {}
            SortDirective::PriceAscending => watches.sort_by_key(|watch| watch.price),
            SortDirective::PriceDescending => {
                watches.sort_by(|left, right| right.price.cmp(&left.price));
            }
        }

        watches
    }

    fn matches_search(&self, watch: &Watch, lowered_term: &str) -> bool {
        if self.search.is_empty() {
            return true;
        }

        [&watch.name, &watch.company, &watch.model_number]
            .iter()
            .any(|field| field.to_lowercase().contains(lowered_term))
    }
}

/// Filter dimensions derived from the unfiltered catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Facets {
    /// Distinct brands, sorted.
    pub brands: Vec<String>,

    /// Upper bound for the price control.
    pub max_price: u64,
}

impl Facets {
    /// Derive facets from the full catalog.
    ///
    /// The current filter selection is deliberately not an input, so deselecting a brand
    /// never removes it from the list.
    #[must_use]
    pub fn from_catalog(catalog: &[Watch]) -> Self {
        let brands: BTreeSet<&str> = catalog.iter().map(|watch| watch.company.as_str()).collect();

        Self {
            brands: brands.into_iter().map(str::to_string).collect(),
            max_price: catalog
                .iter()
                .map(|watch| watch.price)
                .max()
                .unwrap_or(DEFAULT_MAX_PRICE),
        }
    }
}

/// Load state of the catalog feeding the listing.
#[derive(Debug, Clone, Copy)]
pub enum CatalogState<'a> {
    /// Still fetching.
    Loading,

    /// Fetching failed.
    Failed,

    /// Fully fetched.
    Loaded(&'a [Watch]),
}

/// What the listing page should render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingView<'a> {
    /// Catalog still loading.
    Loading,

    /// Catalog failed to load.
    Failed,

    /// Catalog loaded but has no watches at all.
    EmptyCatalog,

    /// Catalog has watches, none of which pass the filter.
    NoMatches,

    /// Watches to show, in display order.
    Results(Vec<&'a Watch>),
}

impl<'a> ListingView<'a> {
    /// Compute the view for the given catalog state and filter.
    #[must_use]
    pub fn compute(catalog: CatalogState<'a>, filter: &ListingFilter) -> Self {
        match catalog {
            CatalogState::Loading => Self::Loading,
            CatalogState::Failed => Self::Failed,
            CatalogState::Loaded([]) => Self::EmptyCatalog,
            CatalogState::Loaded(watches) => {
                let results = filter.apply(watches);

                if results.is_empty() {
                    Self::NoMatches
                } else {
                    Self::Results(results)
                }
            }
        }
    }

    /// Watches to show, empty for every non-result state.
    #[must_use]
    pub fn watches(&self) -> &[&'a Watch] {
        match self {
            Self::Results(watches) => watches,
            _ => &[],
        }
    }
}
