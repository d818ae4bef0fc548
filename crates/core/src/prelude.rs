//! Vitrine prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::{
        CartItem, CartLine, CartSummary, CartValueError, Quantity, cart_count, join_with_catalog,
    },
    drafts::{AddedImages, DraftError, DraftField, WatchDraft},
    fixtures::{Fixture, FixtureError},
    images::{DisplayHandle, Gallery, ImageHandles, ImageLease, SharedImageHandles},
    listing::{
        CatalogState, DEFAULT_MAX_PRICE, Facets, ListingFilter, ListingView, PRICE_STEP,
        PriceRange, SortDirective,
    },
    pricing::format_price,
    watches::{Gender, MAX_IMAGES, Watch, WatchDetails, WatchId, WatchImages},
};
