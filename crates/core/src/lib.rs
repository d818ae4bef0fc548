//! Vitrine
//!
//! Domain types and client-side derived state for a luxury-watch storefront: the catalog
//! model, cart line items, the listing view-model (search, filters, sorting and facets),
//! image display handles and admin form validation.

pub mod cart;
pub mod drafts;
pub mod fixtures;
pub mod images;
pub mod listing;
pub mod prelude;
pub mod pricing;
pub mod watches;
