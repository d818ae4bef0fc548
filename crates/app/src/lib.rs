//! Vitrine client: backend access, cached catalog and cart state, the admin gate and the
//! storefront context that ties them together.

pub mod backend;
pub mod cache;
pub mod config;
pub mod context;
pub mod domain;
pub mod identity;
pub mod notify;
pub mod observability;
