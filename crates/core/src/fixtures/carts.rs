//! Cart Fixtures

use serde::Deserialize;

use crate::cart::CartItem;

/// Wrapper for a cart in YAML
#[derive(Debug, Deserialize)]
pub struct CartFixture {
    /// Cart lines, using the backend's `watchId`/`quantity` field names
    pub items: Vec<CartItem>,
}
