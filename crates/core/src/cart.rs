//! Cart

use std::{
    fmt::{self, Display, Formatter},
    io,
    num::NonZeroU64,
};

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tabled::{
    builder::Builder,
    settings::{Alignment, Style, object::Columns},
};
use thiserror::Error;

use crate::{
    pricing::format_price,
    watches::{Watch, WatchId},
};

/// Errors raised by cart values.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CartValueError {
    /// Quantities start at one.
    #[error("quantity must be at least 1, got {0}")]
    QuantityBelowOne(u64),

    /// Writing a cart summary failed.
    #[error("failed to write cart summary")]
    IO,
}

/// Number of units of one watch in a cart. Always at least one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct Quantity(NonZeroU64);

impl Quantity {
    /// A single unit.
    pub const ONE: Quantity = Quantity(NonZeroU64::MIN);

    /// Validate a raw quantity.
    ///
    /// # Errors
    ///
    /// Returns [`CartValueError::QuantityBelowOne`] for zero.
    pub fn new(value: u64) -> Result<Self, CartValueError> {
        NonZeroU64::new(value)
            .map(Self)
            .ok_or(CartValueError::QuantityBelowOne(value))
    }

    /// The raw quantity.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0.get()
    }
}

impl TryFrom<u64> for Quantity {
    type Error = CartValueError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Quantity> for u64 {
    fn from(value: Quantity) -> Self {
        value.get()
    }
}

impl Display for Quantity {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

/// One line of a user's cart as reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// Watch in the cart.
    pub watch_id: WatchId,

    /// Units of that watch.
    pub quantity: Quantity,
}

/// Total number of units across all cart lines, as shown on the cart badge.
#[must_use]
pub fn cart_count(items: &[CartItem]) -> u64 {
    items
        .iter()
        .map(|item| item.quantity.get())
        .fold(0, u64::saturating_add)
}

/// A cart item joined with its catalog entry.
#[derive(Debug, Clone, Copy)]
pub struct CartLine<'a> {
    /// The cart item.
    pub item: CartItem,

    /// The watch it refers to.
    pub watch: &'a Watch,
}

/// Join cart items with the catalog, keeping cart order.
///
/// Items whose watch is not in the catalog (deleted, or not loaded yet) are skipped.
#[must_use]
pub fn join_with_catalog<'a>(items: &[CartItem], catalog: &'a [Watch]) -> Vec<CartLine<'a>> {
    let by_id: FxHashMap<WatchId, &Watch> =
        catalog.iter().map(|watch| (watch.id, watch)).collect();

    items
        .iter()
        .filter_map(|item| {
            by_id.get(&item.watch_id).map(|watch| CartLine {
                item: *item,
                watch,
            })
        })
        .collect()
}

/// Printable cart: joined lines plus the backend-computed total.
#[derive(Debug)]
pub struct CartSummary<'a> {
    lines: Vec<CartLine<'a>>,
    total: u64,
}

impl<'a> CartSummary<'a> {
    /// Create a summary. The total is taken as-is from the backend.
    #[must_use]
    pub fn new(lines: Vec<CartLine<'a>>, total: u64) -> Self {
        Self { lines, total }
    }

    /// Joined cart lines.
    #[must_use]
    pub fn lines(&self) -> &[CartLine<'a>] {
        &self.lines
    }

    /// Backend-computed total.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Writes the cart as a table followed by the total.
    ///
    /// # Errors
    ///
    /// Returns an error if the output cannot be written.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), CartValueError> {
        if self.lines.is_empty() {
            return writeln!(out, "Your cart is empty").map_err(|_err| CartValueError::IO);
        }

        let mut builder = Builder::default();

        builder.push_record(["#", "Watch", "Model", "Price", "Qty"]);

        for (idx, line) in self.lines.iter().enumerate() {
            builder.push_record([
                (idx + 1).to_string(),
                line.watch.name.clone(),
                line.watch.model_number.clone(),
                format_price(line.watch.price),
                line.item.quantity.to_string(),
            ]);
        }

        let mut table = builder.build();

        table.with(Style::modern_rounded());
        table.modify(Columns::new(3..5), Alignment::right());

        writeln!(out, "{table}").map_err(|_err| CartValueError::IO)?;
        writeln!(out, "Total: {}", format_price(self.total)).map_err(|_err| CartValueError::IO)
    }
}
