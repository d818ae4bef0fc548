//! Pricing

use rusty_money::{
    Money,
    iso::{self, Currency},
};

/// Currency every catalog price is quoted in.
pub const STORE_CURRENCY: &Currency = iso::USD;

/// Convert a whole-unit catalog price to money in the store currency.
///
/// Prices beyond `i64::MAX` saturate; the backend never produces them.
#[must_use]
pub fn to_money(price: u64) -> Money<'static, Currency> {
    Money::from_major(i64::try_from(price).unwrap_or(i64::MAX), STORE_CURRENCY)
}

/// Human readable price, e.g. `$12,000.00`.
#[must_use]
pub fn format_price(price: u64) -> String {
    to_money(price).to_string()
}
