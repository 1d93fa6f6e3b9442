//! The query result unit.

use rust_decimal::Decimal;
use serde::Serialize;

/// A single normalized offer from one source. Built by the normalizer only
/// when name, price and detail URL were all extracted; immutable afterward
/// and owned by the caller for one query/response cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Product {
    pub name: String,
    /// VAT-excluded price, rounded to cents.
    pub price: Decimal,
    pub currency: String,
    /// VAT percentage that was removed from the displayed price.
    pub vat: u8,
    /// Canonical absolute detail URL.
    pub url: String,
    /// Canonical absolute picture URL, or the configured default asset.
    pub picture_url: String,
    /// Name of the source that produced this offer.
    pub shop: String,
    /// Source favicon, derived from its base URL.
    pub shop_icon: String,
}
