//! Retailer source configuration consumed by the search pipeline.

use serde::{Deserialize, Serialize};

/// A configured retailer endpoint: where to search and how to read the
/// results page. Owned by the source store; the pipeline only consumes it
/// and assumes the selector fields and template are non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDescriptor {
    /// Display name of the retailer.
    pub name: String,
    /// Base origin URL, e.g. "https://shop.example.com/".
    pub base_url: String,
    /// Search path template with a `%s` query placeholder,
    /// e.g. "search?q=%s".
    pub search_template: String,
    /// 3-letter currency code of displayed prices.
    pub currency: String,
    /// VAT percentage included in the displayed price (0-100).
    #[serde(default)]
    pub included_vat: u8,
    /// CSS selector for the first product's name.
    pub name_selector: String,
    /// CSS selector for the first product's price text.
    pub price_selector: String,
    /// CSS selector for the first product's detail link.
    pub url_selector: String,
    /// CSS selector for the first product's picture.
    pub picture_selector: String,
    /// Inactive sources are skipped entirely.
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}
