//! pricefinder - live price comparison across configured retailer sources.
//!
//! Fetches each configured source's search-results page concurrently,
//! extracts the first offer with per-source CSS selectors, normalizes
//! prices (exact decimals, VAT removed) and URLs, and merges everything
//! into one price-sorted list. Slow, broken or hostile sources are
//! isolated per query; they simply contribute nothing.

#[cfg(feature = "browser")]
pub mod browser;
pub mod cache;
pub mod config;
pub mod extract;
pub mod fetch;
pub mod models;
pub mod normalize;
pub mod price;
pub mod repository;
pub mod search;
pub mod server;
