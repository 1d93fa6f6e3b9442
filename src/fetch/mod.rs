//! Per-source fetching of search-results pages.
//!
//! For one source, builds the target URL from the query, consults the fetch
//! cache, and otherwise asks a [`PageFetcher`] for the markup. Every attempt
//! updates the cache: successes keep the full markup for the success TTL,
//! failures record an empty marker for a much shorter window so a broken
//! source is not retried on every query. Fetches are fully independent
//! across sources; nothing here can propagate past this boundary.

mod http;

#[cfg(feature = "browser")]
mod browser;

pub use http::HttpPageFetcher;

#[cfg(feature = "browser")]
pub use browser::BrowserPageFetcher;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;
use url::Url;

use crate::cache::FetchCache;
use crate::models::SourceDescriptor;

/// Outcome of a single fetch attempt. Transient; consumed immediately by the
/// normalizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Captured markup. May be the empty failure marker replayed from the
    /// cache; callers treat empty markup as equivalent to `Absent`.
    Content(String),
    /// Timeout, network error, or the wait selector never appeared.
    Absent,
}

/// Retrieves the markup behind one URL, waiting for `wait_selector` to be
/// satisfiable within `deadline`. Implemented over plain HTTP and over a
/// rendering browser; tests inject mocks.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_page(
        &self,
        url: &str,
        wait_selector: &str,
        deadline: Duration,
    ) -> anyhow::Result<String>;
}

/// Cache-fronted fetcher for source search pages.
pub struct SourceFetcher {
    cache: Arc<FetchCache>,
    pages: Arc<dyn PageFetcher>,
    success_ttl: Duration,
    failure_ttl: Duration,
    deadline: Duration,
}

impl SourceFetcher {
    pub fn new(
        cache: Arc<FetchCache>,
        pages: Arc<dyn PageFetcher>,
        success_ttl: Duration,
        failure_ttl: Duration,
        deadline: Duration,
    ) -> Self {
        Self {
            cache,
            pages,
            success_ttl,
            failure_ttl,
            deadline,
        }
    }

    /// Fetch the search-results markup for `query` on `source`.
    pub async fn fetch(&self, source: &SourceDescriptor, query: &str) -> FetchOutcome {
        let url = match build_search_url(source, query) {
            Ok(url) => url,
            Err(e) => {
                debug!(source = %source.name, error = %e, "could not build search url");
                return FetchOutcome::Absent;
            }
        };

        if let Some(markup) = self.cache.get(&url) {
            debug!(source = %source.name, url = %url, "cache hit");
            return FetchOutcome::Content(markup);
        }

        match self
            .pages
            .fetch_page(&url, &source.price_selector, self.deadline)
            .await
        {
            Ok(markup) => {
                self.cache.set(&url, markup.clone(), self.success_ttl);
                FetchOutcome::Content(markup)
            }
            Err(e) => {
                debug!(source = %source.name, url = %url, error = %e, "fetch failed");
                // Record the failure so the source is skipped for a while.
                self.cache.set(&url, String::new(), self.failure_ttl);
                FetchOutcome::Absent
            }
        }
    }
}

/// Build the canonical search URL for a source: the URL-encoded, lower-cased,
/// trimmed query substituted into the template, resolved against the base.
pub fn build_search_url(source: &SourceDescriptor, query: &str) -> anyhow::Result<String> {
    let query = query.trim().to_lowercase();
    let encoded = urlencoding::encode(&query);
    let path = source.search_template.replace("%s", &encoded);
    let base = Url::parse(&source.base_url)?;
    Ok(base.join(&path)?.to_string())
}
