//! The aggregate search entry point.
//!
//! Fans out one fetch+normalize task per active source, waits for all of
//! them, discards everything that came back absent, and returns the
//! survivors sorted by price. A source producing nothing is the expected
//! steady state for whatever subset is currently unavailable, never an
//! error.

use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, info};

use crate::fetch::{FetchOutcome, SourceFetcher};
use crate::models::Product;
use crate::normalize::ProductNormalizer;
use crate::repository::SourceRepository;

/// Aggregates per-source pipelines into one price-sorted result list.
pub struct SearchService {
    sources: Arc<dyn SourceRepository>,
    fetcher: Arc<SourceFetcher>,
    normalizer: ProductNormalizer,
}

impl SearchService {
    pub fn new(
        sources: Arc<dyn SourceRepository>,
        fetcher: Arc<SourceFetcher>,
        normalizer: ProductNormalizer,
    ) -> Self {
        Self {
            sources,
            fetcher,
            normalizer,
        }
    }

    /// Run `query` against every active source concurrently.
    ///
    /// Returns an empty list for an empty query, when no sources are active,
    /// or when every source pipeline came up empty. Only a failure to read
    /// the source store itself is an error.
    pub async fn search(&self, query: &str) -> anyhow::Result<Vec<Product>> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let sources = self.sources.list_active_sources().await?;
        if sources.is_empty() {
            debug!("no active sources configured");
            return Ok(Vec::new());
        }

        let source_count = sources.len();
        let tasks: Vec<_> = sources
            .into_iter()
            .map(|source| {
                let fetcher = self.fetcher.clone();
                let normalizer = self.normalizer.clone();
                let query = query.clone();
                // One task per source; a panicking pipeline surfaces as a
                // JoinError below instead of taking the query down.
                tokio::spawn(async move {
                    match fetcher.fetch(&source, &query).await {
                        FetchOutcome::Content(markup) => {
                            normalizer.normalize(&source, &markup).await
                        }
                        FetchOutcome::Absent => None,
                    }
                })
            })
            .collect();

        let mut products = Vec::with_capacity(source_count);
        for outcome in join_all(tasks).await {
            match outcome {
                Ok(Some(product)) => products.push(product),
                Ok(None) => {}
                Err(e) => debug!(error = %e, "source pipeline aborted"),
            }
        }

        // Stable sort keeps configuration order on equal prices.
        products.sort_by(|a, b| a.price.cmp(&b.price));

        info!(
            query = %query,
            sources = source_count,
            results = products.len(),
            "search complete"
        );
        Ok(products)
    }
}
