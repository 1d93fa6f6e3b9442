//! Browser-based page fetcher for sources that render results client-side.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::Page;
use tracing::debug;

use crate::browser::BrowserEngine;

use super::PageFetcher;

/// Navigates an isolated browser page to the search URL and waits for the
/// source's price selector to appear before capturing the markup.
pub struct BrowserPageFetcher {
    engine: Arc<BrowserEngine>,
}

impl BrowserPageFetcher {
    pub fn new(engine: Arc<BrowserEngine>) -> Self {
        Self { engine }
    }

    async fn fetch_inner(
        &self,
        page: &Page,
        url: &str,
        wait_selector: &str,
        deadline: Duration,
    ) -> anyhow::Result<String> {
        debug!(url, "navigating");
        tokio::time::timeout(deadline, page.goto(url))
            .await
            .map_err(|_| anyhow::anyhow!("navigation timed out after {:?} for {}", deadline, url))?
            .map_err(|e| anyhow::anyhow!("navigation failed for {}: {}", url, e))?;

        tokio::time::timeout(deadline, page.find_element(wait_selector))
            .await
            .map_err(|_| {
                anyhow::anyhow!("timed out waiting for `{}` on {}", wait_selector, url)
            })?
            .map_err(|e| {
                anyhow::anyhow!("selector `{}` never appeared on {}: {}", wait_selector, url, e)
            })?;

        let markup = page.content().await?;
        Ok(markup)
    }
}

#[async_trait]
impl PageFetcher for BrowserPageFetcher {
    async fn fetch_page(
        &self,
        url: &str,
        wait_selector: &str,
        deadline: Duration,
    ) -> anyhow::Result<String> {
        let page = self.engine.page().await?;
        let result = self.fetch_inner(&page, url, wait_selector, deadline).await;
        let _ = page.close().await;
        result
    }
}
