//! Plain-HTTP page fetcher.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};

use super::PageFetcher;

/// Default user agent; retailer pages tend to serve bots a different page.
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Fetches pages with reqwest. A plain GET cannot wait for late-rendering
/// content, so the wait selector must already be present in the response
/// body for the fetch to count as a success.
pub struct HttpPageFetcher {
    client: Client,
}

impl HttpPageFetcher {
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .gzip(true)
            .brotli(true)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch_page(
        &self,
        url: &str,
        wait_selector: &str,
        deadline: Duration,
    ) -> anyhow::Result<String> {
        let response = self
            .client
            .get(url)
            .timeout(deadline)
            .send()
            .await?
            .error_for_status()?;
        let markup = response.text().await?;

        // Scoped so the parsed tree never crosses an await point.
        let selector_present = {
            let document = Html::parse_document(&markup);
            match Selector::parse(wait_selector) {
                Ok(selector) => document.select(&selector).next().is_some(),
                Err(_) => false,
            }
        };
        anyhow::ensure!(
            selector_present,
            "selector `{}` never appeared on {}",
            wait_selector,
            url
        );

        Ok(markup)
    }
}
