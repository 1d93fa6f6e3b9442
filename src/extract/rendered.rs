//! Rendered extraction backend built on a headless browser page.

use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::Page;
use tracing::debug;

use crate::browser::BrowserEngine;

use super::{AttributeKind, ExtractError, ExtractionBackend};

/// Queries the live DOM of an isolated browser page. Content is set
/// directly, never navigated, and element lookups await presence up to a
/// bounded timeout before giving up.
pub struct RenderedBackend {
    page: Page,
    select_timeout: Duration,
}

impl RenderedBackend {
    pub(crate) async fn new(
        engine: &BrowserEngine,
        select_timeout: Duration,
    ) -> Result<Self, ExtractError> {
        let page = engine.page().await?;
        Ok(Self {
            page,
            select_timeout,
        })
    }
}

#[async_trait]
impl ExtractionBackend for RenderedBackend {
    async fn load(&mut self, markup: &str) -> Result<(), ExtractError> {
        self.page
            .set_content(markup)
            .await
            .map_err(|e| ExtractError::Render(e.into()))?;
        Ok(())
    }

    async fn select(
        &self,
        selector: &str,
        kind: AttributeKind,
    ) -> Result<Option<String>, ExtractError> {
        let element =
            match tokio::time::timeout(self.select_timeout, self.page.find_element(selector)).await
            {
                Ok(Ok(element)) => element,
                Ok(Err(e)) => {
                    debug!(selector, error = %e, "element not found");
                    return Ok(None);
                }
                Err(_) => {
                    debug!(selector, "timed out waiting for element");
                    return Ok(None);
                }
            };

        let value = match kind {
            AttributeKind::Text => element
                .inner_text()
                .await
                .map_err(|e| ExtractError::Render(e.into()))?
                .map(|text| text.trim().to_string())
                .filter(|text| !text.is_empty()),
            AttributeKind::Href => element
                .attribute("href")
                .await
                .map_err(|e| ExtractError::Render(e.into()))?,
            AttributeKind::Src => element
                .attribute("src")
                .await
                .map_err(|e| ExtractError::Render(e.into()))?,
        };

        Ok(value)
    }
}

impl Drop for RenderedBackend {
    fn drop(&mut self) {
        // Page close is async; detach it so dropping a backend never blocks.
        let page = self.page.clone();
        tokio::spawn(async move {
            let _ = page.close().await;
        });
    }
}
