//! Static-tree extraction backend built on `scraper`.

use async_trait::async_trait;
use scraper::{Html, Selector};

use super::{AttributeKind, ExtractError, ExtractionBackend};

/// Queries a statically parsed DOM. Holds the raw markup and parses per
/// select call; `scraper::Html` is not `Send`, so the parsed tree must never
/// sit across an await point.
#[derive(Debug, Default)]
pub struct DomBackend {
    markup: String,
}

impl DomBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ExtractionBackend for DomBackend {
    async fn load(&mut self, markup: &str) -> Result<(), ExtractError> {
        self.markup = markup.to_string();
        Ok(())
    }

    async fn select(
        &self,
        selector: &str,
        kind: AttributeKind,
    ) -> Result<Option<String>, ExtractError> {
        let selector = Selector::parse(selector)
            .map_err(|_| ExtractError::InvalidSelector(selector.to_string()))?;

        let document = Html::parse_document(&self.markup);
        let Some(element) = document.select(&selector).next() else {
            return Ok(None);
        };

        let value = match kind {
            AttributeKind::Text => {
                let text = element.text().collect::<String>().trim().to_string();
                (!text.is_empty()).then_some(text)
            }
            AttributeKind::Href => element.value().attr("href").map(str::to_string),
            AttributeKind::Src => element.value().attr("src").map(str::to_string),
        };

        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
            <div id="name">  Test product  </div>
            <a href="/test-product">Test product</a>
            <img src="/test-product.jpg">
            <div><span class="price">9.99</span></div>
        </body></html>
    "#;

    async fn loaded() -> DomBackend {
        let mut backend = DomBackend::new();
        backend.load(PAGE).await.unwrap();
        backend
    }

    #[tokio::test]
    async fn selects_trimmed_text() {
        let backend = loaded().await;
        let value = backend.select("#name", AttributeKind::Text).await.unwrap();
        assert_eq!(value.as_deref(), Some("Test product"));
    }

    #[tokio::test]
    async fn selects_href_attribute() {
        let backend = loaded().await;
        let value = backend.select("a", AttributeKind::Href).await.unwrap();
        assert_eq!(value.as_deref(), Some("/test-product"));
    }

    #[tokio::test]
    async fn selects_src_attribute() {
        let backend = loaded().await;
        let value = backend.select("img", AttributeKind::Src).await.unwrap();
        assert_eq!(value.as_deref(), Some("/test-product.jpg"));
    }

    #[tokio::test]
    async fn nested_selector_reads_text() {
        let backend = loaded().await;
        let value = backend
            .select("div > span", AttributeKind::Text)
            .await
            .unwrap();
        assert_eq!(value.as_deref(), Some("9.99"));
    }

    #[tokio::test]
    async fn none_when_no_element_matches() {
        let backend = loaded().await;
        let value = backend.select("#missing", AttributeKind::Text).await.unwrap();
        assert_eq!(value, None);
    }

    #[tokio::test]
    async fn none_when_attribute_absent() {
        let backend = loaded().await;
        // The anchor has no src attribute.
        let value = backend.select("a", AttributeKind::Src).await.unwrap();
        assert_eq!(value, None);
    }

    #[tokio::test]
    async fn invalid_selector_is_an_error() {
        let backend = loaded().await;
        let err = backend.select("???", AttributeKind::Text).await.unwrap_err();
        assert!(matches!(err, ExtractError::InvalidSelector(_)));
    }
}
