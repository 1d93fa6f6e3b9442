//! Turns fetched markup into a structured [`Product`], or nothing.
//!
//! Drives an extraction backend over the source's four configured selectors.
//! Name, price and detail URL are required; the picture falls back to a
//! configured default asset. Everything a hostile page can cause is swallowed
//! here, at the single-source boundary, so one malformed retailer page never
//! aborts the aggregate query.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::debug;
use url::Url;

use crate::extract::{AttributeKind, BackendRegistry, ExtractError};
use crate::models::{Product, SourceDescriptor};
use crate::price;

/// Fixed path a source's base URL is joined with to derive its icon.
const FAVICON_PATH: &str = "favicon.ico";

/// Per-query product builder. Cheap to clone behind the shared registry.
#[derive(Clone)]
pub struct ProductNormalizer {
    registry: Arc<BackendRegistry>,
    default_picture: String,
}

impl ProductNormalizer {
    pub fn new(registry: Arc<BackendRegistry>, default_picture: String) -> Self {
        Self {
            registry,
            default_picture,
        }
    }

    /// Extract a product from one source's search-results markup.
    ///
    /// Fails closed on empty markup (the cached failure marker). Any
    /// extraction error is logged at debug level and reported as `None`;
    /// never raised to the caller.
    pub async fn normalize(&self, source: &SourceDescriptor, markup: &str) -> Option<Product> {
        if markup.is_empty() {
            return None;
        }

        match self.try_normalize(source, markup).await {
            Ok(product) => product,
            Err(e) => {
                debug!(source = %source.name, error = %e, "extraction failed");
                None
            }
        }
    }

    async fn try_normalize(
        &self,
        source: &SourceDescriptor,
        markup: &str,
    ) -> Result<Option<Product>, ExtractError> {
        let mut backend = self.registry.create().await?;
        backend.load(markup).await?;

        let Some(name) = backend
            .select(&source.name_selector, AttributeKind::Text)
            .await?
        else {
            debug!(source = %source.name, "product name not found");
            return Ok(None);
        };

        let Some(price_text) = backend
            .select(&source.price_selector, AttributeKind::Text)
            .await?
        else {
            debug!(source = %source.name, "price not found");
            return Ok(None);
        };
        let Some(display_price) = price::parse(&price_text) else {
            debug!(source = %source.name, text = %price_text, "unparseable price");
            return Ok(None);
        };
        let price = strip_vat(display_price, source.included_vat);

        let Some(href) = backend
            .select(&source.url_selector, AttributeKind::Href)
            .await?
        else {
            debug!(source = %source.name, "detail url not found");
            return Ok(None);
        };
        let url = canonicalize(&source.base_url, &href)?;

        let picture_url = match backend
            .select(&source.picture_selector, AttributeKind::Src)
            .await?
        {
            Some(src) => canonicalize(&source.base_url, &src)?,
            None => self.default_picture.clone(),
        };

        let shop_icon = canonicalize(&source.base_url, FAVICON_PATH)?;

        Ok(Some(Product {
            name,
            price,
            currency: source.currency.clone(),
            vat: source.included_vat,
            url,
            picture_url,
            shop: source.name.clone(),
            shop_icon,
        }))
    }
}

/// Remove an included VAT percentage from a displayed price, exactly, and
/// round the result to cents. VAT of 0 leaves the price unchanged.
fn strip_vat(display_price: Decimal, vat: u8) -> Decimal {
    let divisor = Decimal::ONE + Decimal::new(vat as i64, 2);
    (display_price / divisor).round_dp(2)
}

/// Resolve an extracted URL to a canonical absolute URL: strip the base
/// prefix if the page repeated it, strip a single leading slash, then re-join
/// against the base origin.
fn canonicalize(base_url: &str, raw: &str) -> Result<String, ExtractError> {
    let stripped = raw.strip_prefix(base_url).unwrap_or(raw);
    let stripped = stripped.strip_prefix('/').unwrap_or(stripped);
    let base = Url::parse(base_url).map_err(anyhow::Error::from)?;
    let joined = base.join(stripped).map_err(anyhow::Error::from)?;
    Ok(joined.to_string())
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    const MARKUP: &str = r#"
        <html>
            <body>
                <div id="name">Test product</div>
                <a href="https://test.com/test-product">Test product</a>
                <img src="https://test.com/test-product.jpg">
                <div><span class="price">9.99</span></div>
            </body>
        </html>
    "#;

    fn source(vat: u8) -> SourceDescriptor {
        SourceDescriptor {
            name: "TestShop".to_string(),
            base_url: "https://test.com/".to_string(),
            search_template: "search?q=%s".to_string(),
            currency: "EUR".to_string(),
            included_vat: vat,
            name_selector: "#name".to_string(),
            price_selector: "div > span".to_string(),
            url_selector: "a".to_string(),
            picture_selector: "img".to_string(),
            active: true,
        }
    }

    fn normalizer() -> ProductNormalizer {
        ProductNormalizer::new(
            Arc::new(BackendRegistry::dom()),
            "/static/images/device.png".to_string(),
        )
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[tokio::test]
    async fn builds_a_full_product() {
        let product = normalizer().normalize(&source(10), MARKUP).await.unwrap();

        assert_eq!(product.name, "Test product");
        assert_eq!(product.price, dec("9.08"));
        assert_eq!(product.currency, "EUR");
        assert_eq!(product.vat, 10);
        assert_eq!(product.url, "https://test.com/test-product");
        assert_eq!(product.picture_url, "https://test.com/test-product.jpg");
        assert_eq!(product.shop, "TestShop");
        assert_eq!(product.shop_icon, "https://test.com/favicon.ico");
    }

    #[tokio::test]
    async fn zero_vat_keeps_display_price() {
        let product = normalizer().normalize(&source(0), MARKUP).await.unwrap();
        assert_eq!(product.price, dec("9.99"));
    }

    #[tokio::test]
    async fn empty_markup_fails_closed() {
        assert_eq!(normalizer().normalize(&source(10), "").await, None);
    }

    #[tokio::test]
    async fn missing_name_yields_no_product() {
        let markup = MARKUP.replace(r#"id="name""#, r#"id="other""#);
        assert_eq!(normalizer().normalize(&source(10), &markup).await, None);
    }

    #[tokio::test]
    async fn missing_price_yields_no_product() {
        let markup = MARKUP.replace("<span class=\"price\">9.99</span>", "");
        assert_eq!(normalizer().normalize(&source(10), &markup).await, None);
    }

    #[tokio::test]
    async fn unparseable_price_yields_no_product() {
        let markup = MARKUP.replace("9.99", "call us");
        assert_eq!(normalizer().normalize(&source(10), &markup).await, None);
    }

    #[tokio::test]
    async fn missing_detail_url_yields_no_product() {
        let markup = MARKUP.replace(r#"href="https://test.com/test-product""#, "");
        assert_eq!(normalizer().normalize(&source(10), &markup).await, None);
    }

    #[tokio::test]
    async fn missing_picture_falls_back_to_default() {
        let markup = MARKUP.replace("<img src=\"https://test.com/test-product.jpg\">", "");
        let product = normalizer().normalize(&source(10), &markup).await.unwrap();
        assert_eq!(product.picture_url, "/static/images/device.png");
    }

    #[tokio::test]
    async fn relative_urls_are_resolved_against_the_base() {
        let markup = MARKUP
            .replace("https://test.com/test-product.jpg", "/media/pic.jpg")
            .replace("https://test.com/test-product", "/items/42");
        let product = normalizer().normalize(&source(0), &markup).await.unwrap();
        assert_eq!(product.url, "https://test.com/items/42");
        assert_eq!(product.picture_url, "https://test.com/media/pic.jpg");
    }

    #[test]
    fn vat_stripping_rounds_to_cents() {
        assert_eq!(strip_vat(dec("9.99"), 10), dec("9.08"));
        assert_eq!(strip_vat(dec("9.99"), 0), dec("9.99"));
        assert_eq!(strip_vat(dec("19.99"), 10), dec("18.17"));
        assert_eq!(strip_vat(dec("100"), 25), dec("80.00"));
    }

    #[test]
    fn canonicalize_strips_duplicated_base_and_slash() {
        let base = "https://test.com/";
        assert_eq!(
            canonicalize(base, "https://test.com/p/1").unwrap(),
            "https://test.com/p/1"
        );
        assert_eq!(canonicalize(base, "/p/1").unwrap(), "https://test.com/p/1");
        assert_eq!(canonicalize(base, "p/1").unwrap(), "https://test.com/p/1");
    }
}
