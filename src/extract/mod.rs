//! Pluggable structured-data extraction from fetched markup.
//!
//! A backend takes markup and a CSS selector plus a target attribute kind and
//! yields the matching value, or `None` when the page simply doesn't have it.
//! Two variants exist: a static-tree backend over a parsed DOM, and a
//! rendered backend that loads the markup into an isolated browser page.
//! Which one runs is decided once at startup through [`BackendRegistry`];
//! every call site depends only on the [`ExtractionBackend`] trait.

mod dom;
#[cfg(feature = "browser")]
mod rendered;

pub use dom::DomBackend;
#[cfg(feature = "browser")]
pub use rendered::RenderedBackend;

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[cfg(feature = "browser")]
use std::sync::Arc;

#[cfg(feature = "browser")]
use crate::browser::BrowserEngine;

/// Errors from the extraction seam.
///
/// `UnknownBackend` and `UnsupportedAttributeKind` are contract violations
/// and surface to the immediate caller; everything else is caused by hostile
/// or broken external pages and gets swallowed at the per-source boundary.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("unknown extraction backend `{0}`")]
    UnknownBackend(String),

    #[error("attribute kind `{0}` is not supported")]
    UnsupportedAttributeKind(String),

    #[error("invalid selector `{0}`")]
    InvalidSelector(String),

    #[error("browser support not compiled in; rebuild with the `browser` feature")]
    BrowserUnavailable,

    #[error("render failed: {0}")]
    Render(#[from] anyhow::Error),
}

/// Which piece of a matched element to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeKind {
    /// Trimmed text content.
    Text,
    /// The `href` attribute.
    Href,
    /// The `src` attribute.
    Src,
}

impl FromStr for AttributeKind {
    type Err = ExtractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(Self::Text),
            "href" => Ok(Self::Href),
            "src" => Ok(Self::Src),
            other => Err(ExtractError::UnsupportedAttributeKind(other.to_string())),
        }
    }
}

impl std::fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Href => write!(f, "href"),
            Self::Src => write!(f, "src"),
        }
    }
}

/// Extraction backend variants, selectable from configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// Parse the markup into a static tree once and query it.
    #[default]
    Dom,
    /// Load the markup into a headless browser page and query the live DOM.
    Rendered,
}

impl FromStr for BackendKind {
    type Err = ExtractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dom" => Ok(Self::Dom),
            "rendered" => Ok(Self::Rendered),
            other => Err(ExtractError::UnknownBackend(other.to_string())),
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Dom => write!(f, "dom"),
            Self::Rendered => write!(f, "rendered"),
        }
    }
}

/// One extraction session over a single fetched page.
#[async_trait]
pub trait ExtractionBackend: Send {
    /// Load the markup this backend will be queried against.
    async fn load(&mut self, markup: &str) -> Result<(), ExtractError>;

    /// Find the first element matching `selector` and read `kind` from it.
    /// `None` when no element matches or the attribute is absent.
    async fn select(
        &self,
        selector: &str,
        kind: AttributeKind,
    ) -> Result<Option<String>, ExtractError>;
}

/// Closed registry resolving the configured backend once at startup.
///
/// Rendered backends get one isolated page per instance so one source's page
/// state cannot leak into another's.
pub struct BackendRegistry {
    kind: BackendKind,
    #[cfg(feature = "browser")]
    engine: Option<Arc<BrowserEngine>>,
    select_timeout: Duration,
}

impl BackendRegistry {
    /// Build a registry for the static-tree backend.
    pub fn dom() -> Self {
        Self {
            kind: BackendKind::Dom,
            #[cfg(feature = "browser")]
            engine: None,
            select_timeout: Duration::from_secs(5),
        }
    }

    /// Build a registry for the rendered backend backed by `engine`.
    #[cfg(feature = "browser")]
    pub fn rendered(engine: Arc<BrowserEngine>, select_timeout: Duration) -> Self {
        Self {
            kind: BackendKind::Rendered,
            engine: Some(engine),
            select_timeout,
        }
    }

    /// Resolve `kind` against what this build supports. Fails fast on a
    /// rendered backend without browser support compiled in.
    #[cfg(feature = "browser")]
    pub fn for_kind(
        kind: BackendKind,
        engine: Arc<BrowserEngine>,
        select_timeout: Duration,
    ) -> Self {
        match kind {
            BackendKind::Dom => Self::dom(),
            BackendKind::Rendered => Self::rendered(engine, select_timeout),
        }
    }

    #[cfg(not(feature = "browser"))]
    pub fn for_kind(kind: BackendKind) -> Result<Self, ExtractError> {
        match kind {
            BackendKind::Dom => Ok(Self::dom()),
            BackendKind::Rendered => Err(ExtractError::BrowserUnavailable),
        }
    }

    pub fn kind(&self) -> BackendKind {
        self.kind
    }

    /// Create a fresh backend instance for one page's extraction session.
    pub async fn create(&self) -> Result<Box<dyn ExtractionBackend>, ExtractError> {
        match self.kind {
            BackendKind::Dom => Ok(Box::new(DomBackend::new())),
            #[cfg(feature = "browser")]
            BackendKind::Rendered => {
                let engine = self.engine.as_ref().ok_or(ExtractError::BrowserUnavailable)?;
                let backend = RenderedBackend::new(engine, self.select_timeout).await?;
                Ok(Box::new(backend))
            }
            #[cfg(not(feature = "browser"))]
            BackendKind::Rendered => Err(ExtractError::BrowserUnavailable),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attribute_kind_from_str() {
        assert_eq!(AttributeKind::from_str("text").unwrap(), AttributeKind::Text);
        assert_eq!(AttributeKind::from_str("href").unwrap(), AttributeKind::Href);
        assert_eq!(AttributeKind::from_str("src").unwrap(), AttributeKind::Src);
    }

    #[test]
    fn unknown_attribute_kind_is_a_contract_violation() {
        let err = AttributeKind::from_str("alt").unwrap_err();
        assert!(matches!(err, ExtractError::UnsupportedAttributeKind(k) if k == "alt"));
    }

    #[test]
    fn backend_kind_from_str() {
        assert_eq!(BackendKind::from_str("dom").unwrap(), BackendKind::Dom);
        assert_eq!(
            BackendKind::from_str("rendered").unwrap(),
            BackendKind::Rendered
        );
    }

    #[test]
    fn unknown_backend_fails_fast() {
        let err = BackendKind::from_str("bs4").unwrap_err();
        assert!(matches!(err, ExtractError::UnknownBackend(k) if k == "bs4"));
    }

    #[tokio::test]
    async fn dom_registry_creates_backends() {
        let registry = BackendRegistry::dom();
        assert_eq!(registry.kind(), BackendKind::Dom);
        let mut backend = registry.create().await.unwrap();
        backend.load("<p>hi</p>").await.unwrap();
        let text = backend.select("p", AttributeKind::Text).await.unwrap();
        assert_eq!(text.as_deref(), Some("hi"));
    }
}
