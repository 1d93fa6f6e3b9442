//! Application settings.
//!
//! Loaded from a TOML file with serde defaults for every field, so an empty
//! or missing file yields a working dom-backend, HTTP-fetching setup.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::cache::FetchCache;
use crate::extract::{BackendKind, BackendRegistry};
use crate::fetch::{HttpPageFetcher, PageFetcher, SourceFetcher};
use crate::normalize::ProductNormalizer;
use crate::repository::TomlSourceRepository;
use crate::search::SearchService;

#[cfg(feature = "browser")]
use crate::browser::{BrowserEngine, BrowserSettings};
#[cfg(feature = "browser")]
use crate::fetch::BrowserPageFetcher;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// How long successfully fetched markup stays cached, in seconds.
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: u64,

    /// Cache TTL for failed fetches. Defaults to a tenth of the success TTL
    /// so a broken source is re-probed reasonably soon.
    #[serde(default)]
    pub failure_ttl_secs: Option<u64>,

    /// Per-source fetch deadline in seconds, covering navigation and the
    /// wait for the price selector.
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,

    /// How long the rendered backend waits for an element, in seconds.
    #[serde(default = "default_select_timeout")]
    pub select_timeout_secs: u64,

    /// Extraction backend: "dom" or "rendered".
    #[serde(default)]
    pub backend: BackendKind,

    /// Fetch search pages through the browser instead of plain HTTP.
    /// Needed for sources that render results client-side.
    #[serde(default)]
    pub browser_fetch: bool,

    /// Run the browser headless. Set to false only for debugging.
    #[serde(default = "default_headless")]
    pub headless: bool,

    /// Additional Chrome arguments.
    #[serde(default)]
    pub chrome_args: Vec<String>,

    /// Picture reference used when a source page has no product picture.
    #[serde(default = "default_picture")]
    pub default_picture: String,

    /// TOML file holding the `[[sources]]` tables.
    #[serde(default = "default_sources_file")]
    pub sources_file: PathBuf,

    /// Directory served under /static (hosts the default picture).
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,
}

fn default_cache_ttl() -> u64 {
    3600
}

fn default_fetch_timeout() -> u64 {
    10
}

fn default_select_timeout() -> u64 {
    5
}

fn default_headless() -> bool {
    true
}

fn default_picture() -> String {
    "/static/images/device.png".to_string()
}

fn default_sources_file() -> PathBuf {
    PathBuf::from("sources.toml")
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("static")
}

impl Default for Settings {
    fn default() -> Self {
        toml::from_str("").expect("empty settings must deserialize")
    }
}

impl Settings {
    /// Load settings from `path`, or defaults when no path is given and
    /// `pricefinder.toml` does not exist next to the process.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => {
                let fallback = PathBuf::from("pricefinder.toml");
                if !fallback.exists() {
                    return Ok(Self::default());
                }
                fallback
            }
        };
        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read settings from {}", path.display()))?;
        let settings = toml::from_str(&raw)
            .with_context(|| format!("invalid settings in {}", path.display()))?;
        Ok(settings)
    }

    pub fn success_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn failure_ttl(&self) -> Duration {
        Duration::from_secs(self.failure_ttl_secs.unwrap_or(self.cache_ttl_secs / 10))
    }

    pub fn fetch_deadline(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn select_timeout(&self) -> Duration {
        Duration::from_secs(self.select_timeout_secs)
    }

    /// Wire the full search pipeline from these settings. The backend kind
    /// is resolved here, once, so an unsupported configuration fails at
    /// startup instead of mid-query.
    #[cfg(feature = "browser")]
    pub fn build_service(&self) -> anyhow::Result<SearchService> {
        let engine = Arc::new(BrowserEngine::new(BrowserSettings {
            headless: self.headless,
            chrome_args: self.chrome_args.clone(),
            request_timeout: self.fetch_deadline(),
        }));

        let pages: Arc<dyn PageFetcher> = if self.browser_fetch {
            Arc::new(BrowserPageFetcher::new(engine.clone()))
        } else {
            Arc::new(HttpPageFetcher::new(self.fetch_deadline())?)
        };

        let registry = BackendRegistry::for_kind(self.backend, engine, self.select_timeout());
        Ok(self.assemble(pages, registry))
    }

    #[cfg(not(feature = "browser"))]
    pub fn build_service(&self) -> anyhow::Result<SearchService> {
        if self.browser_fetch {
            anyhow::bail!("browser_fetch requires the `browser` feature");
        }
        let pages: Arc<dyn PageFetcher> = Arc::new(HttpPageFetcher::new(self.fetch_deadline())?);
        let registry = BackendRegistry::for_kind(self.backend)?;
        Ok(self.assemble(pages, registry))
    }

    fn assemble(&self, pages: Arc<dyn PageFetcher>, registry: BackendRegistry) -> SearchService {
        let fetcher = Arc::new(SourceFetcher::new(
            Arc::new(FetchCache::new()),
            pages,
            self.success_ttl(),
            self.failure_ttl(),
            self.fetch_deadline(),
        ));
        let normalizer = ProductNormalizer::new(Arc::new(registry), self.default_picture.clone());
        let sources = Arc::new(TomlSourceRepository::new(self.sources_file.clone()));
        SearchService::new(sources, fetcher, normalizer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let settings = Settings::default();
        assert_eq!(settings.cache_ttl_secs, 3600);
        assert_eq!(settings.backend, BackendKind::Dom);
        assert_eq!(settings.failure_ttl(), Duration::from_secs(360));
        assert_eq!(settings.default_picture, "/static/images/device.png");
        assert!(!settings.browser_fetch);
    }

    #[test]
    fn failure_ttl_can_be_overridden() {
        let settings: Settings = toml::from_str("failure_ttl_secs = 42").unwrap();
        assert_eq!(settings.failure_ttl(), Duration::from_secs(42));
    }

    #[test]
    fn backend_parses_from_toml() {
        let settings: Settings = toml::from_str(r#"backend = "rendered""#).unwrap();
        assert_eq!(settings.backend, BackendKind::Rendered);
        assert!(toml::from_str::<Settings>(r#"backend = "bs4""#).is_err());
    }
}
