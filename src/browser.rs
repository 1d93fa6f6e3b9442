//! Shared headless Chromium engine.
//!
//! Launches a local Chromium over CDP and hands out isolated pages. One
//! engine is shared across the whole process; each rendered-extraction or
//! browser-fetch session gets its own page so per-source state never leaks.

use std::time::Duration;

use anyhow::{Context, Result};
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use tokio::sync::Mutex;
use tracing::info;

/// Browser engine configuration.
#[derive(Debug, Clone)]
pub struct BrowserSettings {
    /// Run in headless mode. Set to false only for debugging.
    pub headless: bool,
    /// Additional Chrome arguments.
    pub chrome_args: Vec<String>,
    /// CDP request timeout.
    pub request_timeout: Duration,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            headless: true,
            chrome_args: Vec::new(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Lazily launched Chromium shared behind an `Arc`.
pub struct BrowserEngine {
    settings: BrowserSettings,
    browser: Mutex<Option<Browser>>,
}

impl BrowserEngine {
    /// Common Chrome executable paths to check.
    const CHROME_PATHS: &'static [&'static str] = &[
        "/usr/bin/google-chrome",
        "/usr/bin/google-chrome-stable",
        "/usr/bin/chromium",
        "/usr/bin/chromium-browser",
        "/snap/bin/chromium",
        "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
        "/Applications/Chromium.app/Contents/MacOS/Chromium",
        "/opt/google/chrome/google-chrome",
    ];

    pub fn new(settings: BrowserSettings) -> Self {
        Self {
            settings,
            browser: Mutex::new(None),
        }
    }

    /// Open a fresh page, launching the browser on first use.
    pub async fn page(&self) -> Result<Page> {
        let mut guard = self.browser.lock().await;
        if guard.is_none() {
            *guard = Some(self.launch().await?);
        }
        let browser = guard.as_ref().expect("browser just launched");
        let page = browser
            .new_page("about:blank")
            .await
            .context("failed to open browser page")?;
        Ok(page)
    }

    /// Drop the browser handle, closing Chromium.
    pub async fn close(&self) {
        let mut guard = self.browser.lock().await;
        *guard = None;
    }

    async fn launch(&self) -> Result<Browser> {
        let chrome_path = Self::find_chrome()?;
        info!(
            "Launching browser at {} (headless={})",
            chrome_path.display(),
            self.settings.headless
        );

        let mut builder = BrowserConfig::builder().chrome_executable(chrome_path);
        if !self.settings.headless {
            builder = builder.with_head();
        }

        builder = builder
            .arg("--disable-blink-features=AutomationControlled")
            .arg("--disable-dev-shm-usage")
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg("--disable-background-networking")
            .arg("--no-sandbox")
            .arg("--disable-gpu");

        for arg in &self.settings.chrome_args {
            builder = builder.arg(arg);
        }

        let config = builder
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build browser config: {}", e))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .context("failed to launch browser")?;

        // Drain CDP events until the connection dies.
        tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        Ok(browser)
    }

    /// Find a Chrome/Chromium executable on this host.
    fn find_chrome() -> Result<std::path::PathBuf> {
        for path in Self::CHROME_PATHS {
            let p = std::path::Path::new(path);
            if p.exists() {
                return Ok(p.to_path_buf());
            }
        }

        for cmd in &[
            "google-chrome",
            "google-chrome-stable",
            "chromium",
            "chromium-browser",
        ] {
            if let Ok(output) = std::process::Command::new("which").arg(cmd).output() {
                if output.status.success() {
                    let path = String::from_utf8_lossy(&output.stdout).trim().to_string();
                    if !path.is_empty() {
                        return Ok(std::path::PathBuf::from(path));
                    }
                }
            }
        }

        Err(anyhow::anyhow!(
            "Chrome/Chromium not found; install it or run with the dom backend \
             and HTTP fetching"
        ))
    }
}
