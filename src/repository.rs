//! Source configuration store boundary.
//!
//! The search pipeline only ever reads the active sources; creating,
//! editing and bulk (de)activation happen wherever the store lives. The
//! default store is a TOML file of `[[sources]]` tables.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;

use crate::models::SourceDescriptor;

/// Read-only view over configured sources.
#[async_trait]
pub trait SourceRepository: Send + Sync {
    /// All sources with the active flag set, in configuration order.
    async fn list_active_sources(&self) -> anyhow::Result<Vec<SourceDescriptor>>;
}

#[derive(Debug, Deserialize)]
struct SourcesFile {
    #[serde(default)]
    sources: Vec<SourceDescriptor>,
}

/// Sources from a TOML file, re-read per query so edits apply without a
/// restart.
pub struct TomlSourceRepository {
    path: PathBuf,
}

impl TomlSourceRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SourceRepository for TomlSourceRepository {
    async fn list_active_sources(&self) -> anyhow::Result<Vec<SourceDescriptor>> {
        let raw = tokio::fs::read_to_string(&self.path).await?;
        let file: SourcesFile = toml::from_str(&raw)?;
        Ok(file.sources.into_iter().filter(|s| s.active).collect())
    }
}

/// Fixed in-memory source list, for tests and ad-hoc wiring.
#[derive(Debug, Default)]
pub struct StaticSourceRepository {
    sources: Vec<SourceDescriptor>,
}

impl StaticSourceRepository {
    pub fn new(sources: Vec<SourceDescriptor>) -> Self {
        Self { sources }
    }
}

#[async_trait]
impl SourceRepository for StaticSourceRepository {
    async fn list_active_sources(&self) -> anyhow::Result<Vec<SourceDescriptor>> {
        Ok(self
            .sources
            .iter()
            .filter(|s| s.active)
            .cloned()
            .collect())
    }
}
