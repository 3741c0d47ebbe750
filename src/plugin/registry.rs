//! Module registry
//!
//! The registry is the source of truth for discovered plugins and their
//! enabled/installed flags. It is an explicit interface injected into the
//! lifecycle service rather than ambient global state, so the service can be
//! exercised against a fake in tests.

use crate::core::error::Result;
use crate::db::models::{DiscoveredPlugin, PluginRecord};
use crate::db::repository::PluginRepository;
use async_trait::async_trait;
use std::sync::Arc;

/// Authoritative store of plugin metadata and lifecycle flags
#[async_trait]
pub trait ModuleRegistry: Send + Sync {
    /// All registered plugins, in stable listing order
    async fn all(&self) -> Result<Vec<PluginRecord>>;

    /// Look up a single plugin by alias
    async fn get(&self, alias: &str) -> Result<Option<PluginRecord>>;

    /// Set the enabled flag; idempotent for an unchanged value
    async fn set_enabled(&self, alias: &str, enabled: bool) -> Result<()>;

    /// Set the installed flag
    async fn set_installed(&self, alias: &str, installed: bool) -> Result<()>;

    /// Upsert discovered plugins, preserving flags of known aliases
    ///
    /// Returns the number of newly registered plugins.
    async fn sync(&self, discovered: Vec<DiscoveredPlugin>) -> Result<usize>;
}

/// Database-backed registry implementation
pub struct DbModuleRegistry {
    repository: Arc<PluginRepository>,
}

impl DbModuleRegistry {
    /// Create a registry over the given repository
    pub fn new(repository: Arc<PluginRepository>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl ModuleRegistry for DbModuleRegistry {
    async fn all(&self) -> Result<Vec<PluginRecord>> {
        self.repository.find_all().await
    }

    async fn get(&self, alias: &str) -> Result<Option<PluginRecord>> {
        self.repository.find_by_alias(alias).await
    }

    async fn set_enabled(&self, alias: &str, enabled: bool) -> Result<()> {
        self.repository.set_enabled(alias, enabled).await
    }

    async fn set_installed(&self, alias: &str, installed: bool) -> Result<()> {
        self.repository.set_installed(alias, installed).await
    }

    async fn sync(&self, discovered: Vec<DiscoveredPlugin>) -> Result<usize> {
        self.repository.sync(discovered).await
    }
}
