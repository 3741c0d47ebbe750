//! Autoload manifest refresh
//!
//! The host application loads its modules from a generated autoload manifest.
//! Every status change regenerates that manifest so the next boot of the host
//! picks up the new enabled set. Regeneration is process-wide: the manifest
//! always reflects the full enabled set, not a delta.

use crate::core::error::{PanelError, Result};
use crate::db::models::PluginRecord;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::info;

/// Regenerates the host application's module autoload state
#[async_trait]
pub trait AutoloadRefresher: Send + Sync {
    /// Rewrite the autoload state from the current enabled set
    async fn refresh(&self, enabled: &[PluginRecord]) -> Result<()>;
}

/// One entry per enabled module in the autoload manifest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutoloadEntry {
    pub alias: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// Serialized autoload manifest
#[derive(Debug, Serialize, Deserialize)]
pub struct AutoloadManifest {
    pub generated_at: String,
    pub modules: Vec<AutoloadEntry>,
}

/// Refresher that writes the autoload manifest as a JSON file
pub struct ManifestRefresher {
    manifest_path: PathBuf,
}

impl ManifestRefresher {
    /// Create a refresher targeting the given manifest path
    pub fn new(manifest_path: impl Into<PathBuf>) -> Self {
        Self {
            manifest_path: manifest_path.into(),
        }
    }
}

#[async_trait]
impl AutoloadRefresher for ManifestRefresher {
    async fn refresh(&self, enabled: &[PluginRecord]) -> Result<()> {
        let manifest = AutoloadManifest {
            generated_at: chrono::Utc::now().to_rfc3339(),
            modules: enabled
                .iter()
                .map(|record| AutoloadEntry {
                    alias: record.alias.clone(),
                    version: record.version.clone(),
                })
                .collect(),
        };

        let contents = serde_json::to_vec_pretty(&manifest)
            .map_err(|e| PanelError::SerializationError(e.to_string()))?;

        if let Some(parent) = self.manifest_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(PanelError::IoError)?;
        }

        // Write-then-rename so the host never reads a half-written manifest
        let tmp_path = self.manifest_path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, &contents)
            .await
            .map_err(PanelError::IoError)?;
        tokio::fs::rename(&tmp_path, &self.manifest_path)
            .await
            .map_err(PanelError::IoError)?;

        info!(
            manifest = %self.manifest_path.display(),
            modules = manifest.modules.len(),
            "Autoload manifest regenerated"
        );

        Ok(())
    }
}
