//! Module manifest parsing
//!
//! Every module ships a `module.json` at its directory root describing the
//! plugin to the admin panel. Only display metadata lives here; lifecycle
//! flags belong to the registry.

use crate::core::error::{PanelError, Result};
use crate::db::models::DiscoveredPlugin;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Manifest file name expected in each module directory
pub const MANIFEST_FILE: &str = "module.json";

/// On-disk module manifest (`module.json`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleManifest {
    /// Stable unique key used by all lifecycle actions
    pub alias: String,
    /// Display name
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    /// Optional semver version
    #[serde(default)]
    pub version: Option<String>,
}

impl ModuleManifest {
    /// Parse and validate a manifest from its JSON source
    pub fn parse(source: &str) -> Result<Self> {
        let manifest: ModuleManifest = serde_json::from_str(source)
            .map_err(|e| PanelError::ManifestError(format!("invalid JSON: {}", e)))?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Load and validate a manifest from a module directory
    pub async fn load(module_dir: &Path) -> Result<Self> {
        let path = module_dir.join(MANIFEST_FILE);
        let source = tokio::fs::read_to_string(&path)
            .await
            .map_err(PanelError::IoError)?;
        Self::parse(&source)
    }

    /// Validate manifest fields
    pub fn validate(&self) -> Result<()> {
        if self.alias.trim().is_empty() {
            return Err(PanelError::ManifestError("alias cannot be empty".into()));
        }

        if self.name.trim().is_empty() {
            return Err(PanelError::ManifestError("name cannot be empty".into()));
        }

        if let Some(version) = &self.version {
            semver::Version::parse(version).map_err(|e| {
                PanelError::ManifestError(format!("invalid version '{}': {}", version, e))
            })?;
        }

        Ok(())
    }

    /// Convert into the registry-facing discovery payload
    pub fn into_discovered(self) -> DiscoveredPlugin {
        DiscoveredPlugin {
            alias: self.alias,
            name: self.name,
            description: self.description,
            author: self.author,
            version: self.version,
        }
    }
}
