//! Module discovery
//!
//! Scans the module directory for subdirectories carrying a `module.json`
//! manifest. Invalid manifests are logged and skipped so one broken module
//! cannot hide the rest.

use crate::core::error::{PanelError, Result};
use crate::db::models::DiscoveredPlugin;
use crate::plugin::manifest::{ModuleManifest, MANIFEST_FILE};
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// Filesystem scanner for module manifests
pub struct ModuleScanner {
    module_dir: PathBuf,
}

impl ModuleScanner {
    /// Create a scanner rooted at the given module directory
    pub fn new(module_dir: impl Into<PathBuf>) -> Self {
        Self {
            module_dir: module_dir.into(),
        }
    }

    /// Discover all modules under the module directory
    ///
    /// The directory is created if it does not exist yet, so a fresh
    /// deployment starts with an empty registry instead of an error.
    pub async fn scan(&self) -> Result<Vec<DiscoveredPlugin>> {
        info!("Discovering modules in {}", self.module_dir.display());

        if !self.module_dir.exists() {
            tokio::fs::create_dir_all(&self.module_dir)
                .await
                .map_err(PanelError::IoError)?;
        }

        let mut discovered = Vec::new();

        let mut read_dir = tokio::fs::read_dir(&self.module_dir)
            .await
            .map_err(PanelError::IoError)?;

        while let Some(entry) = read_dir.next_entry().await.map_err(PanelError::IoError)? {
            let path = entry.path();
            if !path.is_dir() || !path.join(MANIFEST_FILE).exists() {
                continue;
            }

            match ModuleManifest::load(&path).await {
                Ok(manifest) => {
                    discovered.push(manifest.into_discovered());
                }
                Err(e) => {
                    error!("Failed to load module manifest from {}: {}", path.display(), e);
                }
            }
        }

        info!("Discovered {} module(s)", discovered.len());

        Ok(discovered)
    }

    /// The directory this scanner reads from
    pub fn module_dir(&self) -> &Path {
        &self.module_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn write_module(root: &Path, dir: &str, manifest: &str) {
        let module_dir = root.join(dir);
        tokio::fs::create_dir_all(&module_dir).await.unwrap();
        tokio::fs::write(module_dir.join(MANIFEST_FILE), manifest)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_scan_empty_directory() {
        let dir = TempDir::new().unwrap();
        let scanner = ModuleScanner::new(dir.path());

        let discovered = scanner.scan().await.unwrap();
        assert!(discovered.is_empty());
    }

    #[tokio::test]
    async fn test_scan_creates_missing_directory() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("modules");
        let scanner = ModuleScanner::new(&missing);

        let discovered = scanner.scan().await.unwrap();
        assert!(discovered.is_empty());
        assert!(missing.is_dir());
    }

    #[tokio::test]
    async fn test_scan_finds_manifests() {
        let dir = TempDir::new().unwrap();
        write_module(
            dir.path(),
            "seo",
            r#"{"alias": "seo", "name": "SEO", "version": "1.0.0"}"#,
        )
        .await;
        write_module(dir.path(), "blog", r#"{"alias": "blog", "name": "Blog"}"#).await;
        // A stray file at the top level is not a module
        tokio::fs::write(dir.path().join("README.md"), "not a module")
            .await
            .unwrap();

        let scanner = ModuleScanner::new(dir.path());
        let mut discovered = scanner.scan().await.unwrap();
        discovered.sort_by(|a, b| a.alias.cmp(&b.alias));

        let aliases: Vec<_> = discovered.iter().map(|d| d.alias.as_str()).collect();
        assert_eq!(aliases, vec!["blog", "seo"]);
    }

    #[tokio::test]
    async fn test_scan_skips_invalid_manifest() {
        let dir = TempDir::new().unwrap();
        write_module(dir.path(), "seo", r#"{"alias": "seo", "name": "SEO"}"#).await;
        write_module(dir.path(), "broken", r#"{"name": "No alias"}"#).await;
        write_module(
            dir.path(),
            "bad-version",
            r#"{"alias": "bad", "name": "Bad", "version": "not-semver"}"#,
        )
        .await;

        let scanner = ModuleScanner::new(dir.path());
        let discovered = scanner.scan().await.unwrap();

        assert_eq!(discovered.len(), 1);
        assert_eq!(discovered[0].alias, "seo");
    }

    #[tokio::test]
    async fn test_scan_skips_directories_without_manifest() {
        let dir = TempDir::new().unwrap();
        tokio::fs::create_dir_all(dir.path().join("empty"))
            .await
            .unwrap();

        let scanner = ModuleScanner::new(dir.path());
        let discovered = scanner.scan().await.unwrap();
        assert!(discovered.is_empty());
    }
}
