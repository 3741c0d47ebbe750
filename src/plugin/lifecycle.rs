//! Plugin lifecycle service
//!
//! The authoritative state machine for a plugin's enabled/installed flags.
//! Validates aliases, serializes mutations per alias, and translates
//! operator actions into registry mutations plus command-runner and
//! autoload-refresher invocations.

use crate::core::error::{PanelError, Result};
use crate::db::models::PluginRecord;
use crate::plugin::autoload::AutoloadRefresher;
use crate::plugin::command::{CommandRunner, LifecycleCommand};
use crate::plugin::registry::ModuleRegistry;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

/// Outcome of a status change
///
/// A failed autoload refresh does not roll the flag back; the failure is
/// carried alongside the updated snapshot so the caller can report it.
#[derive(Debug)]
pub struct StatusChange {
    pub plugin: PluginRecord,
    pub refresh_error: Option<String>,
}

/// Service owning the legal lifecycle transitions
pub struct LifecycleService {
    registry: Arc<dyn ModuleRegistry>,
    runner: Arc<dyn CommandRunner>,
    refresher: Arc<dyn AutoloadRefresher>,
    /// Per-alias locks: at most one in-flight mutation per alias
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl LifecycleService {
    /// Create a lifecycle service over its collaborators
    pub fn new(
        registry: Arc<dyn ModuleRegistry>,
        runner: Arc<dyn CommandRunner>,
        refresher: Arc<dyn AutoloadRefresher>,
    ) -> Self {
        Self {
            registry,
            runner,
            refresher,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Set the enabled flag for a plugin
    ///
    /// Idempotent: writing the current value is a no-op on the flag and
    /// never an error. The autoload refresher runs exactly once per call,
    /// synchronously, after the mutation; its failure is reported in the
    /// returned `StatusChange` while the flag change is retained.
    pub async fn set_enabled(&self, alias: &str, desired: bool) -> Result<StatusChange> {
        let lock = self.alias_lock(alias).await;
        let _guard = lock.lock().await;

        if self.registry.get(alias).await?.is_none() {
            return Err(PanelError::PluginNotFound(alias.to_string()));
        }

        self.registry.set_enabled(alias, desired).await?;

        let plugin = self
            .registry
            .get(alias)
            .await?
            .ok_or_else(|| PanelError::PluginNotFound(alias.to_string()))?;

        info!(alias = %alias, enabled = desired, "Plugin status updated");

        let refresh_error = match self.refresh_autoload().await {
            Ok(()) => None,
            Err(e) => {
                // The enabled flag is the more important effect; keep it
                error!(alias = %alias, "Autoload refresh failed: {}", e);
                Some(e.to_string())
            }
        };

        Ok(StatusChange {
            plugin,
            refresh_error,
        })
    }

    /// Install a plugin's dependencies via the command runner
    ///
    /// The alias must resolve before anything is dispatched. Gating on the
    /// enabled flag is left to the listing projection; a direct call against
    /// a disabled plugin is still attempted, with a warning. The installed
    /// flag is only flipped after the command completes cleanly.
    pub async fn install(&self, alias: &str) -> Result<()> {
        let lock = self.alias_lock(alias).await;
        let _guard = lock.lock().await;

        let plugin = self
            .registry
            .get(alias)
            .await?
            .ok_or_else(|| PanelError::PluginNotFound(alias.to_string()))?;

        if !plugin.enabled {
            warn!(alias = %alias, "Installing dependencies for a disabled plugin");
        }

        self.runner.run(LifecycleCommand::Install, alias).await?;
        self.registry.set_installed(alias, true).await?;

        info!(alias = %alias, "Plugin dependencies installed");

        Ok(())
    }

    /// Uninstall a plugin's dependencies via the command runner
    pub async fn uninstall(&self, alias: &str) -> Result<()> {
        let lock = self.alias_lock(alias).await;
        let _guard = lock.lock().await;

        let plugin = self
            .registry
            .get(alias)
            .await?
            .ok_or_else(|| PanelError::PluginNotFound(alias.to_string()))?;

        if !plugin.enabled {
            warn!(alias = %alias, "Uninstalling dependencies for a disabled plugin");
        }

        self.runner.run(LifecycleCommand::Uninstall, alias).await?;
        self.registry.set_installed(alias, false).await?;

        info!(alias = %alias, "Plugin dependencies uninstalled");

        Ok(())
    }

    /// Regenerate the autoload manifest from the current enabled set
    async fn refresh_autoload(&self) -> Result<()> {
        let enabled: Vec<PluginRecord> = self
            .registry
            .all()
            .await?
            .into_iter()
            .filter(|plugin| plugin.enabled)
            .collect();

        self.refresher.refresh(&enabled).await
    }

    /// Get or create the mutation lock for an alias
    async fn alias_lock(&self, alias: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        locks
            .entry(alias.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::DiscoveredPlugin;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    struct FakeRegistry {
        plugins: std::sync::Mutex<HashMap<String, PluginRecord>>,
    }

    impl FakeRegistry {
        fn with_plugin(alias: &str, enabled: bool, installed: bool) -> Self {
            let mut plugins = HashMap::new();
            plugins.insert(
                alias.to_string(),
                PluginRecord {
                    alias: alias.to_string(),
                    name: alias.to_uppercase(),
                    description: None,
                    author: None,
                    version: None,
                    enabled,
                    installed,
                    created_at: "2026-01-01T00:00:00Z".to_string(),
                    updated_at: "2026-01-01T00:00:00Z".to_string(),
                },
            );
            Self {
                plugins: std::sync::Mutex::new(plugins),
            }
        }
    }

    #[async_trait]
    impl ModuleRegistry for FakeRegistry {
        async fn all(&self) -> Result<Vec<PluginRecord>> {
            Ok(self.plugins.lock().unwrap().values().cloned().collect())
        }

        async fn get(&self, alias: &str) -> Result<Option<PluginRecord>> {
            Ok(self.plugins.lock().unwrap().get(alias).cloned())
        }

        async fn set_enabled(&self, alias: &str, enabled: bool) -> Result<()> {
            let mut plugins = self.plugins.lock().unwrap();
            let plugin = plugins
                .get_mut(alias)
                .ok_or_else(|| PanelError::PluginNotFound(alias.to_string()))?;
            plugin.enabled = enabled;
            Ok(())
        }

        async fn set_installed(&self, alias: &str, installed: bool) -> Result<()> {
            let mut plugins = self.plugins.lock().unwrap();
            let plugin = plugins
                .get_mut(alias)
                .ok_or_else(|| PanelError::PluginNotFound(alias.to_string()))?;
            plugin.installed = installed;
            Ok(())
        }

        async fn sync(&self, _discovered: Vec<DiscoveredPlugin>) -> Result<usize> {
            Ok(0)
        }
    }

    struct RecordingRunner {
        calls: std::sync::Mutex<Vec<(LifecycleCommand, String)>>,
        fail: AtomicBool,
    }

    impl RecordingRunner {
        fn new() -> Self {
            Self {
                calls: std::sync::Mutex::new(Vec::new()),
                fail: AtomicBool::new(false),
            }
        }

        fn calls(&self) -> Vec<(LifecycleCommand, String)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CommandRunner for RecordingRunner {
        async fn run(&self, command: LifecycleCommand, alias: &str) -> Result<()> {
            self.calls
                .lock()
                .unwrap()
                .push((command, alias.to_string()));
            if self.fail.load(Ordering::SeqCst) {
                return Err(PanelError::CommandFailed("simulated failure".into()));
            }
            Ok(())
        }
    }

    struct CountingRefresher {
        refreshes: AtomicUsize,
        fail: AtomicBool,
        last_enabled: std::sync::Mutex<Vec<String>>,
    }

    impl CountingRefresher {
        fn new() -> Self {
            Self {
                refreshes: AtomicUsize::new(0),
                fail: AtomicBool::new(false),
                last_enabled: std::sync::Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl AutoloadRefresher for CountingRefresher {
        async fn refresh(&self, enabled: &[PluginRecord]) -> Result<()> {
            self.refreshes.fetch_add(1, Ordering::SeqCst);
            *self.last_enabled.lock().unwrap() =
                enabled.iter().map(|p| p.alias.clone()).collect();
            if self.fail.load(Ordering::SeqCst) {
                return Err(PanelError::RefreshFailed("simulated failure".into()));
            }
            Ok(())
        }
    }

    struct Harness {
        registry: Arc<FakeRegistry>,
        runner: Arc<RecordingRunner>,
        refresher: Arc<CountingRefresher>,
        service: LifecycleService,
    }

    fn harness(alias: &str, enabled: bool, installed: bool) -> Harness {
        let registry = Arc::new(FakeRegistry::with_plugin(alias, enabled, installed));
        let runner = Arc::new(RecordingRunner::new());
        let refresher = Arc::new(CountingRefresher::new());
        let service = LifecycleService::new(
            registry.clone(),
            runner.clone(),
            refresher.clone(),
        );
        Harness {
            registry,
            runner,
            refresher,
            service,
        }
    }

    #[tokio::test]
    async fn test_set_enabled_updates_flag_and_refreshes_once() {
        let h = harness("seo", false, false);

        let change = h.service.set_enabled("seo", true).await.unwrap();

        assert!(change.plugin.enabled);
        assert!(change.refresh_error.is_none());
        assert_eq!(h.refresher.refreshes.load(Ordering::SeqCst), 1);
        assert_eq!(
            *h.refresher.last_enabled.lock().unwrap(),
            vec!["seo".to_string()]
        );
    }

    #[tokio::test]
    async fn test_set_enabled_is_idempotent() {
        let h = harness("seo", false, false);

        h.service.set_enabled("seo", true).await.unwrap();
        let second = h.service.set_enabled("seo", true).await.unwrap();

        assert!(second.plugin.enabled);
        // The refresher still runs once per call
        assert_eq!(h.refresher.refreshes.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_set_enabled_unknown_alias() {
        let h = harness("seo", false, false);

        let result = h.service.set_enabled("ghost", true).await;

        assert!(matches!(result, Err(PanelError::PluginNotFound(_))));
        assert_eq!(h.refresher.refreshes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_refresh_failure_retains_flag() {
        let h = harness("seo", false, false);
        h.refresher.fail.store(true, Ordering::SeqCst);

        let change = h.service.set_enabled("seo", true).await.unwrap();

        assert!(change.plugin.enabled);
        assert!(change.refresh_error.is_some());
        let record = h.registry.get("seo").await.unwrap().unwrap();
        assert!(record.enabled);
    }

    #[tokio::test]
    async fn test_disable_keeps_installed_flag() {
        let h = harness("seo", true, true);

        let change = h.service.set_enabled("seo", false).await.unwrap();

        assert!(!change.plugin.enabled);
        assert!(change.plugin.installed);
    }

    #[tokio::test]
    async fn test_install_runs_command_and_sets_flag() {
        let h = harness("seo", true, false);

        h.service.install("seo").await.unwrap();

        assert_eq!(
            h.runner.calls(),
            vec![(LifecycleCommand::Install, "seo".to_string())]
        );
        let record = h.registry.get("seo").await.unwrap().unwrap();
        assert!(record.installed);
    }

    #[tokio::test]
    async fn test_install_unknown_alias_never_dispatches() {
        let h = harness("seo", true, false);

        let result = h.service.install("ghost").await;

        assert!(matches!(result, Err(PanelError::PluginNotFound(_))));
        assert!(h.runner.calls().is_empty());
    }

    #[tokio::test]
    async fn test_install_failure_leaves_flag_untouched() {
        let h = harness("seo", true, false);
        h.runner.fail.store(true, Ordering::SeqCst);

        let result = h.service.install("seo").await;

        assert!(matches!(result, Err(PanelError::CommandFailed(_))));
        let record = h.registry.get("seo").await.unwrap().unwrap();
        assert!(!record.installed);
    }

    #[tokio::test]
    async fn test_install_disabled_plugin_is_still_attempted() {
        // Gating lives in the listing projection; the service stays permissive
        let h = harness("seo", false, false);

        h.service.install("seo").await.unwrap();

        assert_eq!(h.runner.calls().len(), 1);
        let record = h.registry.get("seo").await.unwrap().unwrap();
        assert!(record.installed);
    }

    #[tokio::test]
    async fn test_uninstall_clears_flag() {
        let h = harness("seo", true, true);

        h.service.uninstall("seo").await.unwrap();

        assert_eq!(
            h.runner.calls(),
            vec![(LifecycleCommand::Uninstall, "seo".to_string())]
        );
        let record = h.registry.get("seo").await.unwrap().unwrap();
        assert!(!record.installed);
    }

    #[tokio::test]
    async fn test_uninstall_unknown_alias_never_dispatches() {
        let h = harness("seo", true, true);

        let result = h.service.uninstall("ghost").await;

        assert!(matches!(result, Err(PanelError::PluginNotFound(_))));
        assert!(h.runner.calls().is_empty());
    }

    #[tokio::test]
    async fn test_mutations_on_same_alias_are_serialized() {
        let h = harness("seo", false, false);
        let service = Arc::new(h.service);

        let mut handles = Vec::new();
        for i in 0..8 {
            let service = service.clone();
            handles.push(tokio::spawn(async move {
                service.set_enabled("seo", i % 2 == 0).await
            }));
        }

        for handle in handles {
            assert!(handle.await.unwrap().is_ok());
        }

        // One refresh per call, none lost to interleaving
        assert_eq!(h.refresher.refreshes.load(Ordering::SeqCst), 8);
    }
}
