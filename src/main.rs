//! Modpanel - Plugin Administration Backend
//!
//! An HTTP admin backend that manages application module lifecycles:
//! discovery, enable/disable, and dependency install/uninstall.

use modpanel::{api, core, db, plugin};

use anyhow::Result;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration (handles CLI args, env vars, and config file)
    let config = match core::config::Config::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            // Print error to stderr since logging isn't initialized yet
            eprintln!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    // Initialize logging system based on configuration
    let _logger = match core::Logger::init(&config.logging) {
        Ok(logger) => logger,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            return Err(e);
        }
    };

    info!("Configuration loaded successfully");
    info!("Starting modpanel v{}", env!("CARGO_PKG_VERSION"));
    info!(
        host = %config.server.host,
        port = config.server.port,
        "Server configuration"
    );
    info!(
        path = ?config.database.path,
        "Registry database configuration"
    );
    info!(
        module_dir = ?config.modules.module_dir,
        command_bin = %config.modules.command_bin,
        "Module configuration"
    );

    // Initialize registry database
    info!("Initializing registry database...");
    let db = Arc::new(db::DatabaseManager::new(
        &config.database.path,
        config.database.connection_pool_size as u32,
        std::time::Duration::from_millis(config.database.busy_timeout),
    )?);
    info!("Running database migrations...");
    db.migrate()?;
    info!("Registry database initialized successfully");

    // Discover modules and sync them into the registry
    let repository = Arc::new(db::PluginRepository::new(db));
    let registry: Arc<dyn plugin::ModuleRegistry> =
        Arc::new(plugin::DbModuleRegistry::new(repository));

    let scanner = plugin::ModuleScanner::new(config.modules.module_dir.clone());
    let discovered = scanner.scan().await?;
    let registered = registry.sync(discovered).await?;
    if registered > 0 {
        info!("Registered {} new module(s)", registered);
    }

    // Wire the lifecycle service
    let runner = Arc::new(plugin::ProcessCommandRunner::new(
        config.modules.command_bin.clone(),
    ));
    let refresher = Arc::new(plugin::ManifestRefresher::new(
        config.modules.autoload_manifest.clone(),
    ));
    let lifecycle = Arc::new(plugin::LifecycleService::new(
        registry.clone(),
        runner,
        refresher,
    ));

    // Initialize API server
    info!("Initializing HTTP server...");
    let server_url = format!("http://{}:{}", config.server.host, config.server.port);
    let server = api::ApiServer::new(config, registry, lifecycle)?;

    info!("modpanel initialized successfully");
    info!(url = %server_url, "Server ready - starting to serve requests");

    // Start serving (this will block until shutdown signal)
    server.serve().await?;

    Ok(())
}
