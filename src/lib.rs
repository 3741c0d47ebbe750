//! Modpanel - Plugin Administration Backend
//!
//! This library provides the core functionality for the modpanel backend,
//! including the plugin lifecycle service, module registry, and REST API.

pub mod api;
pub mod core;
pub mod db;
pub mod plugin;

// Re-export commonly used types
pub use crate::core::Config;
pub use api::ApiServer;
pub use db::DatabaseManager;
pub use plugin::{LifecycleService, ModuleRegistry, ModuleScanner};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Result type alias for the library
pub type Result<T> = anyhow::Result<T>;
