//! Plugin lifecycle module
//!
//! This module provides the plugin management implementation including:
//! - Module manifest parsing and filesystem discovery
//! - Module registry for tracking plugins and their lifecycle flags
//! - Lifecycle service owning the legal state transitions
//! - Listing projection mapping plugin state to available actions
//! - External command runner for install/uninstall dispatch
//! - Autoload manifest regeneration

pub mod actions;
pub mod autoload;
pub mod command;
pub mod discovery;
pub mod lifecycle;
pub mod manifest;
pub mod registry;

pub use actions::{available_actions, ActionKind, ModuleAction};
pub use autoload::{AutoloadManifest, AutoloadRefresher, ManifestRefresher};
pub use command::{CommandRunner, LifecycleCommand, ProcessCommandRunner};
pub use discovery::ModuleScanner;
pub use lifecycle::{LifecycleService, StatusChange};
pub use manifest::{ModuleManifest, MANIFEST_FILE};
pub use registry::{DbModuleRegistry, ModuleRegistry};
