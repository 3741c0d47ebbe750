pub mod plugins;
pub mod system;

pub use plugins::*;
pub use system::*;

use crate::plugin::lifecycle::LifecycleService;
use crate::plugin::registry::ModuleRegistry;
use std::sync::Arc;

/// Shared application state for handlers
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<dyn ModuleRegistry>,
    pub lifecycle: Arc<LifecycleService>,
}
