//! API routes

use crate::api::handlers::{
    change_plugin_status, health_check, install_plugin, list_plugins, plugins_listing,
    uninstall_plugin, AppState,
};
use axum::{
    routing::{get, post},
    Router,
};

/// Build the API routes
pub fn build_api_routes(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_check))
        // Plugin listing: page data via GET, table payload via POST
        .route("/plugins", get(list_plugins).post(plugins_listing))
        // Plugin lifecycle actions
        .route("/plugins/:module/status/:status", post(change_plugin_status))
        .route("/plugins/:alias/install", post(install_plugin))
        .route("/plugins/:alias/uninstall", post(uninstall_plugin))
        .with_state(state)
}
