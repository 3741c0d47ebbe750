use crate::api::models::{
    ActionResponse, ListingQuery, ListingResponse, ModuleRow, StatusChangeResponse,
};
use crate::core::error::Result;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use super::AppState;

/// Handler for GET /plugins - Full plugin listing
pub async fn list_plugins(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let records = state.registry.all().await?;

    let data: Vec<ModuleRow> = records.iter().map(ModuleRow::from_record).collect();
    let total = data.len();

    Ok(Json(ListingResponse {
        draw: 0,
        records_total: total,
        records_filtered: total,
        data,
    }))
}

/// Handler for POST /plugins - Data-table listing with paging and search
pub async fn plugins_listing(
    State(state): State<AppState>,
    query: Option<Json<ListingQuery>>,
) -> Result<impl IntoResponse> {
    let query = query.map(|Json(query)| query).unwrap_or_default();

    let records = state.registry.all().await?;
    let records_total = records.len();

    let needle = query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase);

    let filtered: Vec<_> = records
        .iter()
        .filter(|record| match &needle {
            Some(needle) => {
                record.alias.to_lowercase().contains(needle)
                    || record.name.to_lowercase().contains(needle)
                    || record
                        .description
                        .as_deref()
                        .map(|d| d.to_lowercase().contains(needle))
                        .unwrap_or(false)
            }
            None => true,
        })
        .collect();
    let records_filtered = filtered.len();

    let start = query.start.unwrap_or(0);
    let data: Vec<ModuleRow> = filtered
        .into_iter()
        .skip(start)
        .take(query.length.unwrap_or(usize::MAX))
        .map(|record| ModuleRow::from_record(record))
        .collect();

    Ok(Json(ListingResponse {
        draw: query.draw.unwrap_or(0),
        records_total,
        records_filtered,
        data,
    }))
}

/// Handler for POST /plugins/:module/status/:status - Enable or disable a plugin
///
/// Any non-zero status means enable. The updated row is returned; a failed
/// autoload refresh is reported without reverting the flag change.
pub async fn change_plugin_status(
    State(state): State<AppState>,
    Path((module, status)): Path<(String, i64)>,
) -> Result<impl IntoResponse> {
    let desired = status != 0;

    let change = state.lifecycle.set_enabled(&module, desired).await?;

    let row = ModuleRow::from_record(&change.plugin);

    let response = match change.refresh_error {
        Some(refresh_error) => StatusChangeResponse {
            message: format!(
                "{} plugin, but autoload refresh failed: {}",
                if desired { "Enabled" } else { "Disabled" },
                refresh_error
            ),
            error: true,
            data: row,
        },
        None => StatusChangeResponse {
            message: if desired {
                "Enabled plugin".to_string()
            } else {
                "Disabled plugin".to_string()
            },
            error: false,
            data: row,
        },
    };

    Ok(Json(response))
}

/// Handler for POST /plugins/:alias/install - Install plugin dependencies
pub async fn install_plugin(
    State(state): State<AppState>,
    Path(alias): Path<String>,
) -> Result<impl IntoResponse> {
    state.lifecycle.install(&alias).await?;

    Ok(Json(ActionResponse::ok("Installed plugin dependencies")))
}

/// Handler for POST /plugins/:alias/uninstall - Uninstall plugin dependencies
pub async fn uninstall_plugin(
    State(state): State<AppState>,
    Path(alias): Path<String>,
) -> Result<impl IntoResponse> {
    state.lifecycle.uninstall(&alias).await?;

    Ok(Json(ActionResponse::ok("Uninstalled plugin dependencies")))
}
