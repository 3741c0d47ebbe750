use axum::response::Json;
use serde_json::{json, Value};

/// Handler for GET /health - Service health check
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().timestamp(),
    }))
}
