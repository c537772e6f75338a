use axum::Json;
use serde_json::{json, Value};

/// Liveness check (GET /healthz).
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
