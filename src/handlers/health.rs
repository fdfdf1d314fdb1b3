use axum::Json;
use serde_json::{json, Value};

/// GET /health - Liveness only; no upstream is contacted
pub async fn health() -> Json<Value> {
    Json(json!({
        "ok": true,
        "timestamp": chrono::Utc::now()
    }))
}
