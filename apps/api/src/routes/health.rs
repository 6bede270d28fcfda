use axum::Json;
use serde_json::{json, Value};

use crate::llm_client::MODEL;
use crate::routes::FLOW_ENDPOINTS;

/// GET /health
/// Liveness only; the model provider is not contacted.
pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "internspark-api",
        "model": MODEL,
        "flows": FLOW_ENDPOINTS.len()
    }))
}
