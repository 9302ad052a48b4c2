use crate::AppState;
use axum::{extract::State, Json};
use serde_json::{json, Value};
use std::sync::Arc;

/// GET /debug/health - Report the directions backend and cache counters
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<Value> {
    let mut status = json!({
        "status": "ok",
        "checks": {
            "directions": state.directions.backend_name(),
        }
    });

    status["checks"]["directions_cache"] = match state.directions.cache_stats() {
        Some(stats) => json!(stats),
        None => json!("disabled"),
    };

    status["checks"]["max_refinement_rounds"] = json!(state.refinement.max_rounds);

    Json(status)
}
