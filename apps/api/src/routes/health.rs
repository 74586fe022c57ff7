use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /api/health
/// Reports whether the model and the job catalog are loaded.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let model_ready = state.model_ready();
    let jobs_loaded = state.jobs_loaded();
    let status = if model_ready && state.catalog.is_some() {
        "healthy"
    } else {
        "degraded"
    };

    Json(json!({
        "status": status,
        "jobs_loaded": jobs_loaded,
        "model_ready": model_ready,
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
