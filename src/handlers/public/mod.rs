use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::server::AppState;

/// GET / - Service information
pub async fn root() -> Json<Value> {
    Json(json!({
        "name": "Project API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "health": "/health (public)",
            "projects": "/projects/:id GET|PUT|DELETE (authenticated)",
        }
    }))
}

/// GET /health - Liveness plus a store round-trip
pub async fn health(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    state.projects.store().ping().await.map_err(|e| {
        tracing::warn!("Health check failed: {}", e);
        ApiError::service_unavailable("Database unavailable")
    })?;

    Ok(Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now(),
        "database": "ok"
    })))
}
