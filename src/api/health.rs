use axum::{extract::State, Json};
use serde::Serialize;

use crate::{controller::AppState, ml::inference::ModelStatus};

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: &'static str,
    timestamp: chrono::DateTime<chrono::Utc>,
}

/// GET /healthz - Liveness check
pub async fn healthz() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        timestamp: chrono::Utc::now(),
    })
}

#[derive(Debug, Serialize)]
pub struct ModelsResponse {
    models: Vec<ModelStatus>,
}

/// GET /api/models - Which forecasts have a loaded model
pub async fn models(State(state): State<AppState>) -> Json<ModelsResponse> {
    Json(ModelsResponse {
        models: state.controller.model_status(),
    })
}
