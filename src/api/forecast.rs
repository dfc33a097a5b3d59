use axum::{
    extract::{rejection::JsonRejection, Multipart, State},
    Json,
};
use serde::Serialize;
use serde_json::Value;

use crate::{
    api::error::ApiError,
    controller::AppState,
    domain::{PredictionResult, UploadSummary},
    ingest::RawTable,
};

/// Multipart field carrying the uploaded CSV
pub const UPLOAD_FIELD: &str = "file";

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    ok: bool,
    #[serde(flatten)]
    summary: UploadSummary,
}

#[derive(Debug, Serialize)]
pub struct AckResponse {
    ok: bool,
}

/// POST /api/upload_csv - Replace the dataset with an uploaded CSV
pub async fn upload_csv(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut bytes = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart body: {e}")))?
    {
        if field.name() == Some(UPLOAD_FIELD) {
            let data = field
                .bytes()
                .await
                .map_err(|e| ApiError::BadRequest(format!("Failed to read upload: {e}")))?;
            bytes = Some(data);
            break;
        }
    }
    let bytes = bytes.ok_or_else(|| ApiError::BadRequest("No file uploaded".to_string()))?;

    let table = RawTable::from_csv_bytes(&bytes)?;
    let summary = state.controller.validate_and_store(table).await?;
    Ok(Json(UploadResponse { ok: true, summary }))
}

/// POST /api/tick - Append one observation
pub async fn tick(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<AckResponse>, ApiError> {
    let Json(payload) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    state.controller.append_tick(&payload).await?;
    Ok(Json(AckResponse { ok: true }))
}

/// POST /api/predict - Forecast demand, wind and solar from the stored dataset
pub async fn predict(State(state): State<AppState>) -> Result<Json<PredictionResult>, ApiError> {
    Ok(Json(state.controller.predict().await?))
}
