use anyhow::Result;
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

use crate::config::Config;
use crate::domain::{ForecastError, PredictionResult, UploadSummary};
use crate::forecast::ForecastEngine;
use crate::ingest::{build_window, record_from_json, validate, RawTable};
use crate::ml::inference::{ModelRegistry, ModelStatus};
use crate::repo::{CsvDatasetStore, DatasetStore};

#[derive(Clone)]
pub struct AppState {
    pub cfg: Config,
    pub controller: Arc<ForecastController>,
}

impl AppState {
    pub fn new(cfg: Config) -> Result<Self> {
        let registry = Arc::new(ModelRegistry::load(&cfg.models));
        let store: Arc<dyn DatasetStore> = Arc::new(CsvDatasetStore::new(cfg.store.data_csv.clone()));
        let controller = Arc::new(ForecastController::new(store, ForecastEngine::new(registry)));
        Ok(Self { cfg, controller })
    }

    /// State with an explicit store and registry
    pub fn with_parts(cfg: Config, store: Arc<dyn DatasetStore>, registry: Arc<ModelRegistry>) -> Self {
        let controller = Arc::new(ForecastController::new(store, ForecastEngine::new(registry)));
        Self { cfg, controller }
    }
}

/// Entry point for uploads, ticks and predictions
pub struct ForecastController {
    store: Arc<dyn DatasetStore>,
    engine: ForecastEngine,
}

impl ForecastController {
    pub fn new(store: Arc<dyn DatasetStore>, engine: ForecastEngine) -> Self {
        Self { store, engine }
    }

    /// Validate an uploaded table and replace the stored dataset with it.
    /// The store is untouched when validation fails.
    pub async fn validate_and_store(&self, table: RawTable) -> Result<UploadSummary, ForecastError> {
        let records = validate(&table)?;
        // summary describes the last row as uploaded, not the latest timestamp
        let last = records.last().ok_or(ForecastError::InsufficientData {
            required: crate::domain::WINDOW_SIZE,
            actual: 0,
        })?;
        let summary = UploadSummary {
            last_date: last.date,
            last_time: last.hour,
            rows: records.len(),
        };

        self.store.overwrite(records).await?;
        info!(
            rows = summary.rows,
            last_date = %summary.last_date,
            last_time = summary.last_time,
            "Dataset uploaded"
        );
        Ok(summary)
    }

    /// Append one observation to the stored dataset
    pub async fn append_tick(&self, payload: &Value) -> Result<(), ForecastError> {
        let record = record_from_json(payload)?;
        let (date, hour) = (record.date, record.hour);
        self.store.append(record).await?;
        info!(%date, hour, "Tick appended");
        Ok(())
    }

    /// Forecast from the most recent 24 stored observations
    pub async fn predict(&self) -> Result<PredictionResult, ForecastError> {
        let dataset = self.store.load().await?;
        let window = build_window(&dataset)?;
        let latest = window.latest().timestamp();
        let result = self.engine.predict(window).await;
        info!(
            %latest,
            demand = result.demand_forecast,
            wind = result.wind_gen,
            solar = result.solar_gen,
            "Prediction complete"
        );
        Ok(result)
    }

    pub fn model_status(&self) -> Vec<ModelStatus> {
        self.engine.registry().status()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repo::MemoryDatasetStore;
    use serde_json::json;

    fn controller() -> (ForecastController, Arc<MemoryDatasetStore>) {
        let store = Arc::new(MemoryDatasetStore::new());
        let engine = ForecastEngine::new(Arc::new(ModelRegistry::empty()));
        (ForecastController::new(store.clone(), engine), store)
    }

    fn table(rows: usize) -> RawTable {
        let headers = ["Date", " Time ", "consumption", "holiday", "wind_speed", "cloud_coverage", "temperature", "irradiance"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let rows = (0..rows)
            .map(|i| {
                let day = 1 + i / 24;
                vec![
                    format!("{day:02}092025"),
                    (i % 24).to_string(),
                    "300".into(),
                    "0".into(),
                    "5".into(),
                    "10".into(),
                    "20".into(),
                    "100".into(),
                ]
            })
            .collect();
        RawTable::new(headers, rows)
    }

    #[tokio::test]
    async fn test_upload_summary_reports_last_row() {
        let (controller, store) = controller();
        let summary = controller.validate_and_store(table(30)).await.unwrap();

        assert_eq!(summary.rows, 30);
        assert_eq!(summary.last_date, chrono::NaiveDate::from_ymd_opt(2025, 9, 2).unwrap());
        assert_eq!(summary.last_time, 5);
        assert_eq!(store.load().await.unwrap().len(), 30);
    }

    #[tokio::test]
    async fn test_rejected_upload_leaves_store_untouched() {
        let (controller, store) = controller();
        controller.validate_and_store(table(24)).await.unwrap();

        let mut bad = table(24);
        bad.headers.pop();
        assert!(matches!(
            controller.validate_and_store(bad).await,
            Err(ForecastError::Schema(_))
        ));
        assert!(matches!(
            controller.validate_and_store(table(10)).await,
            Err(ForecastError::InsufficientData { actual: 10, .. })
        ));
        assert_eq!(store.load().await.unwrap().len(), 24);
    }

    #[tokio::test]
    async fn test_tick_then_predict_without_models() {
        let (controller, _) = controller();
        controller.validate_and_store(table(24)).await.unwrap();
        controller
            .append_tick(&json!({
                "date": "02092025", "time": 0, "consumption": 310.0, "holiday": 0,
                "wind_speed": 4.5, "cloud_coverage": 15, "temperature": 19, "irradiance": 0
            }))
            .await
            .unwrap();

        let result = controller.predict().await.unwrap();
        assert_eq!(result.demand_forecast, 0.0);
        assert!(result.demand_error.is_none());
    }

    #[tokio::test]
    async fn test_tick_missing_field() {
        let (controller, _) = controller();
        let err = controller
            .append_tick(&json!({"date": "01092025", "time": 1}))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Missing fields in tick payload"));
    }

    #[tokio::test]
    async fn test_predict_without_data() {
        let (controller, _) = controller();
        assert!(matches!(controller.predict().await, Err(ForecastError::StoreUnavailable)));
    }

    #[tokio::test]
    async fn test_predict_with_too_few_rows() {
        let (controller, store) = controller();
        store.overwrite(validate(&table(24)).unwrap()[..10].to_vec()).await.unwrap();
        assert!(matches!(
            controller.predict().await,
            Err(ForecastError::InsufficientData { actual: 10, .. })
        ));
    }
}
