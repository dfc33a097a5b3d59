//! ML Model Inference Registry
//!
//! Models and their scalers are loaded once at startup. A forecast whose
//! model or scaler fails to load is disabled for the process lifetime and
//! reported as unavailable; there is no retry.

use anyhow::{Context, Result};
use serde::Serialize;
use std::sync::Arc;
use strum::IntoEnumIterator;
use tracing::{error, info};

use super::models::{DenseSequenceRegressor, LinearRegressionModel, LstmRegressor, MLModel};
use super::scaler::Scaler;
use super::ModelType;
use crate::config::{
    DemandModelConfig, ModelsConfig, SolarModelConfig, TabularFormat, WindModelConfig,
};
use crate::domain::{ForecastError, ForecastKind};
use crate::forecast::features::WIND_FEATURES;
use crate::forecast::pipeline::{DemandPipeline, ForecastPipeline, SolarPipeline, WindPipeline};

/// Availability of one forecast, as reported by `GET /api/models`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelStatus {
    pub kind: ForecastKind,
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_type: Option<ModelType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_id: Option<String>,
}

/// Read-only set of loaded forecast pipelines, one slot per kind
#[derive(Default)]
pub struct ModelRegistry {
    demand: Option<Arc<dyn ForecastPipeline>>,
    wind: Option<Arc<dyn ForecastPipeline>>,
    solar: Option<Arc<dyn ForecastPipeline>>,
}

impl ModelRegistry {
    /// Registry with every forecast unavailable
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load all configured models. Individual failures are logged and leave
    /// that forecast unavailable.
    pub fn load(cfg: &ModelsConfig) -> Self {
        let mut registry = Self::empty();
        for kind in ForecastKind::iter() {
            let loaded = match kind {
                ForecastKind::Demand => load_demand(&cfg.demand),
                ForecastKind::Wind => load_wind(&cfg.wind),
                ForecastKind::Solar => load_solar(&cfg.solar),
            };
            match loaded {
                Ok(pipeline) => {
                    let meta = pipeline.model().metadata();
                    info!(
                        kind = %kind,
                        model_id = %meta.model_id,
                        model_type = ?meta.model_type,
                        "Model loaded"
                    );
                    registry = registry.with_pipeline(pipeline);
                }
                Err(e) => {
                    error!(kind = %kind, error = ?e, "Failed to load model, forecast disabled");
                }
            }
        }
        registry
    }

    /// Install a pipeline into the slot of its kind
    pub fn with_pipeline(mut self, pipeline: Arc<dyn ForecastPipeline>) -> Self {
        let slot = match pipeline.kind() {
            ForecastKind::Demand => &mut self.demand,
            ForecastKind::Wind => &mut self.wind,
            ForecastKind::Solar => &mut self.solar,
        };
        *slot = Some(pipeline);
        self
    }

    pub fn pipeline(&self, kind: ForecastKind) -> Result<Arc<dyn ForecastPipeline>, ForecastError> {
        let slot = match kind {
            ForecastKind::Demand => &self.demand,
            ForecastKind::Wind => &self.wind,
            ForecastKind::Solar => &self.solar,
        };
        slot.clone().ok_or(ForecastError::ModelUnavailable(kind))
    }

    pub fn is_available(&self, kind: ForecastKind) -> bool {
        self.pipeline(kind).is_ok()
    }

    pub fn status(&self) -> Vec<ModelStatus> {
        ForecastKind::iter()
            .map(|kind| match self.pipeline(kind) {
                Ok(pipeline) => {
                    let meta = pipeline.model().metadata();
                    ModelStatus {
                        kind,
                        available: true,
                        model_type: Some(meta.model_type),
                        model_id: Some(meta.model_id.clone()),
                    }
                }
                Err(_) => ModelStatus {
                    kind,
                    available: false,
                    model_type: None,
                    model_id: None,
                },
            })
            .collect()
    }
}

fn load_demand(cfg: &DemandModelConfig) -> Result<Arc<dyn ForecastPipeline>> {
    let model = DenseSequenceRegressor::load(&cfg.model)?;
    let scaler = Scaler::load(&cfg.scaler)?;
    let pipeline = DemandPipeline::new(Arc::new(model), scaler).context("demand pipeline")?;
    Ok(Arc::new(pipeline))
}

fn load_wind(cfg: &WindModelConfig) -> Result<Arc<dyn ForecastPipeline>> {
    let model = load_tabular(cfg)?;
    let scaler = Scaler::load(&cfg.scaler)?;
    let pipeline = WindPipeline::new(model, scaler).context("wind pipeline")?;
    Ok(Arc::new(pipeline))
}

fn load_tabular(cfg: &WindModelConfig) -> Result<Arc<dyn MLModel>> {
    match cfg.format {
        TabularFormat::Linear => Ok(Arc::new(LinearRegressionModel::load(&cfg.model)?)),
        #[cfg(feature = "ml")]
        TabularFormat::RandomForest => Ok(Arc::new(super::smartcore::SmartcoreRandomForest::load(
            &cfg.model,
            WIND_FEATURES,
        )?)),
        #[cfg(not(feature = "ml"))]
        TabularFormat::RandomForest => {
            anyhow::bail!("random forest models require the `ml` feature")
        }
    }
}

fn load_solar(cfg: &SolarModelConfig) -> Result<Arc<dyn ForecastPipeline>> {
    let model = LstmRegressor::load(&cfg.model)?;
    let feature_scaler = Scaler::load(&cfg.feature_scaler)?;
    let target_scaler = Scaler::load(&cfg.target_scaler)?;
    let pipeline =
        SolarPipeline::new(Arc::new(model), feature_scaler, target_scaler).context("solar pipeline")?;
    Ok(Arc::new(pipeline))
}
