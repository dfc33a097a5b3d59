//! Per-forecast pipelines: encode, predict, post-process.

use anyhow::{Context, Result};
use std::sync::Arc;

use super::features::{encode_demand, encode_solar, encode_wind, SOLAR_FEATURES, WIND_FEATURES};
use super::postprocess::{finish_demand, finish_solar, finish_wind, is_solar_dark_hour};
use crate::domain::{ForecastKind, InferenceWindow};
use crate::ml::models::MLModel;
use crate::ml::scaler::Scaler;
use crate::ml::ensure_finite;

/// One model together with the encoding and post-processing it was trained with.
///
/// Implementations hold no mutable state, so a pipeline may serve concurrent
/// requests from the blocking thread pool.
pub trait ForecastPipeline: Send + Sync {
    fn kind(&self) -> ForecastKind;

    fn model(&self) -> &dyn MLModel;

    /// Produce the reported value for this forecast
    fn run(&self, window: &InferenceWindow) -> Result<f64>;
}

fn check_scaler_width(scaler: &Scaler, expected: usize, name: &str) -> Result<()> {
    if scaler.n_features() != expected {
        anyhow::bail!(
            "{name} has {} features, expected {expected}",
            scaler.n_features()
        );
    }
    Ok(())
}

pub struct DemandPipeline {
    model: Arc<dyn MLModel>,
    consumption_scaler: Scaler,
}

impl DemandPipeline {
    pub fn new(model: Arc<dyn MLModel>, consumption_scaler: Scaler) -> Result<Self> {
        check_scaler_width(&consumption_scaler, 1, "consumption scaler")?;
        Ok(Self {
            model,
            consumption_scaler,
        })
    }
}

impl ForecastPipeline for DemandPipeline {
    fn kind(&self) -> ForecastKind {
        ForecastKind::Demand
    }

    fn model(&self) -> &dyn MLModel {
        self.model.as_ref()
    }

    fn run(&self, window: &InferenceWindow) -> Result<f64> {
        let features = encode_demand(window, &self.consumption_scaler)?;
        let raw = ensure_finite(self.model.predict(&features).context("demand model")?)?;
        finish_demand(raw, &self.consumption_scaler)
    }
}

pub struct WindPipeline {
    model: Arc<dyn MLModel>,
    feature_scaler: Scaler,
}

impl WindPipeline {
    pub fn new(model: Arc<dyn MLModel>, feature_scaler: Scaler) -> Result<Self> {
        check_scaler_width(&feature_scaler, WIND_FEATURES, "wind feature scaler")?;
        Ok(Self {
            model,
            feature_scaler,
        })
    }
}

impl ForecastPipeline for WindPipeline {
    fn kind(&self) -> ForecastKind {
        ForecastKind::Wind
    }

    fn model(&self) -> &dyn MLModel {
        self.model.as_ref()
    }

    fn run(&self, window: &InferenceWindow) -> Result<f64> {
        let features = encode_wind(window, &self.feature_scaler)?;
        let raw = ensure_finite(self.model.predict(&features).context("wind model")?)?;
        Ok(finish_wind(raw))
    }
}

pub struct SolarPipeline {
    model: Arc<dyn MLModel>,
    feature_scaler: Scaler,
    target_scaler: Scaler,
}

impl SolarPipeline {
    pub fn new(model: Arc<dyn MLModel>, feature_scaler: Scaler, target_scaler: Scaler) -> Result<Self> {
        check_scaler_width(&feature_scaler, SOLAR_FEATURES, "solar feature scaler")?;
        check_scaler_width(&target_scaler, 1, "solar target scaler")?;
        Ok(Self {
            model,
            feature_scaler,
            target_scaler,
        })
    }
}

impl ForecastPipeline for SolarPipeline {
    fn kind(&self) -> ForecastKind {
        ForecastKind::Solar
    }

    fn model(&self) -> &dyn MLModel {
        self.model.as_ref()
    }

    fn run(&self, window: &InferenceWindow) -> Result<f64> {
        let features = encode_solar(window, &self.feature_scaler)?;
        let raw = ensure_finite(self.model.predict(&features).context("solar model")?)?;
        let value = finish_solar(raw, &self.target_scaler)?;

        // darkness overrides whatever the model said, but only after it succeeded
        if is_solar_dark_hour(window.latest().hour) {
            return Ok(0.0);
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{TimeSeriesRecord, WINDOW_SIZE};
    use crate::ingest::build_window;
    use crate::ml::models::{DenseSequenceRegressor, LinearRegressionModel, LstmRegressor};
    use crate::ml::models::sequence::{Activation, DenseLayer};
    use crate::ml::models::lstm::LstmLayer;
    use chrono::{Duration, NaiveDate};
    use ndarray::{array, Array1, Array2};

    /// 24 hourly records ending at `last_hour`
    fn window_ending_at(last_hour: u32) -> InferenceWindow {
        let end = NaiveDate::from_ymd_opt(2025, 6, 21)
            .unwrap()
            .and_hms_opt(last_hour, 0, 0)
            .unwrap();
        let records: Vec<_> = (0..WINDOW_SIZE as i64)
            .rev()
            .map(|back| {
                let ts = end - Duration::hours(back);
                TimeSeriesRecord {
                    date: ts.date(),
                    hour: chrono::Timelike::hour(&ts),
                    consumption: 400.0,
                    holiday: false,
                    wind_speed: 7.0,
                    cloud_coverage: 20.0,
                    temperature: 18.0,
                    irradiance: 300.0,
                }
            })
            .collect();
        build_window(&records).unwrap()
    }

    fn unit_scaler(n: usize) -> Scaler {
        Scaler::Standard {
            mean: vec![0.0; n],
            scale: vec![1.0; n],
        }
    }

    fn constant_lstm(bias: f64) -> Arc<dyn MLModel> {
        let layer = LstmLayer {
            weight_ih: Array2::zeros((4, SOLAR_FEATURES)),
            weight_hh: Array2::zeros((4, 1)),
            bias: Array1::zeros(4),
        };
        Arc::new(LstmRegressor::new("solar", SOLAR_FEATURES, 1, vec![layer], array![[0.0]], bias).unwrap())
    }

    #[test]
    fn test_demand_inverse_scales_output() {
        let layer = DenseLayer::new(Array2::zeros((1, 96)), array![0.5], Activation::Linear).unwrap();
        let model = Arc::new(DenseSequenceRegressor::new("demand", 24, 4, vec![layer]).unwrap());
        let scaler = Scaler::MinMax {
            data_min: vec![0.0],
            data_max: vec![1000.0],
            feature_range: (0.0, 1.0),
        };
        let pipeline = DemandPipeline::new(model, scaler).unwrap();
        assert_eq!(pipeline.run(&window_ending_at(12)).unwrap(), 500.0);
        assert_eq!(pipeline.kind(), ForecastKind::Demand);
    }

    #[test]
    fn test_wind_divides_and_clamps() {
        let model = Arc::new(LinearRegressionModel::new("wind", vec![0.0; 5], 300.0));
        let pipeline = WindPipeline::new(model, unit_scaler(WIND_FEATURES)).unwrap();
        assert_eq!(pipeline.run(&window_ending_at(12)).unwrap(), 50.0);

        let model = Arc::new(LinearRegressionModel::new("wind", vec![0.0; 5], 5000.0));
        let pipeline = WindPipeline::new(model, unit_scaler(WIND_FEATURES)).unwrap();
        assert_eq!(pipeline.run(&window_ending_at(12)).unwrap(), 160.0);
    }

    #[test]
    fn test_solar_daylight_and_darkness() {
        let pipeline =
            SolarPipeline::new(constant_lstm(600.0), unit_scaler(SOLAR_FEATURES), unit_scaler(1)).unwrap();
        assert_eq!(pipeline.run(&window_ending_at(12)).unwrap(), 100.0);
        assert_eq!(pipeline.run(&window_ending_at(18)).unwrap(), 100.0);
        assert_eq!(pipeline.run(&window_ending_at(4)).unwrap(), 100.0);
        assert_eq!(pipeline.run(&window_ending_at(3)).unwrap(), 0.0);
        assert_eq!(pipeline.run(&window_ending_at(19)).unwrap(), 0.0);
    }

    #[test]
    fn test_model_errors_propagate() {
        // linear model with the wrong width fails at predict time
        let model = Arc::new(LinearRegressionModel::new("wind", vec![0.0; 3], 1.0));
        let pipeline = WindPipeline::new(model, unit_scaler(WIND_FEATURES)).unwrap();
        assert!(pipeline.run(&window_ending_at(12)).is_err());
    }

    #[test]
    fn test_scaler_width_checked_at_construction() {
        let model = Arc::new(LinearRegressionModel::new("wind", vec![0.0; 5], 1.0));
        assert!(WindPipeline::new(model, unit_scaler(3)).is_err());
        assert!(SolarPipeline::new(constant_lstm(0.0), unit_scaler(SOLAR_FEATURES), unit_scaler(2)).is_err());
    }
}
