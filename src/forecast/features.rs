//! Feature engineering for forecasting models
//!
//! Each model was trained on its own layout:
//! - Demand: 24 steps of (scaled consumption, day / 6, hour / 23, holiday)
//! - Wind: the latest row as (day, month, 6-hour bucket, wind speed, cloud coverage)
//! - Solar: 24 steps of (day, month, raw hour, temperature, irradiance, cloud coverage)
//!
//! Wind buckets the hour while solar uses it raw. The two models were
//! trained that way and the asymmetry must stay.

use anyhow::{Context, Result};
use ndarray::{Array2, Axis};

use crate::domain::{InferenceWindow, TimeSeriesRecord};
use crate::ml::scaler::Scaler;
use crate::ml::FeatureTensor;

pub const DEMAND_FEATURES: usize = 4;
pub const WIND_FEATURES: usize = 5;
pub const SOLAR_FEATURES: usize = 6;

/// Day-of-month divisor used by the demand model
pub const DEMAND_DAY_DIVISOR: f64 = 6.0;
/// Hour-of-day divisor used by the demand model
pub const DEMAND_HOUR_DIVISOR: f64 = 23.0;

/// Width of the wind model's time-of-day buckets, in hours
pub const WIND_BUCKET_HOURS: u32 = 6;

/// Collapse an hour into the start of its 6-hour bucket: 0, 6, 12 or 18
pub fn wind_hour_bucket(hour: u32) -> u32 {
    (hour.min(23) / WIND_BUCKET_HOURS) * WIND_BUCKET_HOURS
}

/// (1, 24, 4) demand sequence
pub fn encode_demand(window: &InferenceWindow, consumption_scaler: &Scaler) -> Result<FeatureTensor> {
    let consumption = Array2::from_shape_vec(
        (window.len(), 1),
        window.iter().map(|r| r.consumption).collect(),
    )?;
    let scaled = consumption_scaler
        .transform(&consumption)
        .context("failed to scale consumption")?;

    let mut features = Array2::<f64>::zeros((window.len(), DEMAND_FEATURES));
    for (step, record) in window.iter().enumerate() {
        features[[step, 0]] = scaled[[step, 0]];
        features[[step, 1]] = f64::from(record.day()) / DEMAND_DAY_DIVISOR;
        features[[step, 2]] = f64::from(record.hour) / DEMAND_HOUR_DIVISOR;
        features[[step, 3]] = record.holiday_flag();
    }
    Ok(FeatureTensor::Sequence(features.insert_axis(Axis(0))))
}

/// Unscaled wind snapshot of a single record
pub fn wind_snapshot(record: &TimeSeriesRecord) -> [f64; WIND_FEATURES] {
    [
        f64::from(record.day()),
        f64::from(record.month()),
        f64::from(wind_hour_bucket(record.hour)),
        record.wind_speed,
        record.cloud_coverage,
    ]
}

/// (1, 5) wind row built from the latest record only
pub fn encode_wind(window: &InferenceWindow, feature_scaler: &Scaler) -> Result<FeatureTensor> {
    let raw = Array2::from_shape_vec((1, WIND_FEATURES), wind_snapshot(window.latest()).to_vec())?;
    let scaled = feature_scaler
        .transform(&raw)
        .context("failed to scale wind features")?;
    Ok(FeatureTensor::Tabular(scaled))
}

/// Unscaled (24, 6) solar rows
pub fn solar_rows(window: &InferenceWindow) -> Array2<f64> {
    let mut rows = Array2::<f64>::zeros((window.len(), SOLAR_FEATURES));
    for (step, record) in window.iter().enumerate() {
        rows[[step, 0]] = f64::from(record.day());
        rows[[step, 1]] = f64::from(record.month());
        rows[[step, 2]] = f64::from(record.hour);
        rows[[step, 3]] = record.temperature;
        rows[[step, 4]] = record.irradiance;
        rows[[step, 5]] = record.cloud_coverage;
    }
    rows
}

/// (1, 24, 6) solar sequence
pub fn encode_solar(window: &InferenceWindow, feature_scaler: &Scaler) -> Result<FeatureTensor> {
    let scaled = feature_scaler
        .transform(&solar_rows(window))
        .context("failed to scale solar features")?;
    Ok(FeatureTensor::Sequence(scaled.insert_axis(Axis(0))))
}
