//! Output post-processing
//!
//! Turns raw model output into a reported value: inverse scaling, unit
//! conversion, physical clamping and the solar darkness rule.

use anyhow::Result;

use crate::ml::scaler::Scaler;

/// Wind model output is six times the reported unit
pub const WIND_UNIT_DIVISOR: f64 = 6.0;
/// Solar model output is six times the reported unit
pub const SOLAR_UNIT_DIVISOR: f64 = 6.0;

/// Installed wind capacity
pub const WIND_MAX_OUTPUT: f64 = 160.0;
/// Installed solar capacity
pub const SOLAR_MAX_OUTPUT: f64 = 340.0;

/// Solar output is forced to zero before this hour
pub const SOLAR_FIRST_HOUR: u32 = 4;
/// Solar output is forced to zero after this hour
pub const SOLAR_LAST_HOUR: u32 = 18;

/// Round half away from zero to two decimals
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Clamp into `[0, max]`
pub fn clamp_output(value: f64, max: f64) -> f64 {
    value.clamp(0.0, max)
}

pub fn is_solar_dark_hour(hour: u32) -> bool {
    hour < SOLAR_FIRST_HOUR || hour > SOLAR_LAST_HOUR
}

/// Demand: inverse consumption scaling, no clamping
pub fn finish_demand(raw: f64, consumption_scaler: &Scaler) -> Result<f64> {
    Ok(round2(consumption_scaler.inverse_scalar(raw)?))
}

pub fn finish_wind(raw: f64) -> f64 {
    round2(clamp_output(raw / WIND_UNIT_DIVISOR, WIND_MAX_OUTPUT))
}

/// Solar: inverse target scaling, unit conversion and clamping.
/// The darkness rule is applied by the caller after a successful prediction.
pub fn finish_solar(raw: f64, target_scaler: &Scaler) -> Result<f64> {
    let value = target_scaler.inverse_scalar(raw)?;
    Ok(round2(clamp_output(value / SOLAR_UNIT_DIVISOR, SOLAR_MAX_OUTPUT)))
}
