use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// The three independently modelled forecasts
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ForecastKind {
    Demand,
    Wind,
    Solar,
}

/// Outcome of a single forecast pipeline
#[derive(Debug, Clone, PartialEq)]
pub enum ForecastOutcome {
    /// Post-processed forecast value
    Value(f64),
    /// Inference failed at request time
    Failed(String),
    /// The model was not loaded at startup
    Unavailable,
}

impl ForecastOutcome {
    pub fn value(&self) -> Option<f64> {
        match self {
            Self::Value(v) => Some(*v),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed(message) => Some(message),
            _ => None,
        }
    }
}

/// Merged forecasts returned by a prediction request.
///
/// Every forecast key is always present and defaults to `0.0`. An error key
/// appears only when inference failed for a loaded model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub demand_forecast: f64,
    pub wind_gen: f64,
    pub solar_gen: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub demand_error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wind_error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solar_error: Option<String>,
}

impl PredictionResult {
    pub fn from_outcomes(
        demand: ForecastOutcome,
        wind: ForecastOutcome,
        solar: ForecastOutcome,
    ) -> Self {
        Self {
            demand_forecast: demand.value().unwrap_or(0.0),
            wind_gen: wind.value().unwrap_or(0.0),
            solar_gen: solar.value().unwrap_or(0.0),
            demand_error: demand.error().map(str::to_owned),
            wind_error: wind.error().map(str::to_owned),
            solar_error: solar.error().map(str::to_owned),
        }
    }

    pub fn error(&self, kind: ForecastKind) -> Option<&str> {
        match kind {
            ForecastKind::Demand => self.demand_error.as_deref(),
            ForecastKind::Wind => self.wind_error.as_deref(),
            ForecastKind::Solar => self.solar_error.as_deref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_display_and_parse() {
        assert_eq!(ForecastKind::Wind.to_string(), "wind");
        assert_eq!("solar".parse::<ForecastKind>().unwrap(), ForecastKind::Solar);
    }

    #[test]
    fn test_result_merges_outcomes() {
        let result = PredictionResult::from_outcomes(
            ForecastOutcome::Value(512.25),
            ForecastOutcome::Unavailable,
            ForecastOutcome::Failed("bad shape".to_string()),
        );

        assert_eq!(result.demand_forecast, 512.25);
        assert_eq!(result.wind_gen, 0.0);
        assert_eq!(result.solar_gen, 0.0);
        assert!(result.error(ForecastKind::Wind).is_none());
        assert_eq!(result.error(ForecastKind::Solar), Some("bad shape"));
    }

    #[test]
    fn test_result_serialization_skips_absent_errors() {
        let result = PredictionResult::from_outcomes(
            ForecastOutcome::Value(1.0),
            ForecastOutcome::Value(2.0),
            ForecastOutcome::Failed("boom".to_string()),
        );
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["demand_forecast"], 1.0);
        assert_eq!(json["wind_gen"], 2.0);
        assert_eq!(json["solar_gen"], 0.0);
        assert_eq!(json["solar_error"], "boom");
        assert!(json.get("wind_error").is_none());
        assert!(json.get("demand_error").is_none());
    }
}
