use thiserror::Error;

use super::ForecastKind;

/// Errors raised by ingestion, storage and forecasting.
///
/// Validation variants abort the whole request. `ModelUnavailable` and
/// `Inference` are contained per forecast and never fail a prediction
/// request on their own.
#[derive(Debug, Error)]
pub enum ForecastError {
    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Insufficient data: need at least {required} rows, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    #[error("Data quality error at row {row}, column '{column}': {reason}")]
    DataQuality {
        row: usize,
        column: String,
        reason: String,
    },

    #[error("Unrecognised date '{0}': expected DDMMYYYY or an ISO calendar date")]
    DateFormat(String),

    #[error("{0} model unavailable")]
    ModelUnavailable(ForecastKind),

    #[error("{kind} inference failed: {message}")]
    Inference { kind: ForecastKind, message: String },

    #[error("No data on server. Upload CSV first.")]
    StoreUnavailable,

    #[error("Dataset store error: {0}")]
    Store(String),
}

impl ForecastError {
    pub(crate) fn data_quality(
        row: usize,
        column: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::DataQuality {
            row,
            column: column.into(),
            reason: reason.into(),
        }
    }

    /// True for errors caused by the caller's input rather than the server.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::Schema(_)
                | Self::InsufficientData { .. }
                | Self::DataQuality { .. }
                | Self::DateFormat(_)
        )
    }
}

impl From<std::io::Error> for ForecastError {
    fn from(error: std::io::Error) -> Self {
        ForecastError::Store(error.to_string())
    }
}

impl From<csv::Error> for ForecastError {
    fn from(error: csv::Error) -> Self {
        ForecastError::Store(error.to_string())
    }
}
