//! ML Model Implementations
//!
//! Every predictor hides its native inference behind [`MLModel`]:
//! - Linear regression (tabular)
//! - Dense sequence regressor (sequence-to-one)
//! - Stacked LSTM with a linear head (recurrent)
//!
//! The random forest regressor lives in `ml::smartcore` behind the `ml` feature.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::path::Path;

use super::{FeatureTensor, ModelMetadata, ModelType};

pub mod linear;
pub mod lstm;
pub mod sequence;

pub use linear::LinearRegressionModel;
pub use lstm::LstmRegressor;
pub use sequence::DenseSequenceRegressor;

/// Trait for ML models.
///
/// Implementations must be safe for concurrent read-only use: `predict`
/// takes `&self` and never mutates model state.
pub trait MLModel: Send + Sync {
    /// Run one forward pass and return the raw (still scaled) output
    fn predict(&self, input: &FeatureTensor) -> Result<f64>;

    /// Get model metadata
    fn metadata(&self) -> &ModelMetadata;

    /// Get model type
    fn model_type(&self) -> ModelType {
        self.metadata().model_type
    }
}

pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read model {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("failed to parse model {}", path.display()))
}

pub(crate) fn model_id_from_path(path: &Path, fallback: &str) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(str::to_string)
        .unwrap_or_else(|| fallback.to_string())
}

/// Build a row-major matrix from nested rows, checking that all rows agree
pub(crate) fn matrix_from_rows(rows: &[Vec<f64>], name: &str) -> Result<ndarray::Array2<f64>> {
    let n_rows = rows.len();
    let n_cols = rows.first().map(Vec::len).unwrap_or(0);
    if n_rows == 0 || n_cols == 0 {
        anyhow::bail!("{name} must not be empty");
    }
    if rows.iter().any(|r| r.len() != n_cols) {
        anyhow::bail!("{name} has rows of different lengths");
    }
    let flat: Vec<f64> = rows.iter().flatten().copied().collect();
    ndarray::Array2::from_shape_vec((n_rows, n_cols), flat)
        .with_context(|| format!("invalid shape for {name}"))
}
