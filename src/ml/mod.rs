//! Machine Learning Module
//!
//! Opaque forecasting models and their fitted scalers:
//! - `models`: the shared [`models::MLModel`] contract and portable model formats
//! - `scaler`: min-max and standard scalers with inverse transforms
//! - `inference`: the startup-loaded, read-only model registry
//!
//! # Architecture
//! Models are loaded once at process start and never mutated afterwards.
//! Every model takes a [`FeatureTensor`] and returns one raw value; feature
//! layout and output scaling live in the `forecast` module.

use anyhow::Result;
use ndarray::{Array2, Array3};
use serde::{Deserialize, Serialize};

pub mod inference;
pub mod models;
pub mod scaler;

#[cfg(feature = "ml")]
pub mod smartcore;

/// ML Model Type
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ModelType {
    /// Dense network over a flattened sequence
    SequenceRegressor,
    LinearRegression,
    RandomForest,
    #[serde(rename = "lstm")]
    LSTM,
}

/// ML Model Metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub model_id: String,
    pub model_type: ModelType,
    /// Expected input shape without the batch dimension
    pub input_shape: Vec<usize>,
}

impl ModelMetadata {
    pub fn new(model_id: impl Into<String>, model_type: ModelType, input_shape: Vec<usize>) -> Self {
        Self {
            model_id: model_id.into(),
            model_type,
            input_shape,
        }
    }
}

/// Model input
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureTensor {
    /// (batch, steps, features)
    Sequence(Array3<f64>),
    /// (rows, features)
    Tabular(Array2<f64>),
}

impl FeatureTensor {
    pub fn shape(&self) -> &[usize] {
        match self {
            Self::Sequence(x) => x.shape(),
            Self::Tabular(x) => x.shape(),
        }
    }

    pub fn as_sequence(&self) -> Result<&Array3<f64>> {
        match self {
            Self::Sequence(x) => Ok(x),
            Self::Tabular(_) => anyhow::bail!(
                "expected a (batch, steps, features) sequence, got tabular input of shape {:?}",
                self.shape()
            ),
        }
    }

    pub fn as_tabular(&self) -> Result<&Array2<f64>> {
        match self {
            Self::Tabular(x) => Ok(x),
            Self::Sequence(_) => anyhow::bail!(
                "expected (rows, features) tabular input, got sequence of shape {:?}",
                self.shape()
            ),
        }
    }
}

/// Reject NaN or infinite model output before post-processing
pub fn ensure_finite(value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        anyhow::bail!("model returned a non-finite value ({value})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tensor_accessors() {
        let seq = FeatureTensor::Sequence(Array3::zeros((1, 24, 4)));
        assert_eq!(seq.shape(), &[1, 24, 4]);
        assert!(seq.as_sequence().is_ok());
        assert!(seq.as_tabular().is_err());

        let tab = FeatureTensor::Tabular(Array2::zeros((1, 5)));
        assert_eq!(tab.shape(), &[1, 5]);
        assert!(tab.as_tabular().is_ok());
        assert!(tab.as_sequence().is_err());
    }

    #[test]
    fn test_ensure_finite() {
        assert_eq!(ensure_finite(1.5).unwrap(), 1.5);
        assert!(ensure_finite(f64::NAN).is_err());
        assert!(ensure_finite(f64::INFINITY).is_err());
    }
}
