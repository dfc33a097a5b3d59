//! SmartCore ML Model Wrapper
//!
//! Tabular random forest regressor, persisted with bincode.

use anyhow::{Context, Result};
use std::path::Path;

use ::smartcore::ensemble::random_forest_regressor::RandomForestRegressor;
use ::smartcore::linalg::basic::matrix::DenseMatrix;

use super::models::{model_id_from_path, MLModel};
use super::{FeatureTensor, ModelMetadata, ModelType};

pub type Forest = RandomForestRegressor<f64, f64, DenseMatrix<f64>, Vec<f64>>;

/// SmartCore RandomForest Model Wrapper
pub struct SmartcoreRandomForest {
    pub metadata: ModelMetadata,
    model: Forest,
}

impl SmartcoreRandomForest {
    pub fn new(model: Forest, model_id: impl Into<String>, n_features: usize) -> Self {
        Self {
            metadata: ModelMetadata::new(model_id, ModelType::RandomForest, vec![n_features]),
            model,
        }
    }

    /// Restore a forest from bincode bytes
    pub fn from_bytes(bytes: &[u8], model_id: impl Into<String>, n_features: usize) -> Result<Self> {
        let model: Forest = bincode::deserialize(bytes)
            .map_err(|e| anyhow::anyhow!("Failed to deserialize model: {}", e))?;
        Ok(Self::new(model, model_id, n_features))
    }

    pub fn load(path: impl AsRef<Path>, n_features: usize) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .with_context(|| format!("failed to read model {}", path.display()))?;
        Self::from_bytes(&bytes, model_id_from_path(path, "random_forest"), n_features)
            .with_context(|| format!("failed to load model {}", path.display()))
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        bincode::serialize(&self.model).map_err(|e| anyhow::anyhow!("Failed to serialize model: {}", e))
    }
}

impl MLModel for SmartcoreRandomForest {
    fn predict(&self, input: &FeatureTensor) -> Result<f64> {
        let x = input.as_tabular()?;
        let expected = self.metadata.input_shape[0];
        if x.nrows() != 1 || x.ncols() != expected {
            anyhow::bail!(
                "input shape mismatch: expected [1, {expected}], got {:?}",
                x.shape()
            );
        }

        // Convert to DenseMatrix (1 row, n features)
        let row: Vec<f64> = x.iter().copied().collect();
        let matrix = DenseMatrix::new(1, expected, row, false);

        let predictions = self
            .model
            .predict(&matrix)
            .map_err(|e| anyhow::anyhow!("Prediction failed: {:?}", e))?;

        predictions
            .first()
            .copied()
            .ok_or_else(|| anyhow::anyhow!("Model returned empty predictions"))
    }

    fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }
}
