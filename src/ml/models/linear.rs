use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::{model_id_from_path, read_json, MLModel};
use crate::ml::{FeatureTensor, ModelMetadata, ModelType};

/// Simple Linear Regression Model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearRegressionModel {
    pub metadata: ModelMetadata,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

#[derive(Debug, Deserialize)]
struct LinearFile {
    coefficients: Vec<f64>,
    intercept: f64,
}

impl LinearRegressionModel {
    pub fn new(model_id: impl Into<String>, coefficients: Vec<f64>, intercept: f64) -> Self {
        let metadata = ModelMetadata::new(
            model_id,
            ModelType::LinearRegression,
            vec![coefficients.len()],
        );
        Self {
            metadata,
            coefficients,
            intercept,
        }
    }

    /// Load `{"coefficients": [...], "intercept": x}` from JSON
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file: LinearFile = read_json(path)?;
        if file.coefficients.is_empty() {
            anyhow::bail!("linear model {} has no coefficients", path.display());
        }
        Ok(Self::new(
            model_id_from_path(path, "linear"),
            file.coefficients,
            file.intercept,
        ))
    }
}

impl MLModel for LinearRegressionModel {
    fn predict(&self, input: &FeatureTensor) -> Result<f64> {
        let x = input.as_tabular()?;
        if x.nrows() != 1 {
            anyhow::bail!("expected a single row, got {}", x.nrows());
        }
        if x.ncols() != self.coefficients.len() {
            anyhow::bail!(
                "Feature count mismatch: expected {}, got {}",
                self.coefficients.len(),
                x.ncols()
            );
        }

        let prediction: f64 = x
            .row(0)
            .iter()
            .zip(self.coefficients.iter())
            .map(|(f, c)| f * c)
            .sum::<f64>()
            + self.intercept;

        Ok(prediction)
    }

    fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }
}
