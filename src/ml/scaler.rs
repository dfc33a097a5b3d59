//! Fitted feature scalers
//!
//! Both scaler kinds reduce to a per-column affine map `x * scale + offset`,
//! so transform and inverse transform share one implementation.

use anyhow::{Context, Result};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::path::Path;

const EPSILON: f64 = 1e-10;

fn default_feature_range() -> (f64, f64) {
    (0.0, 1.0)
}

/// A fitted scaler, persisted as JSON tagged by `kind`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Scaler {
    /// Maps `[data_min, data_max]` onto `feature_range` per column
    MinMax {
        data_min: Vec<f64>,
        data_max: Vec<f64>,
        #[serde(default = "default_feature_range")]
        feature_range: (f64, f64),
    },
    /// Z-score: `(x - mean) / scale`
    Standard { mean: Vec<f64>, scale: Vec<f64> },
}

impl Scaler {
    /// Load and validate a scaler from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read scaler {}", path.display()))?;
        let scaler: Scaler = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse scaler {}", path.display()))?;
        scaler.validate()?;
        Ok(scaler)
    }

    pub fn validate(&self) -> Result<()> {
        let (a, b) = match self {
            Self::MinMax {
                data_min,
                data_max,
                feature_range,
            } => {
                if feature_range.0 >= feature_range.1 {
                    anyhow::bail!("invalid feature range {:?}", feature_range);
                }
                (data_min, data_max)
            }
            Self::Standard { mean, scale } => (mean, scale),
        };
        if a.is_empty() || a.len() != b.len() {
            anyhow::bail!(
                "scaler parameter count mismatch: {} vs {}",
                a.len(),
                b.len()
            );
        }
        if a.iter().chain(b.iter()).any(|v| !v.is_finite()) {
            anyhow::bail!("scaler parameters must be finite");
        }
        Ok(())
    }

    pub fn n_features(&self) -> usize {
        match self {
            Self::MinMax { data_min, .. } => data_min.len(),
            Self::Standard { mean, .. } => mean.len(),
        }
    }

    /// Per-column `(scale, offset)` such that `scaled = raw * scale + offset`
    fn affine(&self) -> Vec<(f64, f64)> {
        match self {
            Self::MinMax {
                data_min,
                data_max,
                feature_range: (lo, hi),
            } => data_min
                .iter()
                .zip(data_max)
                .map(|(min, max)| {
                    let range = max - min;
                    // constant columns keep unit range
                    let range = if range.abs() < EPSILON { 1.0 } else { range };
                    let scale = (hi - lo) / range;
                    (scale, lo - min * scale)
                })
                .collect(),
            Self::Standard { mean, scale } => mean
                .iter()
                .zip(scale)
                .map(|(mean, std)| {
                    let std = if std.abs() < EPSILON { 1.0 } else { *std };
                    (1.0 / std, -mean / std)
                })
                .collect(),
        }
    }

    fn check_columns(&self, x: &Array2<f64>) -> Result<()> {
        if x.ncols() != self.n_features() {
            anyhow::bail!(
                "scaler expects {} features, got {}",
                self.n_features(),
                x.ncols()
            );
        }
        Ok(())
    }

    pub fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        self.check_columns(x)?;
        let mut out = x.to_owned();
        for (mut column, (scale, offset)) in out.columns_mut().into_iter().zip(self.affine()) {
            column.mapv_inplace(|v| v * scale + offset);
        }
        Ok(out)
    }

    pub fn inverse_transform(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        self.check_columns(x)?;
        let mut out = x.to_owned();
        for (mut column, (scale, offset)) in out.columns_mut().into_iter().zip(self.affine()) {
            column.mapv_inplace(|v| (v - offset) / scale);
        }
        Ok(out)
    }

    /// Recover a single value with a one-feature scaler
    pub fn inverse_scalar(&self, value: f64) -> Result<f64> {
        let out = self.inverse_transform(&Array2::from_elem((1, 1), value))?;
        Ok(out[[0, 0]])
    }
}
