//! Dense sequence-to-one regressor
//!
//! The input sequence is flattened step-major and pushed through a stack of
//! fully connected layers ending in a single output unit.

use anyhow::Result;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::{matrix_from_rows, model_id_from_path, read_json, MLModel};
use crate::ml::{FeatureTensor, ModelMetadata, ModelType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    Linear,
    Relu,
    Tanh,
    Sigmoid,
}

impl Activation {
    fn apply(self, x: f64) -> f64 {
        match self {
            Self::Linear => x,
            Self::Relu => x.max(0.0),
            Self::Tanh => x.tanh(),
            Self::Sigmoid => 1.0 / (1.0 + (-x).exp()),
        }
    }
}

/// Fully connected layer, `weights` is (outputs, inputs)
#[derive(Debug, Clone)]
pub struct DenseLayer {
    pub weights: Array2<f64>,
    pub bias: Array1<f64>,
    pub activation: Activation,
}

impl DenseLayer {
    pub fn new(weights: Array2<f64>, bias: Array1<f64>, activation: Activation) -> Result<Self> {
        if weights.nrows() != bias.len() {
            anyhow::bail!(
                "dense layer has {} outputs but {} biases",
                weights.nrows(),
                bias.len()
            );
        }
        Ok(Self {
            weights,
            bias,
            activation,
        })
    }

    fn forward(&self, x: &Array1<f64>) -> Array1<f64> {
        let activation = self.activation;
        (self.weights.dot(x) + &self.bias).mapv(|v| activation.apply(v))
    }
}

#[derive(Debug, Deserialize)]
struct LayerFile {
    weights: Vec<Vec<f64>>,
    bias: Vec<f64>,
    #[serde(default = "linear")]
    activation: Activation,
}

fn linear() -> Activation {
    Activation::Linear
}

#[derive(Debug, Deserialize)]
struct SequenceFile {
    input_steps: usize,
    input_features: usize,
    layers: Vec<LayerFile>,
}

/// Sequence-to-one regressor used for demand
#[derive(Debug, Clone)]
pub struct DenseSequenceRegressor {
    metadata: ModelMetadata,
    input_steps: usize,
    input_features: usize,
    layers: Vec<DenseLayer>,
}

impl DenseSequenceRegressor {
    pub fn new(
        model_id: impl Into<String>,
        input_steps: usize,
        input_features: usize,
        layers: Vec<DenseLayer>,
    ) -> Result<Self> {
        let mut width = input_steps * input_features;
        if width == 0 {
            anyhow::bail!("sequence regressor needs a non-empty input shape");
        }
        if layers.is_empty() {
            anyhow::bail!("sequence regressor needs at least one layer");
        }
        for (idx, layer) in layers.iter().enumerate() {
            if layer.weights.ncols() != width {
                anyhow::bail!(
                    "layer {idx} expects {} inputs but previous width is {width}",
                    layer.weights.ncols()
                );
            }
            width = layer.weights.nrows();
        }
        if width != 1 {
            anyhow::bail!("final layer must have one output, has {width}");
        }

        Ok(Self {
            metadata: ModelMetadata::new(
                model_id,
                ModelType::SequenceRegressor,
                vec![input_steps, input_features],
            ),
            input_steps,
            input_features,
            layers,
        })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file: SequenceFile = read_json(path)?;
        let layers = file
            .layers
            .into_iter()
            .enumerate()
            .map(|(idx, layer)| {
                DenseLayer::new(
                    matrix_from_rows(&layer.weights, &format!("layer {idx} weights"))?,
                    Array1::from(layer.bias),
                    layer.activation,
                )
            })
            .collect::<Result<Vec<_>>>()?;
        Self::new(
            model_id_from_path(path, "sequence_regressor"),
            file.input_steps,
            file.input_features,
            layers,
        )
    }
}

impl MLModel for DenseSequenceRegressor {
    fn predict(&self, input: &FeatureTensor) -> Result<f64> {
        let x = input.as_sequence()?;
        let expected = [1, self.input_steps, self.input_features];
        if x.shape() != &expected[..] {
            anyhow::bail!(
                "input shape mismatch: expected {:?}, got {:?}",
                expected,
                x.shape()
            );
        }

        let mut activations: Array1<f64> = x.iter().copied().collect();
        for layer in &self.layers {
            activations = layer.forward(&activations);
        }
        activations
            .first()
            .copied()
            .ok_or_else(|| anyhow::anyhow!("model produced no output"))
    }

    fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }
}
