//! Stacked LSTM regressor
//!
//! Forward-only inference for a batch-first LSTM followed by a linear head on
//! the last time step. Gate blocks in every weight matrix are ordered
//! input, forget, cell, output, which is the layout most training frameworks
//! export.

use anyhow::Result;
use ndarray::{s, Array1, Array2, ArrayView2, Axis};
use serde::Deserialize;
use std::path::Path;

use super::{matrix_from_rows, model_id_from_path, read_json, MLModel};
use crate::ml::{FeatureTensor, ModelMetadata, ModelType};

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// One recurrent layer. `bias` is the sum of the input and hidden biases.
#[derive(Debug, Clone)]
pub struct LstmLayer {
    /// (4 * hidden, inputs)
    pub weight_ih: Array2<f64>,
    /// (4 * hidden, hidden)
    pub weight_hh: Array2<f64>,
    /// (4 * hidden)
    pub bias: Array1<f64>,
}

impl LstmLayer {
    fn forward(&self, inputs: ArrayView2<f64>, hidden: usize) -> Array2<f64> {
        let mut h = Array1::<f64>::zeros(hidden);
        let mut c = Array1::<f64>::zeros(hidden);
        let mut outputs = Array2::<f64>::zeros((inputs.nrows(), hidden));

        for (t, x_t) in inputs.outer_iter().enumerate() {
            let gates = self.weight_ih.dot(&x_t) + self.weight_hh.dot(&h) + &self.bias;
            let i = gates.slice(s![0..hidden]).mapv(sigmoid);
            let f = gates.slice(s![hidden..2 * hidden]).mapv(sigmoid);
            let g = gates.slice(s![2 * hidden..3 * hidden]).mapv(f64::tanh);
            let o = gates.slice(s![3 * hidden..4 * hidden]).mapv(sigmoid);

            c = &f * &c + &i * &g;
            h = &o * &c.mapv(f64::tanh);
            outputs.row_mut(t).assign(&h);
        }
        outputs
    }
}

#[derive(Debug, Deserialize)]
struct LayerFile {
    weight_ih: Vec<Vec<f64>>,
    weight_hh: Vec<Vec<f64>>,
    bias_ih: Vec<f64>,
    bias_hh: Vec<f64>,
}

#[derive(Debug, Deserialize)]
struct HeadFile {
    weight: Vec<Vec<f64>>,
    bias: Vec<f64>,
}

#[derive(Debug, Deserialize)]
struct LstmFile {
    input_size: usize,
    hidden_size: usize,
    layers: Vec<LayerFile>,
    head: HeadFile,
}

/// Recurrent regressor used for solar generation
#[derive(Debug, Clone)]
pub struct LstmRegressor {
    metadata: ModelMetadata,
    input_size: usize,
    hidden_size: usize,
    layers: Vec<LstmLayer>,
    /// (1, hidden)
    head_weight: Array2<f64>,
    head_bias: f64,
}

impl LstmRegressor {
    pub fn new(
        model_id: impl Into<String>,
        input_size: usize,
        hidden_size: usize,
        layers: Vec<LstmLayer>,
        head_weight: Array2<f64>,
        head_bias: f64,
    ) -> Result<Self> {
        if input_size == 0 || hidden_size == 0 {
            anyhow::bail!("LSTM input and hidden sizes must be positive");
        }
        if layers.is_empty() {
            anyhow::bail!("LSTM needs at least one layer");
        }
        let gates = 4 * hidden_size;
        for (idx, layer) in layers.iter().enumerate() {
            let inputs = if idx == 0 { input_size } else { hidden_size };
            if layer.weight_ih.dim() != (gates, inputs) {
                anyhow::bail!(
                    "layer {idx} weight_ih is {:?}, expected {:?}",
                    layer.weight_ih.dim(),
                    (gates, inputs)
                );
            }
            if layer.weight_hh.dim() != (gates, hidden_size) {
                anyhow::bail!(
                    "layer {idx} weight_hh is {:?}, expected {:?}",
                    layer.weight_hh.dim(),
                    (gates, hidden_size)
                );
            }
            if layer.bias.len() != gates {
                anyhow::bail!("layer {idx} bias has {} entries, expected {gates}", layer.bias.len());
            }
        }
        if head_weight.dim() != (1, hidden_size) {
            anyhow::bail!(
                "head weight is {:?}, expected (1, {hidden_size})",
                head_weight.dim()
            );
        }

        Ok(Self {
            metadata: ModelMetadata::new(model_id, ModelType::LSTM, vec![0, input_size]),
            input_size,
            hidden_size,
            layers,
            head_weight,
            head_bias,
        })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file: LstmFile = read_json(path)?;

        let layers = file
            .layers
            .into_iter()
            .enumerate()
            .map(|(idx, layer)| -> Result<LstmLayer> {
                if layer.bias_ih.len() != layer.bias_hh.len() {
                    anyhow::bail!("layer {idx} bias_ih and bias_hh differ in length");
                }
                let bias: Array1<f64> = layer
                    .bias_ih
                    .iter()
                    .zip(&layer.bias_hh)
                    .map(|(a, b)| a + b)
                    .collect();
                Ok(LstmLayer {
                    weight_ih: matrix_from_rows(&layer.weight_ih, &format!("layer {idx} weight_ih"))?,
                    weight_hh: matrix_from_rows(&layer.weight_hh, &format!("layer {idx} weight_hh"))?,
                    bias,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let head_bias = match file.head.bias.as_slice() {
            [b] => *b,
            other => anyhow::bail!("LSTM head must have one bias, has {}", other.len()),
        };

        Self::new(
            model_id_from_path(path, "lstm"),
            file.input_size,
            file.hidden_size,
            layers,
            matrix_from_rows(&file.head.weight, "head weight")?,
            head_bias,
        )
    }

    /// Forward pass over one (steps, features) sequence
    fn forward(&self, sequence: ArrayView2<f64>) -> f64 {
        let mut activations = sequence.to_owned();
        for layer in &self.layers {
            activations = layer.forward(activations.view(), self.hidden_size);
        }
        let last = activations.row(activations.nrows() - 1);
        self.head_weight.row(0).dot(&last) + self.head_bias
    }
}

impl MLModel for LstmRegressor {
    fn predict(&self, input: &FeatureTensor) -> Result<f64> {
        let x = input.as_sequence()?;
        let (batch, steps, features) = x.dim();
        if batch != 1 {
            anyhow::bail!("expected batch size 1, got {batch}");
        }
        if steps == 0 {
            anyhow::bail!("empty input sequence");
        }
        if features != self.input_size {
            anyhow::bail!(
                "Feature count mismatch: expected {}, got {features}",
                self.input_size
            );
        }
        Ok(self.forward(x.index_axis(Axis(0), 0)))
    }

    fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }
}
