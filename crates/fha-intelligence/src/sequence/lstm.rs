// ABOUTME: Single-layer LSTM with a dense sigmoid head, evaluated from exported JSON weights
// ABOUTME: Gate layout follows the Keras convention (input, forget, cell, output)
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! LSTM forward pass
//!
//! The trained recurrent model is exported as plain JSON weights:
//!
//! ```json
//! {
//!   "units": 32,
//!   "kernel": [[...4*units...], [...], [...]],
//!   "recurrent_kernel": [[...4*units...], ...units rows...],
//!   "bias": [...4*units...],
//!   "dense_kernel": [...units...],
//!   "dense_bias": 0.0
//! }
//! ```
//!
//! Each timestep computes `z = x·W + h·U + b`, splits `z` into the input,
//! forget, cell and output gates, and updates `c` and `h`. The final hidden
//! state goes through `sigmoid(h·w + b)`.

use fha_core::constants::prediction::SEQUENCE_CHANNELS;
use fha_core::errors::PredictionError;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::{Sequence, SequenceModel};

const ARTIFACT: &str = "sequence_model";

/// Raw exported weights
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LstmWeights {
    /// Hidden units
    pub units: usize,
    /// Input kernel, `channels x 4*units`
    pub kernel: Vec<Vec<f64>>,
    /// Recurrent kernel, `units x 4*units`
    pub recurrent_kernel: Vec<Vec<f64>>,
    /// Gate bias, `4*units`
    pub bias: Vec<f64>,
    /// Dense head weights, `units`
    pub dense_kernel: Vec<f64>,
    /// Dense head bias
    pub dense_bias: f64,
}

/// Validated LSTM ready for inference
#[derive(Debug, Clone)]
pub struct LstmModel {
    weights: LstmWeights,
}

impl LstmModel {
    /// Validate weight dimensions
    ///
    /// # Errors
    ///
    /// Returns [`PredictionError::InvalidArtifact`] when any matrix has the wrong
    /// shape or contains a non-finite value.
    pub fn new(weights: LstmWeights) -> Result<Self, PredictionError> {
        let units = weights.units;
        if units == 0 {
            return Err(PredictionError::invalid_artifact(ARTIFACT, "units must be > 0"));
        }
        let gates = 4 * units;

        check_matrix("kernel", &weights.kernel, SEQUENCE_CHANNELS, gates)?;
        check_matrix("recurrent_kernel", &weights.recurrent_kernel, units, gates)?;
        check_vector("bias", &weights.bias, gates)?;
        check_vector("dense_kernel", &weights.dense_kernel, units)?;
        if !weights.dense_bias.is_finite() {
            return Err(PredictionError::invalid_artifact(
                ARTIFACT,
                "dense_bias is not finite",
            ));
        }

        Ok(Self { weights })
    }

    /// Parse and validate weights from JSON
    ///
    /// # Errors
    ///
    /// Returns [`PredictionError::InvalidArtifact`] on malformed JSON or bad dimensions.
    pub fn from_json(json: &str) -> Result<Self, PredictionError> {
        let weights: LstmWeights = serde_json::from_str(json)
            .map_err(|e| PredictionError::invalid_artifact(ARTIFACT, e.to_string()))?;
        Self::new(weights)
    }

    /// Hidden units
    #[must_use]
    pub const fn units(&self) -> usize {
        self.weights.units
    }

    fn forward(&self, sequence: &Sequence) -> f64 {
        let w = &self.weights;
        let units = w.units;
        let mut hidden = vec![0.0; units];
        let mut cell = vec![0.0; units];
        let mut z = vec![0.0; 4 * units];

        for row in sequence.rows() {
            z.copy_from_slice(&w.bias);
            for (x, kernel_row) in row.iter().zip(&w.kernel) {
                for (zj, kj) in z.iter_mut().zip(kernel_row) {
                    *zj += x * kj;
                }
            }
            for (h, recurrent_row) in hidden.iter().zip(&w.recurrent_kernel) {
                for (zj, uj) in z.iter_mut().zip(recurrent_row) {
                    *zj += h * uj;
                }
            }
            for k in 0..units {
                let input_gate = sigmoid(z[k]);
                let forget_gate = sigmoid(z[units + k]);
                let candidate = z[2 * units + k].tanh();
                let output_gate = sigmoid(z[3 * units + k]);
                cell[k] = forget_gate.mul_add(cell[k], input_gate * candidate);
                hidden[k] = output_gate * cell[k].tanh();
            }
        }

        let logit = hidden
            .iter()
            .zip(&w.dense_kernel)
            .fold(w.dense_bias, |acc, (h, d)| h.mul_add(*d, acc));
        sigmoid(logit)
    }
}

impl SequenceModel for LstmModel {
    fn infer(&self, batch: &[Sequence]) -> Vec<f64> {
        batch.par_iter().map(|sequence| self.forward(sequence)).collect()
    }

    fn name(&self) -> &str {
        "lstm"
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

fn check_vector(name: &str, values: &[f64], len: usize) -> Result<(), PredictionError> {
    if values.len() != len {
        return Err(PredictionError::invalid_artifact(
            ARTIFACT,
            format!("{name} has length {}, expected {len}", values.len()),
        ));
    }
    if values.iter().any(|v| !v.is_finite()) {
        return Err(PredictionError::invalid_artifact(
            ARTIFACT,
            format!("{name} contains a non-finite value"),
        ));
    }
    Ok(())
}

fn check_matrix(
    name: &str,
    rows: &[Vec<f64>],
    expected_rows: usize,
    expected_cols: usize,
) -> Result<(), PredictionError> {
    if rows.len() != expected_rows {
        return Err(PredictionError::invalid_artifact(
            ARTIFACT,
            format!("{name} has {} rows, expected {expected_rows}", rows.len()),
        ));
    }
    rows.iter()
        .try_for_each(|row| check_vector(name, row, expected_cols))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn zero_weights(units: usize) -> LstmWeights {
        LstmWeights {
            units,
            kernel: vec![vec![0.0; 4 * units]; SEQUENCE_CHANNELS],
            recurrent_kernel: vec![vec![0.0; 4 * units]; units],
            bias: vec![0.0; 4 * units],
            dense_kernel: vec![0.0; units],
            dense_bias: 0.0,
        }
    }

    fn window() -> Sequence {
        Sequence::from_rows(vec![[0.5, -0.2, 1.0]; 60])
    }

    #[test]
    fn test_zero_weights_give_one_half() {
        let model = LstmModel::new(zero_weights(4)).unwrap();
        let out = model.infer(&[window()]);
        assert!((out[0] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_dense_bias_shifts_output() {
        let mut weights = zero_weights(2);
        weights.dense_bias = 2.0;
        let model = LstmModel::new(weights).unwrap();
        let out = model.infer(&[window()])[0];
        assert!((out - sigmoid(2.0)).abs() < 1e-12);
    }

    #[test]
    fn test_forward_is_deterministic_and_input_sensitive() {
        let mut weights = zero_weights(3);
        weights.kernel[0] = (0..12_i32).map(|i| f64::from(i) * 0.05).collect();
        weights.recurrent_kernel[1] = vec![0.1; 12];
        weights.dense_kernel = vec![0.8, -0.4, 1.2];
        let model = LstmModel::new(weights).unwrap();

        let a = model.infer(&[window()])[0];
        let b = model.infer(&[window()])[0];
        let other = model.infer(&[Sequence::from_rows(vec![[-2.0, 0.0, 0.0]; 60])])[0];
        assert!((a - b).abs() < f64::EPSILON);
        assert!((a - other).abs() > 1e-6);
        assert!((0.0..=1.0).contains(&a));
    }

    #[test]
    fn test_bad_dimensions_rejected() {
        let mut weights = zero_weights(2);
        weights.bias.pop();
        assert!(matches!(
            LstmModel::new(weights),
            Err(PredictionError::InvalidArtifact { .. })
        ));

        let mut weights = zero_weights(2);
        weights.kernel.pop();
        assert!(LstmModel::new(weights).is_err());
    }

    #[test]
    fn test_from_json_round_trips_export_format() {
        let json = serde_json::to_string(&zero_weights(1)).unwrap();
        assert_eq!(LstmModel::from_json(&json).unwrap().units(), 1);
        assert!(LstmModel::from_json("{\"units\": 1}").is_err());
    }
}
