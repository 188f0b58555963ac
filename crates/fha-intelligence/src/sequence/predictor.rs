// ABOUTME: Recovery probability predictor: normalizes a 60x3 window and runs the recurrent model
// ABOUTME: Reports itself unavailable instead of failing when artifacts did not load
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::fmt;
use std::slice;
use std::sync::Arc;

use fha_core::constants::prediction::{SEQUENCE_CHANNELS, SEQUENCE_WINDOW_DAYS};
use fha_core::errors::PredictionError;
use fha_core::models::PredictorStatus;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use super::{Sequence, SequenceRow};

/// Opaque inference model over normalized windows
///
/// Implementations must be deterministic: the same weights and the same input
/// always produce the same output.
pub trait SequenceModel: Send + Sync {
    /// One raw output per batch item, in batch order
    fn infer(&self, batch: &[Sequence]) -> Vec<f64>;

    /// Name used in logs
    fn name(&self) -> &str {
        "sequence-model"
    }
}

/// Per-channel training statistics used to normalize inputs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawNormalizationStats")]
pub struct NormalizationStats {
    mean: SequenceRow,
    std: SequenceRow,
}

#[derive(Deserialize)]
struct RawNormalizationStats {
    mean: Vec<f64>,
    std: Vec<f64>,
}

impl TryFrom<RawNormalizationStats> for NormalizationStats {
    type Error = PredictionError;

    fn try_from(raw: RawNormalizationStats) -> Result<Self, Self::Error> {
        let mean = SequenceRow::try_from(raw.mean.as_slice()).map_err(|_| {
            PredictionError::invalid_artifact(
                "normalization",
                format!("mean has {} channels, expected {SEQUENCE_CHANNELS}", raw.mean.len()),
            )
        })?;
        let std = SequenceRow::try_from(raw.std.as_slice()).map_err(|_| {
            PredictionError::invalid_artifact(
                "normalization",
                format!("std has {} channels, expected {SEQUENCE_CHANNELS}", raw.std.len()),
            )
        })?;
        Self::new(mean, std)
    }
}

impl NormalizationStats {
    /// Validate and wrap the statistics
    ///
    /// # Errors
    ///
    /// Returns [`PredictionError::InvalidArtifact`] if any mean is non-finite or
    /// any std is not a finite positive number.
    pub fn new(mean: SequenceRow, std: SequenceRow) -> Result<Self, PredictionError> {
        if let Some(channel) = mean.iter().position(|m| !m.is_finite()) {
            return Err(PredictionError::invalid_artifact(
                "normalization",
                format!("mean of channel {channel} is not finite"),
            ));
        }
        if let Some(channel) = std.iter().position(|s| !s.is_finite() || *s <= 0.0) {
            return Err(PredictionError::invalid_artifact(
                "normalization",
                format!("std of channel {channel} must be a positive number"),
            ));
        }
        Ok(Self { mean, std })
    }

    /// Channel means
    #[must_use]
    pub const fn mean(&self) -> &SequenceRow {
        &self.mean
    }

    /// Channel standard deviations
    #[must_use]
    pub const fn std(&self) -> &SequenceRow {
        &self.std
    }

    /// `(value - mean[c]) / std[c]` for every cell
    #[must_use]
    pub fn normalize(&self, sequence: &Sequence) -> Sequence {
        let rows = sequence
            .rows()
            .iter()
            .map(|row| {
                let mut out = [0.0; SEQUENCE_CHANNELS];
                for (channel, value) in row.iter().enumerate() {
                    out[channel] = (value - self.mean[channel]) / self.std[channel];
                }
                out
            })
            .collect();
        Sequence::from_rows(rows)
    }
}

enum PredictorState {
    Ready {
        model: Arc<dyn SequenceModel>,
        stats: NormalizationStats,
    },
    Unavailable {
        reason: String,
        model_loaded: bool,
        normalization_loaded: bool,
    },
}

/// Turns a 60-day window into a recovery probability
pub struct SequencePredictor {
    state: PredictorState,
    window_length: usize,
}

impl fmt::Debug for SequencePredictor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SequencePredictor")
            .field("status", &self.status())
            .field("window_length", &self.window_length)
            .finish()
    }
}

impl SequencePredictor {
    /// Predictor backed by a loaded model and statistics
    #[must_use]
    pub fn new(model: Arc<dyn SequenceModel>, stats: NormalizationStats) -> Self {
        Self {
            state: PredictorState::Ready { model, stats },
            window_length: SEQUENCE_WINDOW_DAYS,
        }
    }

    /// Predictor that rejects every request
    #[must_use]
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            state: PredictorState::Unavailable {
                reason: reason.into(),
                model_loaded: false,
                normalization_loaded: false,
            },
            window_length: SEQUENCE_WINDOW_DAYS,
        }
    }

    /// Build from the outcome of loading both artifacts
    ///
    /// A failure on either side is logged and yields an unavailable predictor,
    /// never an error: the rest of the process keeps running.
    #[must_use]
    pub fn from_artifacts(
        model: Result<Arc<dyn SequenceModel>, PredictionError>,
        stats: Result<NormalizationStats, PredictionError>,
    ) -> Self {
        match (model, stats) {
            (Ok(model), Ok(stats)) => {
                debug!(model = model.name(), "Sequence predictor ready");
                Self::new(model, stats)
            }
            (model, stats) => {
                let model_loaded = model.is_ok();
                let normalization_loaded = stats.is_ok();
                let reason = [model.err(), stats.err()]
                    .into_iter()
                    .flatten()
                    .map(|e| e.to_string())
                    .collect::<Vec<_>>()
                    .join("; ");
                error!(%reason, "Sequence predictor unavailable");
                Self {
                    state: PredictorState::Unavailable {
                        reason,
                        model_loaded,
                        normalization_loaded,
                    },
                    window_length: SEQUENCE_WINDOW_DAYS,
                }
            }
        }
    }

    /// Whether model and statistics both loaded
    #[must_use]
    pub const fn is_available(&self) -> bool {
        matches!(self.state, PredictorState::Ready { .. })
    }

    /// Availability report
    #[must_use]
    pub fn status(&self) -> PredictorStatus {
        match &self.state {
            PredictorState::Ready { .. } => PredictorStatus {
                available: true,
                model_loaded: true,
                normalization_loaded: true,
                unavailable_reason: None,
            },
            PredictorState::Unavailable {
                reason,
                model_loaded,
                normalization_loaded,
            } => PredictorStatus {
                available: false,
                model_loaded: *model_loaded,
                normalization_loaded: *normalization_loaded,
                unavailable_reason: Some(reason.clone()),
            },
        }
    }

    /// Recovery probability for one window, clamped into [0, 1]
    ///
    /// # Errors
    ///
    /// - [`PredictionError::ModelUnavailable`] if artifacts did not load (checked first)
    /// - [`PredictionError::Shape`] if the window is not `L x 3`
    pub fn predict(&self, sequence: &Sequence) -> Result<f64, PredictionError> {
        let (model, stats) = self.ready()?;
        self.check_shape(sequence)?;

        let normalized = stats.normalize(sequence);
        let output = model
            .infer(slice::from_ref(&normalized))
            .first()
            .copied()
            .ok_or_else(|| {
                PredictionError::invalid_artifact(model.name().to_owned(), "model returned no output")
            })?;
        Ok(clamp_probability(output))
    }

    /// Recovery probabilities for several windows in one forward pass
    ///
    /// # Errors
    ///
    /// Same conditions as [`Self::predict`]; the first malformed window fails the batch.
    pub fn predict_batch(&self, sequences: &[Sequence]) -> Result<Vec<f64>, PredictionError> {
        let (model, stats) = self.ready()?;
        for sequence in sequences {
            self.check_shape(sequence)?;
        }

        let normalized: Vec<Sequence> = sequences
            .par_iter()
            .map(|sequence| stats.normalize(sequence))
            .collect();
        let outputs = model.infer(&normalized);
        if outputs.len() != sequences.len() {
            return Err(PredictionError::invalid_artifact(
                model.name().to_owned(),
                format!(
                    "model returned {} outputs for a batch of {}",
                    outputs.len(),
                    sequences.len()
                ),
            ));
        }
        Ok(outputs.into_iter().map(clamp_probability).collect())
    }

    fn ready(&self) -> Result<(&Arc<dyn SequenceModel>, &NormalizationStats), PredictionError> {
        match &self.state {
            PredictorState::Ready { model, stats } => Ok((model, stats)),
            PredictorState::Unavailable { reason, .. } => {
                Err(PredictionError::model_unavailable(reason.clone()))
            }
        }
    }

    fn check_shape(&self, sequence: &Sequence) -> Result<(), PredictionError> {
        let (rows, cols) = sequence.shape();
        if rows == self.window_length {
            Ok(())
        } else {
            Err(PredictionError::Shape {
                expected_rows: self.window_length,
                expected_cols: SEQUENCE_CHANNELS,
                rows,
                cols,
            })
        }
    }
}

/// Clamp a raw model output into [0, 1]; NaN becomes 0
fn clamp_probability(raw: f64) -> f64 {
    if raw.is_nan() {
        warn!("Sequence model produced NaN, reporting probability 0");
        0.0
    } else {
        raw.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    /// Returns a fixed output regardless of input
    struct FixedModel(f64);

    impl SequenceModel for FixedModel {
        fn infer(&self, batch: &[Sequence]) -> Vec<f64> {
            vec![self.0; batch.len()]
        }
    }

    /// Returns the first normalized cell so tests can observe normalization
    struct EchoModel;

    impl SequenceModel for EchoModel {
        fn infer(&self, batch: &[Sequence]) -> Vec<f64> {
            batch.iter().map(|s| s.rows()[0][0]).collect()
        }
    }

    fn stats() -> NormalizationStats {
        NormalizationStats::new([100.0, 40.0, 97.5], [200.0, 10.0, 0.5]).unwrap()
    }

    fn window(value: f64) -> Sequence {
        Sequence::from_rows(vec![[value, 45.0, 98.0]; SEQUENCE_WINDOW_DAYS])
    }

    #[test]
    fn test_unavailable_is_checked_before_shape() {
        let predictor = SequencePredictor::unavailable("weights missing");
        let empty = Sequence::from_rows(Vec::new());
        assert!(matches!(
            predictor.predict(&empty),
            Err(PredictionError::ModelUnavailable { .. })
        ));
        assert!(!predictor.status().available);
    }

    #[test]
    fn test_output_is_clamped() {
        let high = SequencePredictor::new(Arc::new(FixedModel(1.7)), stats());
        let low = SequencePredictor::new(Arc::new(FixedModel(-0.3)), stats());
        let nan = SequencePredictor::new(Arc::new(FixedModel(f64::NAN)), stats());
        assert!((high.predict(&window(0.0)).unwrap() - 1.0).abs() < f64::EPSILON);
        assert!(low.predict(&window(0.0)).unwrap().abs() < f64::EPSILON);
        assert!(nan.predict(&window(0.0)).unwrap().abs() < f64::EPSILON);
    }

    #[test]
    fn test_inputs_are_normalized_before_inference() {
        let predictor = SequencePredictor::new(Arc::new(EchoModel), stats());
        // (180 - 100) / 200 = 0.4
        let p = predictor.predict(&window(180.0)).unwrap();
        assert!((p - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_wrong_row_count_is_shape_error() {
        let predictor = SequencePredictor::new(Arc::new(FixedModel(0.5)), stats());
        let short = Sequence::from_rows(vec![[0.0, 0.0, 0.0]; 59]);
        assert!(matches!(
            predictor.predict(&short),
            Err(PredictionError::Shape { rows: 59, .. })
        ));
    }

    #[test]
    fn test_zero_std_is_rejected() {
        assert!(NormalizationStats::new([0.0; 3], [1.0, 0.0, 1.0]).is_err());
    }

    #[test]
    fn test_stats_deserialize_validates_channel_count() {
        let bad: Result<NormalizationStats, _> =
            serde_json::from_str(r#"{"mean":[1,2],"std":[1,1,1]}"#);
        assert!(bad.is_err());
        let good: NormalizationStats =
            serde_json::from_str(r#"{"mean":[1,2,3],"std":[1,1,1]}"#).unwrap();
        assert!((good.mean()[2] - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_partial_artifacts_report_what_loaded() {
        let predictor = SequencePredictor::from_artifacts(
            Ok(Arc::new(FixedModel(0.5))),
            Err(PredictionError::model_unavailable("normalization.json missing")),
        );
        let status = predictor.status();
        assert!(!status.available);
        assert!(status.model_loaded);
        assert!(!status.normalization_loaded);
    }

    #[test]
    fn test_batch_matches_single_predictions() {
        let predictor = SequencePredictor::new(Arc::new(EchoModel), stats());
        let batch = vec![window(100.0), window(300.0)];
        let outputs = predictor.predict_batch(&batch).unwrap();
        assert_eq!(outputs.len(), 2);
        assert!((outputs[1] - predictor.predict(&batch[1]).unwrap()).abs() < f64::EPSILON);
    }
}
