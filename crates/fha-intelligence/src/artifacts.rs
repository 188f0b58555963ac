// ABOUTME: One-shot loading of model weights, normalization statistics and the survival oracle
// ABOUTME: Failures are logged and turn the affected predictor unavailable instead of aborting
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use fha_core::errors::PredictionError;
use fha_core::models::PredictorStatus;
use serde::Serialize;
use tracing::{info, warn};

use crate::sequence::{LstmModel, NormalizationStats, SequenceModel, SequencePredictor};
use crate::survival::{CoxProportionalHazards, SurvivalDistributionPredictor, SurvivalOracle};

/// File holding the recurrent model weights
pub const SEQUENCE_MODEL_FILE: &str = "sequence_model.json";
/// File holding the per-channel normalization statistics
pub const NORMALIZATION_FILE: &str = "normalization.json";
/// File holding the fitted survival model
pub const SURVIVAL_MODEL_FILE: &str = "survival_model.json";

/// Locations of the three artifacts
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactPaths {
    /// LSTM weights
    pub sequence_model: PathBuf,
    /// `{mean, std}` statistics
    pub normalization: PathBuf,
    /// Cox model
    pub survival_model: PathBuf,
}

impl ArtifactPaths {
    /// Standard file names inside `dir`
    #[must_use]
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            sequence_model: dir.join(SEQUENCE_MODEL_FILE),
            normalization: dir.join(NORMALIZATION_FILE),
            survival_model: dir.join(SURVIVAL_MODEL_FILE),
        }
    }
}

/// Both predictors, each either ready or unavailable
#[derive(Debug)]
pub struct LoadedPredictors {
    /// Recovery probability predictor
    pub sequence: Arc<SequencePredictor>,
    /// Survival distribution predictor
    pub survival: Arc<SurvivalDistributionPredictor>,
}

/// Availability of both predictors
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactStatus {
    /// Sequence predictor report
    pub sequence: PredictorStatus,
    /// Survival predictor report
    pub survival: PredictorStatus,
}

impl LoadedPredictors {
    /// Load every artifact under `dir`
    ///
    /// Never fails: a missing or invalid file only disables the predictor that needs it.
    #[must_use]
    pub fn load(dir: impl AsRef<Path>) -> Self {
        Self::load_paths(&ArtifactPaths::in_dir(dir))
    }

    /// Load from explicit paths
    #[must_use]
    pub fn load_paths(paths: &ArtifactPaths) -> Self {
        let model = read_artifact(&paths.sequence_model)
            .and_then(|json| LstmModel::from_json(&json))
            .map(|model| Arc::new(model) as Arc<dyn SequenceModel>);
        let stats = read_artifact(&paths.normalization).and_then(|json| {
            serde_json::from_str::<NormalizationStats>(&json)
                .map_err(|e| PredictionError::invalid_artifact("normalization", e.to_string()))
        });
        let oracle = read_artifact(&paths.survival_model)
            .and_then(|json| CoxProportionalHazards::from_json(&json))
            .map(|cox| Arc::new(cox) as Arc<dyn SurvivalOracle>);

        let loaded = Self {
            sequence: Arc::new(SequencePredictor::from_artifacts(model, stats)),
            survival: Arc::new(SurvivalDistributionPredictor::from_artifact(oracle)),
        };
        info!(
            sequence_available = loaded.sequence.is_available(),
            survival_available = loaded.survival.is_available(),
            "Model artifacts loaded"
        );
        loaded
    }

    /// Availability of both predictors
    #[must_use]
    pub fn status(&self) -> ArtifactStatus {
        ArtifactStatus {
            sequence: self.sequence.status(),
            survival: self.survival.status(),
        }
    }
}

fn read_artifact(path: &Path) -> Result<String, PredictionError> {
    fs::read_to_string(path).map_err(|e| {
        warn!(path = %path.display(), error = %e, "Artifact not readable");
        PredictionError::model_unavailable(format!("{}: {e}", path.display()))
    })
}
