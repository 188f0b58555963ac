// ABOUTME: Recovery intelligence engine: sequence predictor, survival predictor, local nutrition estimator
// ABOUTME: Everything here is synchronous and free of I/O except one-shot artifact loading
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # FHA Intelligence
//!
//! - [`sequence`]: builds the 60-day, 3-channel window from daily records and
//!   runs it through the recurrent recovery model
//! - [`survival`]: maps three covariates to a 180-day event distribution
//! - [`nutrition`]: deterministic keyword-driven meal estimator used when the
//!   remote analyzer is not called
//! - [`artifacts`]: loads model weights, normalization statistics and the
//!   survival oracle once at startup

/// Model artifact loading
pub mod artifacts;
/// Local nutrition estimation
pub mod nutrition;
/// Recovery sequence building and prediction
pub mod sequence;
/// Survival distribution prediction
pub mod survival;

pub use artifacts::{ArtifactPaths, ArtifactStatus, LoadedPredictors};
pub use nutrition::{EstimateResult, LocalEstimationEngine, MatchMode, MealComplexity};
pub use sequence::{
    HrvImputation, LstmModel, NormalizationStats, Sequence, SequenceBuilder, SequenceModel,
    SequencePredictor,
};
pub use survival::{CoxProportionalHazards, SurvivalDistributionPredictor, SurvivalOracle};
