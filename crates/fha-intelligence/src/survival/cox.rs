// ABOUTME: Cox proportional-hazards oracle loaded from a JSON export of the fitted model
// ABOUTME: Converts baseline cumulative hazard plus covariate effects into per-day event probabilities
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Cox proportional hazards
//!
//! ```json
//! {
//!   "coefficients": { "hrv_average": 0.01, "mean_cycle_duration": -0.02, "days_since_last_event": -0.003 },
//!   "means":        { "hrv_average": 45.0, "mean_cycle_duration": 33.0, "days_since_last_event": 150.0 },
//!   "baseline_cumulative_hazard": [0.001, 0.003, ...]
//! }
//! ```
//!
//! `S(t) = exp(-H0(t) * exp(b . (x - mean)))` and `p(t) = S(t-1) - S(t)` with `S(0) = 1`.

use fha_core::constants::prediction::SURVIVAL_HORIZON_DAYS;
use fha_core::errors::PredictionError;
use fha_core::models::SurvivalInputs;
use serde::{Deserialize, Serialize};

use super::SurvivalOracle;

const ARTIFACT: &str = "survival_model";

/// One value per covariate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Covariates {
    /// Average heart rate variability (ms)
    pub hrv_average: f64,
    /// Mean cycle duration (days)
    pub mean_cycle_duration: f64,
    /// Days since the last event
    pub days_since_last_event: f64,
}

impl Covariates {
    fn dot(&self, other: &Self) -> f64 {
        self.days_since_last_event.mul_add(
            other.days_since_last_event,
            self.hrv_average
                .mul_add(other.hrv_average, self.mean_cycle_duration * other.mean_cycle_duration),
        )
    }

    fn is_finite(&self) -> bool {
        self.hrv_average.is_finite()
            && self.mean_cycle_duration.is_finite()
            && self.days_since_last_event.is_finite()
    }
}

impl From<&SurvivalInputs> for Covariates {
    fn from(inputs: &SurvivalInputs) -> Self {
        Self {
            hrv_average: inputs.hrv_average,
            mean_cycle_duration: inputs.mean_cycle_duration,
            days_since_last_event: f64::from(inputs.days_since_last_event),
        }
    }
}

/// Fitted Cox model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoxProportionalHazards {
    coefficients: Covariates,
    means: Covariates,
    baseline_cumulative_hazard: Vec<f64>,
}

impl CoxProportionalHazards {
    /// Validate and wrap a fitted model
    ///
    /// # Errors
    ///
    /// Returns [`PredictionError::InvalidArtifact`] when coefficients are not finite
    /// or the baseline hazard is negative, decreasing or shorter than the horizon.
    pub fn new(
        coefficients: Covariates,
        means: Covariates,
        baseline_cumulative_hazard: Vec<f64>,
    ) -> Result<Self, PredictionError> {
        if !coefficients.is_finite() || !means.is_finite() {
            return Err(PredictionError::invalid_artifact(
                ARTIFACT,
                "coefficients and means must be finite",
            ));
        }
        if baseline_cumulative_hazard.len() < SURVIVAL_HORIZON_DAYS {
            return Err(PredictionError::invalid_artifact(
                ARTIFACT,
                format!(
                    "baseline hazard covers {} days, need {SURVIVAL_HORIZON_DAYS}",
                    baseline_cumulative_hazard.len()
                ),
            ));
        }
        if baseline_cumulative_hazard
            .iter()
            .any(|h| !h.is_finite() || *h < 0.0)
        {
            return Err(PredictionError::invalid_artifact(
                ARTIFACT,
                "baseline hazard must be finite and non-negative",
            ));
        }
        if baseline_cumulative_hazard.windows(2).any(|w| w[1] < w[0]) {
            return Err(PredictionError::invalid_artifact(
                ARTIFACT,
                "baseline cumulative hazard must be non-decreasing",
            ));
        }

        Ok(Self {
            coefficients,
            means,
            baseline_cumulative_hazard,
        })
    }

    /// Parse and validate the exported model
    ///
    /// # Errors
    ///
    /// Returns [`PredictionError::InvalidArtifact`] on malformed JSON or a bad model.
    pub fn from_json(json: &str) -> Result<Self, PredictionError> {
        let raw: Self = serde_json::from_str(json)
            .map_err(|e| PredictionError::invalid_artifact(ARTIFACT, e.to_string()))?;
        Self::new(raw.coefficients, raw.means, raw.baseline_cumulative_hazard)
    }

    /// Relative risk `exp(b . (x - mean))`
    #[must_use]
    pub fn partial_hazard(&self, inputs: &SurvivalInputs) -> f64 {
        let x = Covariates::from(inputs);
        let centered = Covariates {
            hrv_average: x.hrv_average - self.means.hrv_average,
            mean_cycle_duration: x.mean_cycle_duration - self.means.mean_cycle_duration,
            days_since_last_event: x.days_since_last_event - self.means.days_since_last_event,
        };
        self.coefficients.dot(&centered).exp()
    }

    /// Survival curve `S(t)` for `t = 1..=horizon`
    #[must_use]
    pub fn survival_function(&self, inputs: &SurvivalInputs, horizon: usize) -> Vec<f64> {
        let risk = self.partial_hazard(inputs);
        let last = self.baseline_cumulative_hazard.last().copied().unwrap_or(0.0);
        (0..horizon)
            .map(|t| {
                let h0 = self.baseline_cumulative_hazard.get(t).copied().unwrap_or(last);
                (-h0 * risk).exp()
            })
            .collect()
    }
}

impl SurvivalOracle for CoxProportionalHazards {
    fn daily_probabilities(&self, inputs: &SurvivalInputs, horizon: usize) -> Vec<f64> {
        let survival = self.survival_function(inputs, horizon);
        let mut previous = 1.0;
        survival
            .into_iter()
            .map(|s| {
                let p = previous - s;
                previous = s;
                p
            })
            .collect()
    }
}
