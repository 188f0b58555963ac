// ABOUTME: Survival distribution predictor: validates covariates, invokes the fitted oracle, summarizes
// ABOUTME: Guarantees per-day probabilities in [0, 1] with total mass at most 1
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Survival distribution prediction
//!
//! The covariate → daily probability mapping is a fitted statistical model
//! exposed through [`SurvivalOracle`]. This module does not fit anything: it
//! checks inputs, calls the oracle, sanitizes its output and derives the
//! peak and cumulative statistics.

/// Cox proportional-hazards oracle
pub mod cox;

pub use cox::{Covariates, CoxProportionalHazards};

use std::fmt;
use std::sync::Arc;

use fha_core::constants::prediction::{
    CYCLE_DURATION_BOUNDS, DAYS_SINCE_EVENT_BOUNDS, HRV_AVERAGE_BOUNDS, SURVIVAL_CHECKPOINTS,
    SURVIVAL_HORIZON_DAYS, SURVIVAL_MASS_EPSILON,
};
use fha_core::errors::PredictionError;
use fha_core::models::{PredictorStatus, SurvivalDistribution, SurvivalInputs};
use tracing::{error, warn};

/// Fitted model mapping covariates to per-day event probabilities
pub trait SurvivalOracle: Send + Sync {
    /// Probability of the event on each of days `1..=horizon`
    fn daily_probabilities(&self, inputs: &SurvivalInputs, horizon: usize) -> Vec<f64>;
}

/// Turns three covariates into a [`SurvivalDistribution`]
#[derive(Clone)]
pub struct SurvivalDistributionPredictor {
    oracle: Result<Arc<dyn SurvivalOracle>, String>,
    horizon: usize,
}

impl fmt::Debug for SurvivalDistributionPredictor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SurvivalDistributionPredictor")
            .field("available", &self.is_available())
            .field("horizon", &self.horizon)
            .finish()
    }
}

impl SurvivalDistributionPredictor {
    /// Predictor backed by a loaded oracle
    #[must_use]
    pub fn new(oracle: Arc<dyn SurvivalOracle>) -> Self {
        Self {
            oracle: Ok(oracle),
            horizon: SURVIVAL_HORIZON_DAYS,
        }
    }

    /// Predictor that rejects every request
    #[must_use]
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            oracle: Err(reason.into()),
            horizon: SURVIVAL_HORIZON_DAYS,
        }
    }

    /// Build from the outcome of loading the oracle artifact, logging any failure
    #[must_use]
    pub fn from_artifact(oracle: Result<Arc<dyn SurvivalOracle>, PredictionError>) -> Self {
        match oracle {
            Ok(oracle) => Self::new(oracle),
            Err(e) => {
                error!(error = %e, "Survival predictor unavailable");
                Self::unavailable(e.to_string())
            }
        }
    }

    /// Whether the oracle loaded
    #[must_use]
    pub const fn is_available(&self) -> bool {
        self.oracle.is_ok()
    }

    /// Availability report
    #[must_use]
    pub fn status(&self) -> PredictorStatus {
        PredictorStatus {
            available: self.is_available(),
            model_loaded: self.is_available(),
            normalization_loaded: true,
            unavailable_reason: self.oracle.as_ref().err().cloned(),
        }
    }

    /// Daily event distribution over the horizon plus summary statistics
    ///
    /// # Errors
    ///
    /// - [`PredictionError::ModelUnavailable`] if no oracle is loaded
    /// - [`PredictionError::InputRange`] if a covariate is out of bounds or not finite
    /// - [`PredictionError::OracleOutput`] if the oracle returns the wrong number of days
    pub fn predict(
        &self,
        hrv_average: f64,
        mean_cycle_duration: f64,
        days_since_last_event: u32,
    ) -> Result<SurvivalDistribution, PredictionError> {
        let oracle = self
            .oracle
            .as_ref()
            .map_err(|reason| PredictionError::model_unavailable(reason.clone()))?;

        check_range("hrv_average", hrv_average, HRV_AVERAGE_BOUNDS)?;
        check_range(
            "mean_cycle_duration",
            mean_cycle_duration,
            CYCLE_DURATION_BOUNDS,
        )?;
        let (min_days, max_days) = DAYS_SINCE_EVENT_BOUNDS;
        check_range(
            "days_since_last_event",
            f64::from(days_since_last_event),
            (f64::from(min_days), f64::from(max_days)),
        )?;

        let inputs = SurvivalInputs {
            hrv_average,
            mean_cycle_duration,
            days_since_last_event,
        };
        let raw = oracle.daily_probabilities(&inputs, self.horizon);
        if raw.len() != self.horizon {
            return Err(PredictionError::OracleOutput {
                expected: self.horizon,
                actual: raw.len(),
            });
        }

        Ok(summarize(sanitize(raw)))
    }
}

fn check_range(
    field: &'static str,
    value: f64,
    (min, max): (f64, f64),
) -> Result<(), PredictionError> {
    if value.is_finite() && (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(PredictionError::InputRange {
            field,
            value,
            min,
            max,
        })
    }
}

/// Clamp each day into [0, 1] and rescale if the total mass exceeds 1
fn sanitize(mut probabilities: Vec<f64>) -> Vec<f64> {
    for p in &mut probabilities {
        *p = if p.is_finite() { p.clamp(0.0, 1.0) } else { 0.0 };
    }
    let total: f64 = probabilities.iter().sum();
    if total > 1.0 + SURVIVAL_MASS_EPSILON {
        warn!(total, "Survival oracle mass exceeds 1, rescaling");
        for p in &mut probabilities {
            *p /= total;
        }
    }
    probabilities
}

/// Peak day/value and prefix sums at the fixed checkpoints
#[must_use]
pub fn summarize(daily_probabilities: Vec<f64>) -> SurvivalDistribution {
    let (peak_index, peak_value) = daily_probabilities
        .iter()
        .copied()
        .enumerate()
        .fold((0, f64::NEG_INFINITY), |(best_i, best), (i, p)| {
            if p > best {
                (i, p)
            } else {
                (best_i, best)
            }
        });
    let peak_value = if peak_value.is_finite() { peak_value } else { 0.0 };

    let cumulative = |days: usize| -> f64 {
        daily_probabilities
            .iter()
            .take(days)
            .sum::<f64>()
            .min(1.0)
    };

    let [c30, c60, c90, c180] = SURVIVAL_CHECKPOINTS.map(cumulative);

    SurvivalDistribution {
        peak_day: peak_index + 1,
        peak_value,
        cumulative_30: c30,
        cumulative_60: c60,
        cumulative_90: c90,
        cumulative_180: c180,
        daily_probabilities,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use fha_core::errors::ErrorKind;

    struct FixedOracle(Vec<f64>);

    impl SurvivalOracle for FixedOracle {
        fn daily_probabilities(&self, _inputs: &SurvivalInputs, _horizon: usize) -> Vec<f64> {
            self.0.clone()
        }
    }

    fn predictor(values: Vec<f64>) -> SurvivalDistributionPredictor {
        SurvivalDistributionPredictor::new(Arc::new(FixedOracle(values)))
    }

    #[test]
    fn test_peak_is_first_maximum_one_indexed() {
        let mut values = vec![0.001; 180];
        values[41] = 0.02;
        values[99] = 0.02;
        let dist = predictor(values).predict(60.0, 35.0, 120).unwrap();
        assert_eq!(dist.peak_day, 42);
        assert!((dist.peak_value - 0.02).abs() < f64::EPSILON);
    }

    #[test]
    fn test_out_of_range_inputs_rejected() {
        let p = predictor(vec![0.0; 180]);
        assert!(matches!(
            p.predict(250.0, 35.0, 10),
            Err(PredictionError::InputRange { field: "hrv_average", .. })
        ));
        assert!(matches!(
            p.predict(50.0, 19.0, 10),
            Err(PredictionError::InputRange { field: "mean_cycle_duration", .. })
        ));
        assert!(matches!(
            p.predict(50.0, 30.0, 1001),
            Err(PredictionError::InputRange { field: "days_since_last_event", .. })
        ));
        assert!(p.predict(f64::NAN, 30.0, 10).is_err());
        assert!(p.predict(0.0, 20.0, 0).is_ok());
        assert!(p.predict(200.0, 60.0, 1000).is_ok());
    }

    #[test]
    fn test_excess_mass_is_rescaled() {
        let dist = predictor(vec![0.01; 180]).predict(50.0, 30.0, 10).unwrap();
        let total: f64 = dist.daily_probabilities.iter().sum();
        assert!(total <= 1.0 + 1e-9);
        assert!(dist.cumulative_180 <= 1.0);
    }

    #[test]
    fn test_non_finite_oracle_values_are_zeroed() {
        let mut values = vec![0.001; 180];
        values[3] = f64::NAN;
        values[4] = -0.5;
        let dist = predictor(values).predict(50.0, 30.0, 10).unwrap();
        assert!(dist.daily_probabilities[3].abs() < f64::EPSILON);
        assert!(dist.daily_probabilities[4].abs() < f64::EPSILON);
    }

    #[test]
    fn test_wrong_oracle_length_is_configuration_error() {
        let err = predictor(vec![0.0; 90]).predict(50.0, 30.0, 10).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn test_unavailable_predictor() {
        let p = SurvivalDistributionPredictor::unavailable("survival_model.json missing");
        assert!(!p.is_available());
        assert!(matches!(
            p.predict(50.0, 30.0, 10),
            Err(PredictionError::ModelUnavailable { .. })
        ));
    }
}
