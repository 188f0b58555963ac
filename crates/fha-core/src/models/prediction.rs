// ABOUTME: Output models for the recovery sequence predictor and survival distribution predictor
// ABOUTME: Includes confidence bucketing and the interpretation text shown to users
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Probability of a recovery event within the prediction window
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Probability in [0, 1]
    pub probability: f64,
}

/// Coarse bucket of a recovery probability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLevel {
    /// p >= 0.8
    VeryHigh,
    /// 0.6 <= p < 0.8
    High,
    /// 0.4 <= p < 0.6
    Moderate,
    /// 0.2 <= p < 0.4
    Low,
    /// p < 0.2
    VeryLow,
}

impl ConfidenceLevel {
    /// Bucket a probability
    #[must_use]
    pub fn from_probability(probability: f64) -> Self {
        if probability >= 0.8 {
            Self::VeryHigh
        } else if probability >= 0.6 {
            Self::High
        } else if probability >= 0.4 {
            Self::Moderate
        } else if probability >= 0.2 {
            Self::Low
        } else {
            Self::VeryLow
        }
    }

    /// User-facing interpretation of the bucket
    #[must_use]
    pub const fn interpretation(self) -> &'static str {
        match self {
            Self::VeryHigh => "Very high likelihood of period recovery within 30 days. Your health metrics show excellent recovery trends.",
            Self::High => "High likelihood of period recovery within 30 days. Your body shows strong signs of healing.",
            Self::Moderate => "Moderate likelihood of period recovery within 30 days. Continue focusing on gentle nutrition and self-care.",
            Self::Low => "Lower likelihood of recovery within 30 days, but progress is being made. Be patient with your healing journey.",
            Self::VeryLow => "Early stages of recovery. Focus on consistent nourishment and stress reduction for optimal healing.",
        }
    }
}

/// Recovery probability enriched for presentation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecoveryForecast {
    /// User the forecast was made for
    pub user_id: String,
    /// Probability in [0, 1]
    pub recovery_probability: f64,
    /// Bucket of the probability
    pub confidence_level: ConfidenceLevel,
    /// Records that went into the window
    pub days_of_data_used: usize,
    /// Date the forecast was produced
    pub prediction_date: NaiveDate,
    /// Interpretation text for the bucket
    pub interpretation: String,
}

/// Per-day event probabilities over the survival horizon, with summary statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurvivalDistribution {
    /// Probability of the event on day `i + 1`, each in [0, 1], summing to at most 1
    pub daily_probabilities: Vec<f64>,
    /// Day with the highest probability (1-indexed)
    pub peak_day: usize,
    /// Highest daily probability
    pub peak_value: f64,
    /// Probability of the event within 30 days
    pub cumulative_30: f64,
    /// Probability of the event within 60 days
    pub cumulative_60: f64,
    /// Probability of the event within 90 days
    pub cumulative_90: f64,
    /// Probability of the event within 180 days
    pub cumulative_180: f64,
}

/// Covariates fed to the survival oracle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurvivalInputs {
    /// Average heart rate variability (ms)
    pub hrv_average: f64,
    /// Mean cycle duration (days)
    pub mean_cycle_duration: f64,
    /// Days since the last event
    pub days_since_last_event: u32,
}

/// Survival distribution enriched for presentation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurvivalForecast {
    /// User the forecast was made for
    pub user_id: String,
    /// Date the forecast was produced
    pub prediction_date: NaiveDate,
    /// Covariates used
    pub inputs: SurvivalInputs,
    /// Distribution and statistics
    pub distribution: SurvivalDistribution,
}

/// Availability report for a predictor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictorStatus {
    /// Predictor can serve requests
    pub available: bool,
    /// Model artifact loaded
    pub model_loaded: bool,
    /// Normalization statistics loaded (always true for predictors without them)
    pub normalization_loaded: bool,
    /// Why the predictor is unavailable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unavailable_reason: Option<String>,
}
