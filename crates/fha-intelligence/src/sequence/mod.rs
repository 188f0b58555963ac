// ABOUTME: Builds the fixed-length multivariate window fed to the recovery model
// ABOUTME: Fills absent channels with defaults and a swappable HRV imputation strategy
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Recovery sequence construction
//!
//! A [`Sequence`] is `L` rows (one per day, oldest first) of three channels:
//! calorie deficit, heart rate variability and basal body temperature.
//! [`SequenceBuilder`] turns raw [`DailyMetricRecord`]s into that shape.

/// LSTM forward pass over JSON weights
pub mod lstm;
/// Normalization and inference
pub mod predictor;

pub use lstm::LstmModel;
pub use predictor::{NormalizationStats, SequenceModel, SequencePredictor};

use fha_core::constants::prediction::{
    HRV_IMPUTATION_BASELINE_MS, HRV_IMPUTATION_FLOOR_MS, HRV_IMPUTATION_KCAL_PER_MS,
    NOMINAL_BODY_TEMPERATURE_F, SEQUENCE_CHANNELS, SEQUENCE_WINDOW_DAYS,
};
use fha_core::errors::PredictionError;
use fha_core::models::DailyMetricRecord;
use serde::{Deserialize, Serialize};

/// One day of the window: `[calorie_deficit, hrv, body_temperature]`
pub type SequenceRow = [f64; SEQUENCE_CHANNELS];

/// Chronologically ordered window of daily channel values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sequence {
    rows: Vec<SequenceRow>,
}

impl Sequence {
    /// Wrap already-shaped rows
    #[must_use]
    pub const fn from_rows(rows: Vec<SequenceRow>) -> Self {
        Self { rows }
    }

    /// Build from a ragged matrix, rejecting rows that do not have exactly three columns
    ///
    /// # Errors
    ///
    /// Returns [`PredictionError::Shape`] on the first row with the wrong width.
    pub fn try_from_matrix(matrix: Vec<Vec<f64>>) -> Result<Self, PredictionError> {
        let total_rows = matrix.len();
        let rows = matrix
            .into_iter()
            .map(|row| {
                <SequenceRow>::try_from(row.as_slice()).map_err(|_| PredictionError::Shape {
                    expected_rows: SEQUENCE_WINDOW_DAYS,
                    expected_cols: SEQUENCE_CHANNELS,
                    rows: total_rows,
                    cols: row.len(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rows })
    }

    /// Rows, oldest first
    #[must_use]
    pub fn rows(&self) -> &[SequenceRow] {
        &self.rows
    }

    /// Number of days
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when the window has no days
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// `(rows, columns)`
    #[must_use]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows.len(), SEQUENCE_CHANNELS)
    }
}

/// Strategy used to fill a missing HRV reading
///
/// The default estimates HRV from the calorie deficit: a larger deficit means
/// more physiological stress and therefore a lower HRV, floored at a minimum.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HrvImputation {
    /// `max(floor, baseline - |deficit| / kcal_per_ms)`
    DeficitHeuristic {
        /// HRV at zero deficit (ms)
        baseline_ms: f64,
        /// Deficit calories per ms of HRV lost
        kcal_per_ms: f64,
        /// Lowest estimate (ms)
        floor_ms: f64,
    },
    /// Same value for every missing day
    Constant(f64),
    /// Missing HRV becomes 0
    Zero,
}

impl Default for HrvImputation {
    fn default() -> Self {
        Self::DeficitHeuristic {
            baseline_ms: HRV_IMPUTATION_BASELINE_MS,
            kcal_per_ms: HRV_IMPUTATION_KCAL_PER_MS,
            floor_ms: HRV_IMPUTATION_FLOOR_MS,
        }
    }
}

impl HrvImputation {
    /// Estimate HRV for a day whose reading is absent
    #[must_use]
    pub fn impute(&self, calorie_deficit: i32) -> f64 {
        match *self {
            Self::DeficitHeuristic {
                baseline_ms,
                kcal_per_ms,
                floor_ms,
            } => (baseline_ms - f64::from(calorie_deficit).abs() / kcal_per_ms).max(floor_ms),
            Self::Constant(value) => value,
            Self::Zero => 0.0,
        }
    }
}

/// Assembles a [`Sequence`] from daily records
#[derive(Debug, Clone)]
pub struct SequenceBuilder {
    window_length: usize,
    hrv_imputation: HrvImputation,
    require_contiguous: bool,
}

impl Default for SequenceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SequenceBuilder {
    /// 60-day window, deficit-based HRV imputation, gaps allowed
    #[must_use]
    pub fn new() -> Self {
        Self {
            window_length: SEQUENCE_WINDOW_DAYS,
            hrv_imputation: HrvImputation::default(),
            require_contiguous: false,
        }
    }

    /// Override the HRV imputation strategy
    #[must_use]
    pub const fn with_hrv_imputation(mut self, strategy: HrvImputation) -> Self {
        self.hrv_imputation = strategy;
        self
    }

    /// Reject windows whose dates are not consecutive calendar days
    #[must_use]
    pub const fn require_contiguous(mut self, require: bool) -> Self {
        self.require_contiguous = require;
        self
    }

    /// Window length in days
    #[must_use]
    pub const fn window_length(&self) -> usize {
        self.window_length
    }

    /// Build the window from the most recent `window_length` records
    ///
    /// Records may arrive in any order; the window is always ascending by date.
    ///
    /// # Errors
    ///
    /// - [`PredictionError::InsufficientData`] when fewer records than the window exist
    /// - [`PredictionError::DuplicateDate`] when two records in the window share a date
    /// - [`PredictionError::NonContiguousWindow`] when contiguity is required and a day is missing
    pub fn build(&self, records: &[DailyMetricRecord]) -> Result<Sequence, PredictionError> {
        if records.len() < self.window_length {
            return Err(PredictionError::InsufficientData {
                required: self.window_length,
                available: records.len(),
            });
        }

        let mut ordered: Vec<&DailyMetricRecord> = records.iter().collect();
        ordered.sort_by_key(|record| record.date);
        let window = &ordered[ordered.len() - self.window_length..];

        for pair in window.windows(2) {
            let (before, after) = (pair[0].date, pair[1].date);
            if before == after {
                return Err(PredictionError::DuplicateDate { date: after });
            }
            if self.require_contiguous && before.succ_opt() != Some(after) {
                return Err(PredictionError::NonContiguousWindow { before, after });
            }
        }

        let rows = window.iter().map(|record| self.row_for(record)).collect();
        Ok(Sequence::from_rows(rows))
    }

    fn row_for(&self, record: &DailyMetricRecord) -> SequenceRow {
        let calorie_deficit = record.calorie_deficit.unwrap_or(0);
        let hrv = record
            .heart_rate_variability
            .unwrap_or_else(|| self.hrv_imputation.impute(calorie_deficit));
        let body_temperature = record.body_temperature.unwrap_or(NOMINAL_BODY_TEMPERATURE_F);
        [f64::from(calorie_deficit), hrv, body_temperature]
    }
}
