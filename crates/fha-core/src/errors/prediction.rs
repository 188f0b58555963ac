// ABOUTME: Error types for sequence building, recovery prediction and survival prediction
// ABOUTME: Separates configuration failures (artifacts) from caller input failures
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::NaiveDate;
use thiserror::Error;

use super::ErrorKind;

/// Errors raised by the prediction side of the engine
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PredictionError {
    /// Artifacts were not loaded at construction; the predictor is unusable
    #[error("prediction model is not available: {reason}")]
    ModelUnavailable {
        /// Why loading failed
        reason: String,
    },

    /// An artifact was found but its contents are unusable
    #[error("invalid artifact {artifact}: {details}")]
    InvalidArtifact {
        /// Artifact name
        artifact: String,
        /// What is wrong with it
        details: String,
    },

    /// The survival oracle produced an array of the wrong length
    #[error("survival oracle returned {actual} daily probabilities, expected {expected}")]
    OracleOutput {
        /// Expected horizon length
        expected: usize,
        /// Actual length
        actual: usize,
    },

    /// Sequence does not have the required rows x columns shape
    #[error("expected input shape ({expected_rows}, {expected_cols}), got ({rows}, {cols})")]
    Shape {
        /// Required number of rows
        expected_rows: usize,
        /// Required number of columns
        expected_cols: usize,
        /// Actual rows
        rows: usize,
        /// Actual columns (of the first offending row)
        cols: usize,
    },

    /// Fewer records than the prediction window requires
    #[error("need at least {required} days of data, got {available}")]
    InsufficientData {
        /// Window length
        required: usize,
        /// Records supplied
        available: usize,
    },

    /// Two records share a calendar date
    #[error("duplicate tracking record for {date}")]
    DuplicateDate {
        /// Offending date
        date: NaiveDate,
    },

    /// Window contains a missing calendar day
    #[error("tracking window has a gap between {before} and {after}")]
    NonContiguousWindow {
        /// Last date before the gap
        before: NaiveDate,
        /// First date after the gap
        after: NaiveDate,
    },

    /// Covariate outside its documented bounds (or non-finite)
    #[error("{field} = {value} is outside the allowed range [{min}, {max}]")]
    InputRange {
        /// Covariate name
        field: &'static str,
        /// Supplied value
        value: f64,
        /// Lower bound (inclusive)
        min: f64,
        /// Upper bound (inclusive)
        max: f64,
    },
}

impl PredictionError {
    /// Create a "model unavailable" error
    #[must_use]
    pub fn model_unavailable(reason: impl Into<String>) -> Self {
        Self::ModelUnavailable {
            reason: reason.into(),
        }
    }

    /// Create an "invalid artifact" error
    #[must_use]
    pub fn invalid_artifact(artifact: impl Into<String>, details: impl Into<String>) -> Self {
        Self::InvalidArtifact {
            artifact: artifact.into(),
            details: details.into(),
        }
    }

    /// Failure class of this error
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::ModelUnavailable { .. }
            | Self::InvalidArtifact { .. }
            | Self::OracleOutput { .. } => ErrorKind::Configuration,
            Self::Shape { .. }
            | Self::InsufficientData { .. }
            | Self::DuplicateDate { .. }
            | Self::NonContiguousWindow { .. }
            | Self::InputRange { .. } => ErrorKind::Input,
        }
    }
}
