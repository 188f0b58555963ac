// ABOUTME: Unified error handling with standard error codes and HTTP status mapping
// ABOUTME: Defines AppError, ErrorCode, ErrorKind and re-exports the domain error enums
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Unified Error Handling System
//!
//! Every domain error reports an [`ErrorKind`] so callers can tell apart the
//! three failure classes of the engine:
//!
//! - [`ErrorKind::Configuration`]: model or statistics artifacts missing or invalid.
//!   The affected predictor stays unavailable for the process lifetime.
//! - [`ErrorKind::Input`]: malformed sequences, insufficient history, covariates
//!   out of range. Reported synchronously, never retried.
//! - [`ErrorKind::TransientRemote`]: any failure of the remote analysis service.
//!   Absorbed by the analysis router, which falls back to local estimation.
//!
//! [`AppError`] is the service-level error carrying an [`ErrorCode`] that the
//! presentation layer maps to an HTTP status.

/// Prediction-side errors (configuration and input classes)
pub mod prediction;
/// Remote analysis service errors (transient class)
pub mod remote;

pub use prediction::PredictionError;
pub use remote::RemoteAnalysisError;

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Failure class of a domain error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Artifacts missing or invalid at startup
    Configuration,
    /// Caller supplied data that cannot be processed
    Input,
    /// Remote collaborator failed; the router falls back locally
    TransientRemote,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration => write!(f, "configuration"),
            Self::Input => write!(f, "input"),
            Self::TransientRemote => write!(f, "transient_remote"),
        }
    }
}

/// Standard error codes used throughout the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Generic malformed input
    InvalidInput,
    /// Numeric input outside its documented bounds
    ValueOutOfRange,
    /// Not enough tracking history to build a prediction window
    InsufficientData,
    /// Requested resource does not exist
    ResourceNotFound,
    /// Prediction model artifacts were not loaded
    ModelUnavailable,
    /// Remote analysis service failed
    ExternalServiceError,
    /// Configuration is missing or invalid
    ConfigError,
    /// Unexpected internal failure
    InternalError,
}

impl ErrorCode {
    /// HTTP status code the presentation layer should use
    #[must_use]
    pub const fn http_status(self) -> u16 {
        match self {
            Self::InvalidInput | Self::ValueOutOfRange => 400,
            Self::ResourceNotFound => 404,
            Self::InsufficientData => 422,
            Self::ExternalServiceError => 502,
            Self::ModelUnavailable => 503,
            Self::ConfigError | Self::InternalError => 500,
        }
    }

    /// User-facing description of this error code
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::InvalidInput => "The provided input is invalid",
            Self::ValueOutOfRange => "The provided value is outside the acceptable range",
            Self::InsufficientData => "Not enough tracking data is available",
            Self::ResourceNotFound => "The requested resource was not found",
            Self::ModelUnavailable => "The prediction service is not available",
            Self::ExternalServiceError => "An external service encountered an error",
            Self::ConfigError => "Configuration error encountered",
            Self::InternalError => "An internal error occurred",
        }
    }

    /// Failure class this code belongs to
    #[must_use]
    pub const fn kind(self) -> ErrorKind {
        match self {
            Self::InvalidInput
            | Self::ValueOutOfRange
            | Self::InsufficientData
            | Self::ResourceNotFound => ErrorKind::Input,
            Self::ExternalServiceError => ErrorKind::TransientRemote,
            Self::ModelUnavailable | Self::ConfigError | Self::InternalError => {
                ErrorKind::Configuration
            }
        }
    }
}

/// Unified error type for the service layer
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub struct AppError {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
}

impl AppError {
    /// Create a new error with the given code and message
    #[must_use]
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Invalid input
    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    /// Resource not found
    #[must_use]
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::ResourceNotFound,
            format!("{} not found", resource.into()),
        )
    }

    /// Internal error
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// Configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigError, message)
    }

    /// External service error
    #[must_use]
    pub fn external_service(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::ExternalServiceError,
            format!("{}: {}", service.into(), message.into()),
        )
    }

    /// HTTP status for this error
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        self.code.http_status()
    }

    /// Failure class for this error
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.code.kind()
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.description(), self.message)
    }
}

impl From<PredictionError> for AppError {
    fn from(error: PredictionError) -> Self {
        let code = match &error {
            PredictionError::ModelUnavailable { .. } => ErrorCode::ModelUnavailable,
            PredictionError::InvalidArtifact { .. } | PredictionError::OracleOutput { .. } => {
                ErrorCode::ConfigError
            }
            PredictionError::InsufficientData { .. } => ErrorCode::InsufficientData,
            PredictionError::InputRange { .. } => ErrorCode::ValueOutOfRange,
            PredictionError::Shape { .. }
            | PredictionError::DuplicateDate { .. }
            | PredictionError::NonContiguousWindow { .. } => ErrorCode::InvalidInput,
        };
        Self::new(code, error.to_string())
    }
}

impl From<RemoteAnalysisError> for AppError {
    fn from(error: RemoteAnalysisError) -> Self {
        Self::external_service("remote meal analysis", error.to_string())
    }
}

/// Result type alias for service-level operations
pub type AppResult<T> = Result<T, AppError>;

/// Error response body consumed by the presentation layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code
    pub code: ErrorCode,
    /// Failure class
    pub kind: ErrorKind,
    /// Message
    pub message: String,
}

impl From<AppError> for ErrorResponse {
    fn from(error: AppError) -> Self {
        Self {
            code: error.code,
            kind: error.kind(),
            message: error.message,
        }
    }
}
