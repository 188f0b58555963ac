// ABOUTME: Core types and constants for the FHA recovery prediction engine
// ABOUTME: Foundation crate with error taxonomy, domain models, and constants
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # FHA Core
//!
//! Foundation crate providing shared types and constants for the recovery
//! engine. It changes infrequently so the algorithm and service crates can
//! compile incrementally on top of it.
//!
//! ## Modules
//!
//! - **errors**: `AppError`, `ErrorCode`, `ErrorKind` and the domain errors
//!   (`PredictionError`, `RemoteAnalysisError`)
//! - **constants**: window sizes, covariate bounds, cache and quota defaults
//! - **models**: daily tracking records, meal analysis payloads, prediction outputs

/// Unified error handling with error codes and the three-way error taxonomy
pub mod errors;

/// Application constants organized by domain
pub mod constants;

/// Core data models (tracking records, meals, predictions)
pub mod models;
