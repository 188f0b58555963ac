// ABOUTME: Constants for the cost-aware meal analysis router
// ABOUTME: Daily remote quota, remote call timeout and Gemini defaults
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Remote analysis calls allowed per day
pub const DEFAULT_DAILY_REMOTE_QUOTA: u32 = 50;

/// Upper bound on a single remote call (seconds)
pub const DEFAULT_REMOTE_TIMEOUT_SECS: u64 = 30;

/// Gemini model used for meal analysis
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";

/// Meal id attached to locally estimated analyses
pub const LOCAL_ESTIMATE_MEAL_ID: &str = "local_estimate";

/// Confidence label attached to local estimates
pub const LOCAL_ESTIMATE_CONFIDENCE: &str = "local_estimate";

/// Processing level reported by the local estimator
pub const LOCAL_PROCESSING_LEVEL: &str = "whole_foods";

/// Inclusive bounds of the local estimator score
pub const LOCAL_SCORE_BOUNDS: (f64, f64) = (6.0, 8.0);

/// Calories per score point in the local estimator
pub const LOCAL_SCORE_KCAL_PER_POINT: f64 = 50.0;

/// Inclusive bounds of any meal analysis score
pub const MEAL_SCORE_BOUNDS: (u8, u8) = (1, 10);
