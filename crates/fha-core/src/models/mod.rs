// ABOUTME: Core data models shared by the intelligence and service crates
// ABOUTME: Re-exports tracking records, meal analysis payloads and prediction outputs
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Meal types, analysis requests and analysis results
pub mod meal;
/// Recovery and survival prediction outputs
pub mod prediction;
/// Daily tracking records supplied by the history collaborator
pub mod tracking;

pub use meal::{HealthAspect, MealAnalysis, MealAnalysisRequest, MealType, NutrientInfo, Nutrients};
pub use prediction::{
    ConfidenceLevel, PredictionResult, PredictorStatus, RecoveryForecast, SurvivalDistribution,
    SurvivalForecast, SurvivalInputs,
};
pub use tracking::DailyMetricRecord;
