// ABOUTME: Remote meal analysis abstraction consumed by the analysis router
// ABOUTME: Implementations report failures as RemoteAnalysisError so the router can fall back
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Remote meal analysis
//!
//! The router only knows the [`MealAnalyzer`] trait. [`GeminiMealAnalyzer`]
//! is the production implementation; tests plug in their own stubs.

/// Google Gemini implementation
pub mod gemini;

pub use gemini::GeminiMealAnalyzer;

use async_trait::async_trait;
use fha_core::errors::RemoteAnalysisError;
use fha_core::models::{MealAnalysis, MealAnalysisRequest};

/// Costly remote analysis of one meal
#[async_trait]
pub trait MealAnalyzer: Send + Sync {
    /// Short identifier used in logs and circuit breaker names
    fn name(&self) -> &'static str;

    /// Analyze one meal
    ///
    /// # Errors
    ///
    /// Any transport, status, or payload problem as a [`RemoteAnalysisError`].
    async fn analyze(
        &self,
        request: &MealAnalysisRequest,
    ) -> Result<MealAnalysis, RemoteAnalysisError>;
}
