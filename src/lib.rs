// ABOUTME: Main library entry point for the FHA recovery engine
// ABOUTME: Wires recovery forecasting and cost-aware meal analysis into one service layer
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # FHA Recovery Engine
//!
//! Service layer around the predictors in `fha-intelligence`:
//!
//! - **Forecasting**: recovery probability from a 60-day metric window and a
//!   180-day survival distribution, both run on a bounded inference pool
//! - **Meal analysis**: cache first, then a rate-limited remote analyzer behind a
//!   circuit breaker, with the local rule engine as fallback
//! - **Config**: environment-driven settings with validation
//! - **Logging**: structured `tracing` output in JSON, pretty or compact form
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use fha_core::models::MealAnalysisRequest;
//! use fha_recovery::analysis::AnalysisRouter;
//! use fha_recovery::config::RecoveryConfig;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = RecoveryConfig::from_env()?;
//!     let router = AnalysisRouter::new(config.router_config(), None);
//!
//!     let request = MealAnalysisRequest::new("lunch", "grilled salmon with rice");
//!     let outcome = router.analyze(&request).await;
//!     println!("{} via {}", outcome.analysis.overall_score, outcome.route.as_str());
//!     Ok(())
//! }
//! ```

/// Meal analysis routing: cache, quota, circuit breaker and fallback
pub mod analysis;

/// Time-bounded LRU result cache
pub mod cache;

/// Environment-based configuration
pub mod config;

/// Recovery and survival forecasting over user metric history
pub mod forecast;

/// Remote meal analyzers
pub mod llm;

/// Structured logging setup
pub mod logging;

pub use analysis::{AnalysisOutcome, AnalysisRoute, AnalysisRouter, RouterConfig};
pub use cache::ResultCache;
pub use config::RecoveryConfig;
pub use forecast::{InMemoryHistory, InferencePool, MetricHistory, RecoveryForecaster};
pub use llm::{GeminiMealAnalyzer, MealAnalyzer};
