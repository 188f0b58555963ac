// ABOUTME: Meal analysis command routing one description through cache, remote and local paths
// ABOUTME: Reads an optional image from disk and base64-encodes it for the remote analyzer
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use fha_core::models::MealAnalysisRequest;
use fha_recovery::analysis::AnalysisRouter;
use fha_recovery::config::RecoveryConfig;
use fha_recovery::llm::{GeminiMealAnalyzer, MealAnalyzer};
use fha_recovery::logging::AppLogger;
use tokio::fs;

use crate::helpers::display;

pub async fn meal(
    config: &RecoveryConfig,
    meal_type: &str,
    description: &str,
    image: Option<&Path>,
) -> Result<()> {
    let mut request = MealAnalysisRequest::new(meal_type, description);
    if let Some(path) = image {
        let bytes = fs::read(path)
            .await
            .with_context(|| format!("Failed to read image {}", path.display()))?;
        request = request.with_image(STANDARD.encode(bytes));
    }

    let remote = config.remote.as_ref().map(|remote| {
        Arc::new(GeminiMealAnalyzer::new(remote.api_key.clone()).with_model(remote.model.clone()))
            as Arc<dyn MealAnalyzer>
    });
    let router = AnalysisRouter::new(config.router_config(), remote);

    let started = Instant::now();
    let outcome = router.analyze(&request).await;
    AppLogger::log_analysis(
        request.meal_type.as_str(),
        outcome.route.as_str(),
        outcome.analysis.overall_score,
        started.elapsed().as_millis() as u64,
    );

    display::print_route(&outcome.route, outcome.complexity, &router.quota_status());
    display::print_json("Meal analysis", &outcome.analysis)
}
