// ABOUTME: Forecast commands: recovery probability from a records file and survival distribution
// ABOUTME: Both run through RecoveryForecaster so inference uses the bounded pool
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use fha_core::models::{DailyMetricRecord, SurvivalInputs};
use fha_intelligence::LoadedPredictors;
use fha_recovery::config::RecoveryConfig;
use fha_recovery::forecast::{InMemoryHistory, InferencePool, RecoveryForecaster};
use fha_recovery::logging::AppLogger;
use tokio::fs;

use crate::helpers::display;

fn forecaster(config: &RecoveryConfig, history: Arc<InMemoryHistory>) -> RecoveryForecaster {
    let predictors = LoadedPredictors::load(&config.artifact_dir);
    RecoveryForecaster::new(
        &predictors,
        history,
        InferencePool::new(config.inference_max_concurrency),
    )
}

pub async fn recovery(config: &RecoveryConfig, records_path: &Path, user: &str) -> Result<()> {
    let raw = fs::read_to_string(records_path)
        .await
        .with_context(|| format!("Failed to read {}", records_path.display()))?;
    let records: Vec<DailyMetricRecord> =
        serde_json::from_str(&raw).context("Records file is not a JSON array of daily records")?;

    let history = Arc::new(InMemoryHistory::new());
    history.insert_records(user, records).await;

    let started = Instant::now();
    let result = forecaster(config, history).forecast_recovery(user).await;
    AppLogger::log_inference(
        "sequence",
        result.is_ok(),
        started.elapsed().as_millis() as u64,
    );
    display::print_json("Recovery forecast", &result?)
}

pub async fn distribution(
    config: &RecoveryConfig,
    hrv_average: f64,
    mean_cycle_duration: f64,
    days_since_last_event: u32,
) -> Result<()> {
    let inputs = SurvivalInputs {
        hrv_average,
        mean_cycle_duration,
        days_since_last_event,
    };
    let started = Instant::now();
    let result = forecaster(config, Arc::new(InMemoryHistory::new()))
        .predict_distribution(inputs)
        .await;
    AppLogger::log_inference(
        "survival",
        result.is_ok(),
        started.elapsed().as_millis() as u64,
    );
    let distribution = result?;
    display::print_distribution_summary(&distribution);
    display::print_json("Survival distribution", &distribution)
}
