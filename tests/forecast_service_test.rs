// ABOUTME: Integration tests for the recovery forecasting service
// ABOUTME: Covers history windows, batching, survival covariates, error precedence and real artifacts
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(missing_docs)]
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod common;

use std::sync::Arc;

use common::{
    daily_records, day, init_test_logging, missing_predictors, stub_predictors,
    write_valid_artifacts,
};
use fha_core::errors::ErrorCode;
use fha_core::models::{ConfidenceLevel, DailyMetricRecord, SurvivalInputs};
use fha_intelligence::LoadedPredictors;
use fha_recovery::forecast::{InMemoryHistory, InferencePool, RecoveryForecaster};
use tempfile::TempDir;

async fn forecaster_with(
    predictors: &LoadedPredictors,
    user: &str,
    records: Vec<DailyMetricRecord>,
) -> (RecoveryForecaster, Arc<InMemoryHistory>) {
    let history = Arc::new(InMemoryHistory::new());
    history.insert_records(user, records).await;
    let forecaster = RecoveryForecaster::new(
        predictors,
        Arc::clone(&history) as _,
        InferencePool::new(2),
    );
    (forecaster, history)
}

#[tokio::test]
async fn test_forecast_from_history() {
    init_test_logging();
    let (forecaster, _) = forecaster_with(&stub_predictors(), "u1", daily_records(60, 65.0)).await;

    let forecast = forecaster.forecast_recovery("u1").await.unwrap();
    assert_eq!(forecast.user_id, "u1");
    assert_eq!(forecast.days_of_data_used, 60);
    assert!(forecast.recovery_probability > 0.8);
    assert_eq!(forecast.confidence_level, ConfidenceLevel::VeryHigh);
    assert_eq!(
        forecast.interpretation,
        ConfidenceLevel::VeryHigh.interpretation()
    );
}

#[tokio::test]
async fn test_low_hrv_gives_low_probability() {
    let (forecaster, _) = forecaster_with(&stub_predictors(), "u1", daily_records(60, 25.0)).await;

    let forecast = forecaster.forecast_recovery("u1").await.unwrap();
    assert!(forecast.recovery_probability < 0.2);
    assert_eq!(forecast.confidence_level, ConfidenceLevel::VeryLow);
}

#[tokio::test]
async fn test_only_most_recent_window_is_used() {
    // 30 old low-HRV days followed by 60 recent high-HRV days
    let mut records: Vec<DailyMetricRecord> = (0..30)
        .map(|i| DailyMetricRecord::new(day(i), 800, 20.0, 98.2))
        .collect();
    records.extend((30..90).map(|i| DailyMetricRecord::new(day(i), 300, 65.0, 97.9)));
    let recent: Vec<DailyMetricRecord> = records[30..].to_vec();

    let (forecaster, _) = forecaster_with(&stub_predictors(), "u1", records).await;
    let from_history = forecaster.forecast_recovery("u1").await.unwrap();
    let from_recent = forecaster.forecast_from_records("u1", &recent).await.unwrap();

    assert!((from_history.recovery_probability - from_recent.recovery_probability).abs() < 1e-12);
}

#[tokio::test]
async fn test_short_history_is_insufficient_data() {
    let (forecaster, _) = forecaster_with(&stub_predictors(), "u1", daily_records(45, 50.0)).await;

    let err = forecaster.forecast_recovery("u1").await.unwrap_err();
    assert_eq!(err.code, ErrorCode::InsufficientData);
    assert_eq!(err.http_status(), 422);
}

#[tokio::test]
async fn test_unknown_user_is_insufficient_data() {
    let (forecaster, _) = forecaster_with(&stub_predictors(), "u1", daily_records(60, 50.0)).await;

    let err = forecaster.forecast_recovery("nobody").await.unwrap_err();
    assert_eq!(err.code, ErrorCode::InsufficientData);
}

#[tokio::test]
async fn test_model_unavailable_checked_before_data() {
    let (forecaster, _) = forecaster_with(&missing_predictors(), "u1", Vec::new()).await;

    let err = forecaster.forecast_recovery("u1").await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ModelUnavailable);

    let err = forecaster
        .predict_distribution(SurvivalInputs {
            hrv_average: 500.0,
            mean_cycle_duration: 35.0,
            days_since_last_event: 10,
        })
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ModelUnavailable);

    let status = forecaster.status();
    assert!(!status.sequence.available);
    assert!(!status.survival.available);
}

#[tokio::test]
async fn test_missing_channels_are_filled() {
    let records: Vec<DailyMetricRecord> = (0..60).map(|i| DailyMetricRecord::empty(day(i))).collect();
    let (forecaster, _) = forecaster_with(&stub_predictors(), "u1", records).await;

    let forecast = forecaster.forecast_recovery("u1").await.unwrap();
    assert!((0.0..=1.0).contains(&forecast.recovery_probability));
    assert_eq!(forecast.days_of_data_used, 60);
}

#[tokio::test]
async fn test_batch_matches_individual_forecasts() {
    let (forecaster, _) = forecaster_with(&stub_predictors(), "unused", Vec::new()).await;
    let cohort = vec![
        ("a".to_owned(), daily_records(60, 30.0)),
        ("b".to_owned(), daily_records(75, 45.0)),
        ("c".to_owned(), daily_records(60, 70.0)),
    ];

    let batch = forecaster.forecast_batch(cohort.clone()).await.unwrap();
    assert_eq!(
        batch.iter().map(|f| f.user_id.as_str()).collect::<Vec<_>>(),
        ["a", "b", "c"]
    );
    for (forecast, (user, records)) in batch.iter().zip(&cohort) {
        let single = forecaster.forecast_from_records(user, records).await.unwrap();
        assert!((forecast.recovery_probability - single.recovery_probability).abs() < 1e-12);
    }
}

#[tokio::test]
async fn test_batch_fails_on_short_member() {
    let (forecaster, _) = forecaster_with(&stub_predictors(), "unused", Vec::new()).await;
    let cohort = vec![
        ("a".to_owned(), daily_records(60, 50.0)),
        ("b".to_owned(), daily_records(10, 50.0)),
    ];

    let err = forecaster.forecast_batch(cohort).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::InsufficientData);
}

#[tokio::test]
async fn test_survival_forecast_derives_covariates() {
    // 40 days at 40 ms, then 30 days alternating 50 and missing; the 30 most
    // recent readings are 15 at 50 and 15 at 40
    let mut records: Vec<DailyMetricRecord> = (0..40)
        .map(|i| DailyMetricRecord::new(day(i), 300, 40.0, 98.0))
        .collect();
    records.extend((40..70).map(|i| DailyMetricRecord {
        heart_rate_variability: (i % 2 == 0).then_some(50.0),
        ..DailyMetricRecord::empty(day(i))
    }));
    let (forecaster, history) = forecaster_with(&stub_predictors(), "u1", records).await;
    history.set_days_since_last_event("u1", 120).await;

    let forecast = forecaster.survival_forecast("u1", None).await.unwrap();
    assert!((forecast.inputs.hrv_average - 45.0).abs() < 1e-9);
    assert!((forecast.inputs.mean_cycle_duration - 35.0).abs() < f64::EPSILON);
    assert_eq!(forecast.inputs.days_since_last_event, 120);

    let dist = &forecast.distribution;
    assert_eq!(dist.daily_probabilities.len(), 180);
    assert_eq!(dist.peak_day, 1);
    assert!((dist.cumulative_30 - 0.12).abs() < 1e-9);
    assert!((dist.cumulative_180 - 0.72).abs() < 1e-9);
}

#[tokio::test]
async fn test_survival_forecast_looks_past_days_without_hrv() {
    let mut records: Vec<DailyMetricRecord> = (0..40)
        .map(|i| DailyMetricRecord::new(day(i), 300, 40.0, 98.0))
        .collect();
    records.extend((40..70).map(|i| DailyMetricRecord::empty(day(i))));
    let (forecaster, history) = forecaster_with(&stub_predictors(), "u1", records).await;
    history.set_days_since_last_event("u1", 60).await;

    let forecast = forecaster.survival_forecast("u1", None).await.unwrap();
    assert!((forecast.inputs.hrv_average - 40.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_survival_forecast_uses_supplied_cycle() {
    let (forecaster, history) = forecaster_with(&stub_predictors(), "u1", daily_records(30, 48.0)).await;
    history.set_days_since_last_event("u1", 90).await;

    let forecast = forecaster.survival_forecast("u1", Some(28.0)).await.unwrap();
    assert!((forecast.inputs.mean_cycle_duration - 28.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_survival_forecast_error_cases() {
    let no_hrv: Vec<DailyMetricRecord> = (0..10).map(|i| DailyMetricRecord::empty(day(i))).collect();
    let (forecaster, history) = forecaster_with(&stub_predictors(), "u1", no_hrv).await;
    history.set_days_since_last_event("u1", 90).await;
    history.insert_records("u2", daily_records(10, 50.0)).await;

    let err = forecaster.survival_forecast("u1", None).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::InsufficientData);

    // u2 has readings but no recorded event
    let err = forecaster.survival_forecast("u2", None).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceNotFound);

    history.set_days_since_last_event("u2", 90).await;
    let err = forecaster.survival_forecast("u2", Some(90.0)).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ValueOutOfRange);
}

#[tokio::test]
async fn test_distribution_rejects_out_of_range_inputs() {
    let (forecaster, _) = forecaster_with(&stub_predictors(), "u1", Vec::new()).await;

    for inputs in [
        SurvivalInputs {
            hrv_average: f64::NAN,
            mean_cycle_duration: 35.0,
            days_since_last_event: 10,
        },
        SurvivalInputs {
            hrv_average: 50.0,
            mean_cycle_duration: 19.0,
            days_since_last_event: 10,
        },
        SurvivalInputs {
            hrv_average: 50.0,
            mean_cycle_duration: 35.0,
            days_since_last_event: 1001,
        },
    ] {
        let err = forecaster.predict_distribution(inputs).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValueOutOfRange);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_forecasts_share_the_pool() {
    let (forecaster, history) = forecaster_with(&stub_predictors(), "seed", Vec::new()).await;
    for u in 0..12 {
        history
            .insert_records(&format!("user-{u}"), daily_records(60, 30.0 + f64::from(u) * 3.0))
            .await;
    }

    let handles: Vec<_> = (0..12)
        .map(|u| {
            let forecaster = forecaster.clone();
            tokio::spawn(async move { forecaster.forecast_recovery(&format!("user-{u}")).await })
        })
        .collect();

    let mut probabilities = Vec::new();
    for handle in handles {
        probabilities.push(handle.await.unwrap().unwrap().recovery_probability);
    }
    // Higher HRV, higher probability under the stub model
    assert!(probabilities.windows(2).all(|w| w[0] < w[1]));
}

#[tokio::test]
async fn test_real_artifacts_are_deterministic() {
    let dir = TempDir::new().unwrap();
    write_valid_artifacts(dir.path());
    let predictors = LoadedPredictors::load(dir.path());
    let (forecaster, _) = forecaster_with(&predictors, "u1", daily_records(60, 52.0)).await;

    let status = forecaster.status();
    assert!(status.sequence.available);
    assert!(status.survival.available);

    let first = forecaster.forecast_recovery("u1").await.unwrap();
    let second = forecaster.forecast_recovery("u1").await.unwrap();
    assert!((0.0..=1.0).contains(&first.recovery_probability));
    assert!((first.recovery_probability - second.recovery_probability).abs() < f64::EPSILON);

    let dist = forecaster
        .predict_distribution(SurvivalInputs {
            hrv_average: 52.0,
            mean_cycle_duration: 33.0,
            days_since_last_event: 140,
        })
        .await
        .unwrap();
    let total: f64 = dist.daily_probabilities.iter().sum();
    assert!(total <= 1.0 + 1e-9);
    assert!(dist.cumulative_30 <= dist.cumulative_60);
    assert!(dist.cumulative_90 <= dist.cumulative_180);
}
