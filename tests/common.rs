// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides stub analyzers, stub models, record generators and artifact fixtures
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::unwrap_used,
    clippy::expect_used
)]
//! Shared test utilities for `fha_recovery`

use std::collections::VecDeque;
use std::env;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{Days, NaiveDate};
use fha_core::errors::RemoteAnalysisError;
use fha_core::models::{DailyMetricRecord, MealAnalysis, MealAnalysisRequest, SurvivalInputs};
use fha_intelligence::sequence::lstm::LstmWeights;
use fha_intelligence::{
    LoadedPredictors, NormalizationStats, Sequence, SequenceModel, SequencePredictor,
    SurvivalDistributionPredictor, SurvivalOracle,
};
use fha_recovery::llm::MealAnalyzer;
use tokio::time::sleep;
use tracing::Level;

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => Level::TRACE,
            Ok("DEBUG") => Level::DEBUG,
            Ok("INFO") => Level::INFO,
            Ok("WARN" | "ERROR") | _ => Level::WARN,
        };

        let _ = tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .try_init();
    });
}

// ============================================================================
// Remote analyzer stubs
// ============================================================================

/// Analysis a remote stub answers with
pub fn remote_analysis(score: u8) -> MealAnalysis {
    MealAnalysis {
        meal_id: "remote-meal".to_owned(),
        overall_score: score,
        overall_assessment: "Balanced plate".to_owned(),
        key_nutrients: Vec::new(),
        positive_aspects: Vec::new(),
        areas_for_improvement: Vec::new(),
        nutritional_highlights: "Protein and fibre".to_owned(),
        encouragement: "Keep it up".to_owned(),
        processing_level: "minimal".to_owned(),
        estimated_calories: Some(520),
    }
}

/// How a [`StubAnalyzer`] answers
#[derive(Debug, Clone)]
pub enum StubBehavior {
    /// Return the analysis
    Succeed(MealAnalysis),
    /// Return the error
    Fail(RemoteAnalysisError),
    /// Sleep, then return the analysis
    Delay(Duration, MealAnalysis),
}

/// Remote analyzer with scripted behavior that counts its calls
///
/// Behaviors are consumed one per call; the last one repeats.
#[derive(Debug)]
pub struct StubAnalyzer {
    script: Mutex<VecDeque<StubBehavior>>,
    calls: AtomicUsize,
}

impl StubAnalyzer {
    pub fn new(behavior: StubBehavior) -> Arc<Self> {
        Self::scripted(vec![behavior])
    }

    pub fn scripted(behaviors: Vec<StubBehavior>) -> Arc<Self> {
        assert!(!behaviors.is_empty(), "stub script needs at least one behavior");
        Arc::new(Self {
            script: Mutex::new(behaviors.into()),
            calls: AtomicUsize::new(0),
        })
    }

    fn next_behavior(&self) -> StubBehavior {
        let mut script = self.script.lock().unwrap();
        if script.len() > 1 {
            script.pop_front().unwrap()
        } else {
            script.front().cloned().unwrap()
        }
    }

    pub fn succeeding(score: u8) -> Arc<Self> {
        Self::new(StubBehavior::Succeed(remote_analysis(score)))
    }

    pub fn failing(error: RemoteAnalysisError) -> Arc<Self> {
        Self::new(StubBehavior::Fail(error))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MealAnalyzer for StubAnalyzer {
    fn name(&self) -> &'static str {
        "stub"
    }

    async fn analyze(
        &self,
        _request: &MealAnalysisRequest,
    ) -> Result<MealAnalysis, RemoteAnalysisError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.next_behavior() {
            StubBehavior::Succeed(analysis) => Ok(analysis),
            StubBehavior::Fail(error) => Err(error),
            StubBehavior::Delay(delay, analysis) => {
                sleep(delay).await;
                Ok(analysis)
            }
        }
    }
}

/// Upcast for router construction
pub fn as_remote(stub: &Arc<StubAnalyzer>) -> Option<Arc<dyn MealAnalyzer>> {
    Some(Arc::clone(stub) as Arc<dyn MealAnalyzer>)
}

// ============================================================================
// Model stubs
// ============================================================================

/// Sequence model returning the mean of the (normalized) HRV channel through a sigmoid
///
/// Deterministic and sensitive to its input, which is all the service tests need.
#[derive(Debug, Default)]
pub struct HrvSigmoidModel;

impl SequenceModel for HrvSigmoidModel {
    fn infer(&self, batch: &[Sequence]) -> Vec<f64> {
        batch
            .iter()
            .map(|sequence| {
                let mean = sequence.rows().iter().map(|row| row[1]).sum::<f64>()
                    / sequence.len().max(1) as f64;
                1.0 / (1.0 + (-mean).exp())
            })
            .collect()
    }

    fn name(&self) -> &str {
        "hrv-sigmoid"
    }
}

/// Oracle spreading a fixed probability uniformly over the horizon
#[derive(Debug)]
pub struct UniformOracle(pub f64);

impl SurvivalOracle for UniformOracle {
    fn daily_probabilities(&self, _inputs: &SurvivalInputs, horizon: usize) -> Vec<f64> {
        vec![self.0; horizon]
    }
}

/// Normalization that leaves HRV centered on 45 ms
pub fn test_stats() -> NormalizationStats {
    NormalizationStats::new([0.0, 45.0, 98.0], [500.0, 10.0, 1.0]).unwrap()
}

/// Both predictors ready, backed by the stubs above
pub fn stub_predictors() -> LoadedPredictors {
    LoadedPredictors {
        sequence: Arc::new(SequencePredictor::new(
            Arc::new(HrvSigmoidModel),
            test_stats(),
        )),
        survival: Arc::new(SurvivalDistributionPredictor::new(Arc::new(UniformOracle(
            0.004,
        )))),
    }
}

/// Both predictors unavailable
pub fn missing_predictors() -> LoadedPredictors {
    LoadedPredictors {
        sequence: Arc::new(SequencePredictor::unavailable("no artifacts in test")),
        survival: Arc::new(SurvivalDistributionPredictor::unavailable(
            "no artifacts in test",
        )),
    }
}

// ============================================================================
// Records and artifacts
// ============================================================================

pub fn day(offset: u64) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 1)
        .unwrap()
        .checked_add_days(Days::new(offset))
        .unwrap()
}

/// `count` consecutive fully populated days starting 2025-01-01
pub fn daily_records(count: u64, hrv: f64) -> Vec<DailyMetricRecord> {
    (0..count)
        .map(|i| DailyMetricRecord::new(day(i), 300 + (i as i32 % 7) * 25, hrv, 97.9))
        .collect()
}

/// Write a small but valid set of model artifacts into `dir`
pub fn write_valid_artifacts(dir: &Path) {
    let weights = LstmWeights {
        units: 2,
        kernel: vec![vec![0.1; 8]; 3],
        recurrent_kernel: vec![vec![0.0; 8]; 2],
        bias: vec![0.0; 8],
        dense_kernel: vec![0.5, -0.5],
        dense_bias: 0.1,
    };
    fs::write(
        dir.join("sequence_model.json"),
        serde_json::to_string(&weights).unwrap(),
    )
    .unwrap();
    fs::write(
        dir.join("normalization.json"),
        r#"{"mean":[200.0,45.0,97.8],"std":[300.0,12.0,0.6]}"#,
    )
    .unwrap();
    let hazard: Vec<f64> = (1..=180).map(|t| f64::from(t) * 0.004).collect();
    let survival = serde_json::json!({
        "coefficients": {"hrv_average": 0.01, "mean_cycle_duration": -0.01, "days_since_last_event": -0.001},
        "means": {"hrv_average": 45.0, "mean_cycle_duration": 33.0, "days_since_last_event": 150.0},
        "baseline_cumulative_hazard": hazard,
    });
    fs::write(dir.join("survival_model.json"), survival.to_string()).unwrap();
}
