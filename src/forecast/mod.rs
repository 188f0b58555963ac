// ABOUTME: Recovery forecasting service tying history, sequence building and inference together
// ABOUTME: Enriches raw probabilities with confidence buckets and derives survival covariates
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Recovery forecasting
//!
//! [`RecoveryForecaster`] is the client-facing entry point for both
//! predictors. Model work runs on an [`InferencePool`] so async callers are
//! never blocked by a forward pass.

/// History collaborator
pub mod history;
/// Bounded blocking pool
pub mod pool;

pub use history::{InMemoryHistory, MetricHistory};
pub use pool::InferencePool;

use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use fha_core::constants::prediction::{DEFAULT_CYCLE_DURATION_DAYS, HRV_AVERAGE_LOOKBACK_DAYS};
use fha_core::errors::{AppError, AppResult, ErrorCode, PredictionError};
use fha_core::models::{
    ConfidenceLevel, DailyMetricRecord, RecoveryForecast, SurvivalDistribution, SurvivalForecast,
    SurvivalInputs,
};
use fha_intelligence::{
    ArtifactStatus, LoadedPredictors, SequenceBuilder, SequencePredictor,
    SurvivalDistributionPredictor,
};
use tracing::{debug, info, instrument};

/// Produces recovery and survival forecasts for users
#[derive(Clone)]
pub struct RecoveryForecaster {
    sequence: Arc<SequencePredictor>,
    survival: Arc<SurvivalDistributionPredictor>,
    builder: SequenceBuilder,
    history: Arc<dyn MetricHistory>,
    pool: InferencePool,
}

impl fmt::Debug for RecoveryForecaster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecoveryForecaster")
            .field("sequence", &self.sequence)
            .field("survival", &self.survival)
            .field("max_concurrency", &self.pool.max_concurrency())
            .finish_non_exhaustive()
    }
}

impl RecoveryForecaster {
    /// Forecaster over loaded predictors
    #[must_use]
    pub fn new(
        predictors: &LoadedPredictors,
        history: Arc<dyn MetricHistory>,
        pool: InferencePool,
    ) -> Self {
        Self {
            sequence: Arc::clone(&predictors.sequence),
            survival: Arc::clone(&predictors.survival),
            builder: SequenceBuilder::new(),
            history,
            pool,
        }
    }

    /// Replace the sequence builder
    #[must_use]
    pub fn with_builder(mut self, builder: SequenceBuilder) -> Self {
        self.builder = builder;
        self
    }

    /// Availability of both predictors
    #[must_use]
    pub fn status(&self) -> ArtifactStatus {
        ArtifactStatus {
            sequence: self.sequence.status(),
            survival: self.survival.status(),
        }
    }

    /// Recovery probability from the user's most recent records
    ///
    /// # Errors
    ///
    /// - `ModelUnavailable` before anything else when artifacts did not load
    /// - `InsufficientData` and other input errors from the sequence builder
    /// - history failures
    #[instrument(skip(self))]
    pub async fn forecast_recovery(&self, user_id: &str) -> AppResult<RecoveryForecast> {
        self.ensure_sequence_available()?;
        let records = self
            .history
            .recent_records(user_id, self.builder.window_length())
            .await?;
        self.forecast_from_records(user_id, &records).await
    }

    /// Recovery probability from records supplied by the caller
    ///
    /// # Errors
    ///
    /// Same as [`Self::forecast_recovery`], minus history failures.
    pub async fn forecast_from_records(
        &self,
        user_id: &str,
        records: &[DailyMetricRecord],
    ) -> AppResult<RecoveryForecast> {
        self.ensure_sequence_available()?;
        let sequence = self.builder.build(records)?;
        let days_of_data_used = sequence.len();

        let predictor = Arc::clone(&self.sequence);
        let probability = self
            .pool
            .run(move || predictor.predict(&sequence))
            .await??;

        info!(
            user_id,
            probability,
            days = days_of_data_used,
            "Recovery forecast produced"
        );
        Ok(enrich(user_id, probability, days_of_data_used))
    }

    /// Forecasts for several users' record sets in one batched forward pass
    ///
    /// # Errors
    ///
    /// The first set that cannot be turned into a window fails the whole batch.
    pub async fn forecast_batch(
        &self,
        cohort: Vec<(String, Vec<DailyMetricRecord>)>,
    ) -> AppResult<Vec<RecoveryForecast>> {
        self.ensure_sequence_available()?;
        let mut user_ids = Vec::with_capacity(cohort.len());
        let mut sequences = Vec::with_capacity(cohort.len());
        for (user_id, records) in cohort {
            sequences.push(self.builder.build(&records)?);
            user_ids.push(user_id);
        }
        let lengths: Vec<usize> = sequences.iter().map(|s| s.len()).collect();

        let predictor = Arc::clone(&self.sequence);
        let probabilities = self
            .pool
            .run(move || predictor.predict_batch(&sequences))
            .await??;

        debug!(batch = user_ids.len(), "Batch recovery forecast produced");
        Ok(user_ids
            .iter()
            .zip(probabilities)
            .zip(lengths)
            .map(|((user_id, probability), days)| enrich(user_id, probability, days))
            .collect())
    }

    /// Survival forecast with covariates derived from history
    ///
    /// HRV is the mean of the 30 most recent readings, skipping days without
    /// one. The cycle duration defaults to 35 days when not supplied.
    ///
    /// # Errors
    ///
    /// - `ModelUnavailable` when the survival model did not load
    /// - `InsufficientData` when no HRV reading is on record
    /// - `ResourceNotFound` when no last event is on record
    /// - `ValueOutOfRange` when a covariate is outside the model's bounds
    #[instrument(skip(self))]
    pub async fn survival_forecast(
        &self,
        user_id: &str,
        mean_cycle_duration: Option<f64>,
    ) -> AppResult<SurvivalForecast> {
        if !self.survival.is_available() {
            return Err(self.survival_unavailable());
        }

        let readings = self
            .history
            .recent_hrv_readings(user_id, HRV_AVERAGE_LOOKBACK_DAYS)
            .await?;
        if readings.is_empty() {
            return Err(AppError::new(
                ErrorCode::InsufficientData,
                format!("no HRV readings for user {user_id}"),
            ));
        }
        let hrv_average = readings.iter().sum::<f64>() / readings.len() as f64;
        let inputs = SurvivalInputs {
            hrv_average,
            mean_cycle_duration: mean_cycle_duration.unwrap_or(DEFAULT_CYCLE_DURATION_DAYS),
            days_since_last_event: self.history.days_since_last_event(user_id).await?,
        };

        let distribution = self.predict_distribution(inputs).await?;
        info!(
            user_id,
            peak_day = distribution.peak_day,
            cumulative_90 = distribution.cumulative_90,
            "Survival forecast produced"
        );
        Ok(SurvivalForecast {
            user_id: user_id.to_owned(),
            prediction_date: Utc::now().date_naive(),
            inputs,
            distribution,
        })
    }

    /// Survival distribution for explicit covariates
    ///
    /// # Errors
    ///
    /// `ModelUnavailable` or `ValueOutOfRange`.
    pub async fn predict_distribution(
        &self,
        inputs: SurvivalInputs,
    ) -> AppResult<SurvivalDistribution> {
        let predictor = Arc::clone(&self.survival);
        let distribution = self
            .pool
            .run(move || {
                predictor.predict(
                    inputs.hrv_average,
                    inputs.mean_cycle_duration,
                    inputs.days_since_last_event,
                )
            })
            .await??;
        Ok(distribution)
    }

    fn ensure_sequence_available(&self) -> AppResult<()> {
        let status = self.sequence.status();
        if status.available {
            Ok(())
        } else {
            Err(PredictionError::model_unavailable(
                status
                    .unavailable_reason
                    .unwrap_or_else(|| "sequence model not loaded".to_owned()),
            )
            .into())
        }
    }

    fn survival_unavailable(&self) -> AppError {
        PredictionError::model_unavailable(
            self.survival
                .status()
                .unavailable_reason
                .unwrap_or_else(|| "survival model not loaded".to_owned()),
        )
        .into()
    }
}

fn enrich(user_id: &str, probability: f64, days_of_data_used: usize) -> RecoveryForecast {
    let confidence_level = ConfidenceLevel::from_probability(probability);
    RecoveryForecast {
        user_id: user_id.to_owned(),
        recovery_probability: probability,
        confidence_level,
        days_of_data_used,
        prediction_date: Utc::now().date_naive(),
        interpretation: confidence_level.interpretation().to_owned(),
    }
}
