// ABOUTME: Read-only access to a user's tracking history for the forecaster
// ABOUTME: In-memory implementation backs tests and the CLI
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::collections::HashMap;

use async_trait::async_trait;
use fha_core::errors::{AppError, AppResult};
use fha_core::models::DailyMetricRecord;
use tokio::sync::RwLock;

/// Source of daily records and event history
#[async_trait]
pub trait MetricHistory: Send + Sync {
    /// The `count` most recent records, ascending by date
    ///
    /// # Errors
    ///
    /// Storage failures.
    async fn recent_records(&self, user_id: &str, count: usize)
        -> AppResult<Vec<DailyMetricRecord>>;

    /// The `count` most recent HRV readings, oldest first
    ///
    /// Records without a reading are skipped, so the lookback can reach past
    /// a run of days that lack HRV.
    ///
    /// # Errors
    ///
    /// Storage failures.
    async fn recent_hrv_readings(&self, user_id: &str, count: usize) -> AppResult<Vec<f64>>;

    /// Days since the user's last recorded event
    ///
    /// # Errors
    ///
    /// [`AppError::not_found`] when no event is on record.
    async fn days_since_last_event(&self, user_id: &str) -> AppResult<u32>;
}

/// Thread-safe in-memory history
#[derive(Debug, Default)]
pub struct InMemoryHistory {
    records: RwLock<HashMap<String, Vec<DailyMetricRecord>>>,
    last_event: RwLock<HashMap<String, u32>>,
}

impl InMemoryHistory {
    /// Empty history
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add records for a user; a record for an already known date replaces it
    pub async fn insert_records(
        &self,
        user_id: &str,
        records: impl IntoIterator<Item = DailyMetricRecord>,
    ) {
        let mut store = self.records.write().await;
        let entry = store.entry(user_id.to_owned()).or_default();
        for record in records {
            match entry.binary_search_by_key(&record.date, |r| r.date) {
                Ok(index) => entry[index] = record,
                Err(index) => entry.insert(index, record),
            }
        }
    }

    /// Set how many days ago the user's last event happened
    pub async fn set_days_since_last_event(&self, user_id: &str, days: u32) {
        self.last_event
            .write()
            .await
            .insert(user_id.to_owned(), days);
    }

    async fn tail(&self, user_id: &str, count: usize) -> Vec<DailyMetricRecord> {
        let store = self.records.read().await;
        store.get(user_id).map_or_else(Vec::new, |records| {
            records[records.len().saturating_sub(count)..].to_vec()
        })
    }
}

#[async_trait]
impl MetricHistory for InMemoryHistory {
    async fn recent_records(
        &self,
        user_id: &str,
        count: usize,
    ) -> AppResult<Vec<DailyMetricRecord>> {
        Ok(self.tail(user_id, count).await)
    }

    async fn recent_hrv_readings(&self, user_id: &str, count: usize) -> AppResult<Vec<f64>> {
        let store = self.records.read().await;
        let mut readings: Vec<f64> = store.get(user_id).map_or_else(Vec::new, |records| {
            records
                .iter()
                .rev()
                .filter_map(|record| record.heart_rate_variability)
                .take(count)
                .collect()
        });
        readings.reverse();
        Ok(readings)
    }

    async fn days_since_last_event(&self, user_id: &str) -> AppResult<u32> {
        self.last_event
            .read()
            .await
            .get(user_id)
            .copied()
            .ok_or_else(|| AppError::not_found(format!("last event for user {user_id}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap_or_default()
    }

    #[tokio::test]
    async fn test_records_kept_sorted_and_deduplicated() {
        let history = InMemoryHistory::new();
        history
            .insert_records(
                "u1",
                vec![
                    DailyMetricRecord::new(day(3), 100, 40.0, 97.9),
                    DailyMetricRecord::new(day(1), 200, 42.0, 97.8),
                    DailyMetricRecord::empty(day(2)),
                ],
            )
            .await;
        history
            .insert_records("u1", vec![DailyMetricRecord::new(day(3), 0, 55.0, 98.0)])
            .await;

        let records = history.recent_records("u1", 10).await.unwrap_or_default();
        let dates: Vec<_> = records.iter().map(|r| r.date).collect();
        assert_eq!(dates, vec![day(1), day(2), day(3)]);

        let hrv = history.recent_hrv_readings("u1", 2).await.unwrap_or_default();
        assert_eq!(hrv, vec![42.0, 55.0]);
        let latest = history.recent_hrv_readings("u1", 1).await.unwrap_or_default();
        assert_eq!(latest, vec![55.0]);
    }

    #[tokio::test]
    async fn test_unknown_user() {
        let history = InMemoryHistory::new();
        assert!(history
            .recent_records("nobody", 5)
            .await
            .is_ok_and(|r| r.is_empty()));
        assert!(history.days_since_last_event("nobody").await.is_err());
    }
}
