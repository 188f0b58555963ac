// ABOUTME: Daily tracking record model with the three channels fed to the sequence predictor
// ABOUTME: Records are read-only inputs owned by the persistence collaborator
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One user's metrics for one calendar date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyMetricRecord {
    /// Calendar date of the record
    pub date: NaiveDate,
    /// Calorie expenditure minus intake (kcal), negative for a surplus
    #[serde(default)]
    pub calorie_deficit: Option<i32>,
    /// Heart rate variability (ms)
    #[serde(default)]
    pub heart_rate_variability: Option<f64>,
    /// Basal body temperature (Fahrenheit)
    #[serde(default)]
    pub body_temperature: Option<f64>,
}

impl DailyMetricRecord {
    /// Create a record with every channel absent
    #[must_use]
    pub const fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            calorie_deficit: None,
            heart_rate_variability: None,
            body_temperature: None,
        }
    }

    /// Create a fully populated record
    #[must_use]
    pub const fn new(
        date: NaiveDate,
        calorie_deficit: i32,
        heart_rate_variability: f64,
        body_temperature: f64,
    ) -> Self {
        Self {
            date,
            calorie_deficit: Some(calorie_deficit),
            heart_rate_variability: Some(heart_rate_variability),
            body_temperature: Some(body_temperature),
        }
    }
}
