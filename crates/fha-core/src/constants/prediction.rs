// ABOUTME: Constants for the recovery sequence predictor and survival distribution predictor
// ABOUTME: Window length, channel defaults, HRV imputation heuristic and covariate bounds
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Days of history in one prediction window
pub const SEQUENCE_WINDOW_DAYS: usize = 60;

/// Channels per day: calorie deficit, HRV, body temperature
pub const SEQUENCE_CHANNELS: usize = 3;

/// Body temperature used when a day has no reading (Fahrenheit)
pub const NOMINAL_BODY_TEMPERATURE_F: f64 = 98.6;

/// HRV estimated for a zero calorie deficit (ms)
pub const HRV_IMPUTATION_BASELINE_MS: f64 = 50.0;

/// Calories of deficit per millisecond of HRV lost
pub const HRV_IMPUTATION_KCAL_PER_MS: f64 = 50.0;

/// Lowest HRV the deficit heuristic will estimate (ms)
pub const HRV_IMPUTATION_FLOOR_MS: f64 = 30.0;

/// Survival distribution horizon in days
pub const SURVIVAL_HORIZON_DAYS: usize = 180;

/// Prefix-sum checkpoints reported with every survival distribution
pub const SURVIVAL_CHECKPOINTS: [usize; 4] = [30, 60, 90, 180];

/// Tolerance allowed on the distribution mass when checking `sum <= 1`
pub const SURVIVAL_MASS_EPSILON: f64 = 1e-9;

/// Inclusive bounds on the HRV average covariate (ms)
pub const HRV_AVERAGE_BOUNDS: (f64, f64) = (0.0, 200.0);

/// Inclusive bounds on the mean cycle duration covariate (days)
pub const CYCLE_DURATION_BOUNDS: (f64, f64) = (20.0, 60.0);

/// Inclusive bounds on days since the last event
pub const DAYS_SINCE_EVENT_BOUNDS: (u32, u32) = (0, 1000);

/// Cycle duration assumed when the user has no cycle history (days)
pub const DEFAULT_CYCLE_DURATION_DAYS: f64 = 35.0;

/// Records averaged when deriving the HRV covariate from history
pub const HRV_AVERAGE_LOOKBACK_DAYS: usize = 30;
