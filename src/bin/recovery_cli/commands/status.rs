// ABOUTME: Status command showing predictor availability and configuration
// ABOUTME: Loads artifacts once and prints the availability report as JSON
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use anyhow::Result;
use fha_intelligence::LoadedPredictors;
use fha_recovery::config::RecoveryConfig;

use crate::helpers::display;

pub fn run(config: &RecoveryConfig) -> Result<()> {
    let predictors = LoadedPredictors::load(&config.artifact_dir);
    println!("{}", config.summary());
    display::print_json("Predictors", &predictors.status())
}
