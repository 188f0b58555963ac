// ABOUTME: Output formatting helpers for fha-recovery-cli
// ABOUTME: Pretty JSON for results plus short human-readable headers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use anyhow::{Context, Result};
use fha_core::models::SurvivalDistribution;
use fha_intelligence::MealComplexity;
use fha_recovery::analysis::{AnalysisRoute, QuotaStatus};
use serde::Serialize;

/// Print a titled, pretty-printed JSON document
pub fn print_json<T: Serialize>(title: &str, value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("\n{title}");
    println!("{}", "=".repeat(title.len()));
    println!("{rendered}");
    Ok(())
}

/// Print how a meal analysis was obtained
pub fn print_route(route: &AnalysisRoute, complexity: MealComplexity, quota: &QuotaStatus) {
    println!("Route: {}", route.as_str());
    if let AnalysisRoute::FallbackAfterRemoteError { error } = route {
        println!("   Remote error: {error}");
    }
    println!("Complexity: {}", complexity.as_str());
    println!(
        "Remote quota: {}/{} used, {} remaining",
        quota.used, quota.max, quota.remaining
    );
}

/// Print the headline numbers of a survival distribution
pub fn print_distribution_summary(distribution: &SurvivalDistribution) {
    println!(
        "Peak day {} (p = {:.4})",
        distribution.peak_day, distribution.peak_value
    );
    println!(
        "Cumulative: 30d {:.3} | 60d {:.3} | 90d {:.3} | 180d {:.3}",
        distribution.cumulative_30,
        distribution.cumulative_60,
        distribution.cumulative_90,
        distribution.cumulative_180
    );
}
