// ABOUTME: Command-line front end for the FHA recovery engine
// ABOUTME: Reports model status, runs forecasts from JSON records, and routes meal analyses
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
//!
//! Usage:
//! ```bash
//! # Which predictors loaded
//! fha-recovery-cli status
//!
//! # Recovery probability from a JSON array of daily records
//! fha-recovery-cli forecast --records records.json --user demo
//!
//! # Survival distribution for explicit covariates
//! fha-recovery-cli distribution --hrv 48.5 --cycle-days 33 --days-since 140
//!
//! # Meal analysis (remote when GEMINI_API_KEY is set, local otherwise)
//! fha-recovery-cli analyze-meal --meal-type lunch --description "grilled chicken breast"
//! ```

mod commands;
mod helpers;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use fha_core::constants::prediction::DEFAULT_CYCLE_DURATION_DAYS;
use fha_recovery::config::RecoveryConfig;
use fha_recovery::logging::{LogFormat, LoggingConfig};
use tracing::debug;

#[derive(Parser)]
#[command(
    name = "fha-recovery-cli",
    about = "FHA recovery engine CLI",
    long_about = "Run recovery forecasts, survival distributions and meal analyses against local model artifacts."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Artifact directory override (defaults to FHA_ARTIFACT_DIR)
    #[arg(long, global = true)]
    artifact_dir: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Show which predictors loaded and the active configuration
    Status,

    /// Recovery probability from a JSON array of daily records
    Forecast {
        /// Path to the records file
        #[arg(long)]
        records: PathBuf,

        /// User id reported in the output
        #[arg(long, default_value = "cli-user")]
        user: String,
    },

    /// Survival distribution for explicit covariates
    Distribution {
        /// Average heart rate variability (ms)
        #[arg(long)]
        hrv: f64,

        /// Mean cycle duration (days)
        #[arg(long, default_value_t = DEFAULT_CYCLE_DURATION_DAYS)]
        cycle_days: f64,

        /// Days since the last event
        #[arg(long)]
        days_since: u32,
    },

    /// Analyze one meal through the router
    AnalyzeMeal {
        /// breakfast, lunch, dinner, snack or any other label
        #[arg(long)]
        meal_type: String,

        /// Free-text description
        #[arg(long)]
        description: String,

        /// Optional JPEG photo of the meal
        #[arg(long)]
        image: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut logging = LoggingConfig::from_env();
    if cli.verbose {
        "debug".clone_into(&mut logging.level);
        logging.format = LogFormat::Compact;
    }
    logging.init()?;

    let mut config = RecoveryConfig::from_env().context("Failed to load configuration")?;
    if let Some(dir) = cli.artifact_dir {
        config.artifact_dir = dir;
    }
    debug!("{}", config.summary());

    match cli.command {
        Command::Status => commands::status::run(&config),
        Command::Forecast { records, user } => {
            commands::forecast::recovery(&config, &records, &user).await
        }
        Command::Distribution {
            hrv,
            cycle_days,
            days_since,
        } => commands::forecast::distribution(&config, hrv, cycle_days, days_since).await,
        Command::AnalyzeMeal {
            meal_type,
            description,
            image,
        } => commands::analyze::meal(&config, &meal_type, &description, image.as_deref()).await,
    }
}
