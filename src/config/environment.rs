// ABOUTME: Environment-driven configuration for the recovery engine
// ABOUTME: Parses artifact location, analysis quota and cache settings, remote credentials and pool size
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Environment-based configuration
//!
//! Every setting has a default, so an empty environment yields a working
//! local-only configuration (no `GEMINI_API_KEY` means no remote analysis).

use std::env;
use std::error::Error as StdError;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use fha_core::constants::analysis::{
    DEFAULT_DAILY_REMOTE_QUOTA, DEFAULT_GEMINI_MODEL, DEFAULT_REMOTE_TIMEOUT_SECS,
};
use fha_core::constants::cache::{DEFAULT_CACHE_MAX_ENTRIES, TTL_ANALYSIS_SECS};
use fha_intelligence::MatchMode;
use tracing::info;

use crate::analysis::{CircuitBreakerConfig, RouterConfig};

/// Directory holding the model artifacts
pub const ARTIFACT_DIR_ENV: &str = "FHA_ARTIFACT_DIR";
/// Remote calls allowed per period
pub const DAILY_QUOTA_ENV: &str = "ANALYSIS_DAILY_QUOTA";
/// Cache TTL in seconds
pub const CACHE_TTL_ENV: &str = "ANALYSIS_CACHE_TTL_SECS";
/// TTL in seconds for results produced after a remote failure
pub const FALLBACK_TTL_ENV: &str = "ANALYSIS_FALLBACK_TTL_SECS";
/// Cache capacity
pub const CACHE_MAX_ENTRIES_ENV: &str = "ANALYSIS_CACHE_MAX_ENTRIES";
/// Remote call timeout in seconds
pub const REMOTE_TIMEOUT_ENV: &str = "REMOTE_ANALYSIS_TIMEOUT_SECS";
/// Gemini API key; absent means local-only
pub const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";
/// Gemini model name
pub const GEMINI_MODEL_ENV: &str = "GEMINI_MODEL";
/// Concurrent model inferences
pub const INFERENCE_MAX_CONCURRENCY_ENV: &str = "INFERENCE_MAX_CONCURRENCY";
/// Keyword matching mode for the local estimator
pub const MATCH_MODE_ENV: &str = "FHA_MATCH_MODE";

const DEFAULT_ARTIFACT_DIR: &str = "./artifacts";
const DEFAULT_INFERENCE_MAX_CONCURRENCY: usize = 4;

/// Remote analyzer settings
#[derive(Clone, PartialEq, Eq)]
pub struct RemoteAnalysisConfig {
    /// API key
    pub api_key: String,
    /// Model name
    pub model: String,
}

impl fmt::Debug for RemoteAnalysisConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteAnalysisConfig")
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .finish()
    }
}

/// Complete runtime configuration
#[derive(Debug, Clone)]
pub struct RecoveryConfig {
    /// Directory with `sequence_model.json`, `normalization.json` and `survival_model.json`
    pub artifact_dir: PathBuf,
    /// Remote calls allowed per period
    pub daily_quota: u32,
    /// TTL of cached analyses
    pub cache_ttl: Duration,
    /// TTL of analyses produced after a remote failure
    pub fallback_ttl: Duration,
    /// Cache capacity
    pub cache_max_entries: usize,
    /// Remote call timeout
    pub remote_timeout: Duration,
    /// Remote analyzer, when a key is configured
    pub remote: Option<RemoteAnalysisConfig>,
    /// Concurrent model inferences
    pub inference_max_concurrency: usize,
    /// Keyword matching for the local estimator
    pub match_mode: MatchMode,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        let ttl = Duration::from_secs(TTL_ANALYSIS_SECS);
        Self {
            artifact_dir: PathBuf::from(DEFAULT_ARTIFACT_DIR),
            daily_quota: DEFAULT_DAILY_REMOTE_QUOTA,
            cache_ttl: ttl,
            fallback_ttl: ttl,
            cache_max_entries: DEFAULT_CACHE_MAX_ENTRIES,
            remote_timeout: Duration::from_secs(DEFAULT_REMOTE_TIMEOUT_SECS),
            remote: None,
            inference_max_concurrency: DEFAULT_INFERENCE_MAX_CONCURRENCY,
            match_mode: MatchMode::default(),
        }
    }
}

impl RecoveryConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is present but cannot be parsed, or if
    /// the resulting configuration fails [`Self::validate`].
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");

        let cache_ttl = Duration::from_secs(parse_env(CACHE_TTL_ENV, TTL_ANALYSIS_SECS)?);
        let fallback_ttl = match env::var(FALLBACK_TTL_ENV) {
            Ok(raw) => Duration::from_secs(
                raw.trim()
                    .parse()
                    .with_context(|| format!("Invalid {FALLBACK_TTL_ENV} value: {raw}"))?,
            ),
            Err(_) => cache_ttl,
        };

        let remote = env::var(GEMINI_API_KEY_ENV)
            .ok()
            .map(|key| key.trim().to_owned())
            .filter(|key| !key.is_empty())
            .map(|api_key| RemoteAnalysisConfig {
                api_key,
                model: env_var_or(GEMINI_MODEL_ENV, DEFAULT_GEMINI_MODEL),
            });

        let config = Self {
            artifact_dir: PathBuf::from(env_var_or(ARTIFACT_DIR_ENV, DEFAULT_ARTIFACT_DIR)),
            daily_quota: parse_env(DAILY_QUOTA_ENV, DEFAULT_DAILY_REMOTE_QUOTA)?,
            cache_ttl,
            fallback_ttl,
            cache_max_entries: parse_env(CACHE_MAX_ENTRIES_ENV, DEFAULT_CACHE_MAX_ENTRIES)?,
            remote_timeout: Duration::from_secs(parse_env(
                REMOTE_TIMEOUT_ENV,
                DEFAULT_REMOTE_TIMEOUT_SECS,
            )?),
            remote,
            inference_max_concurrency: parse_env(
                INFERENCE_MAX_CONCURRENCY_ENV,
                DEFAULT_INFERENCE_MAX_CONCURRENCY,
            )?,
            match_mode: env_var_or(MATCH_MODE_ENV, MatchMode::default().as_str())
                .parse()
                .map_err(|e| anyhow!("Invalid {MATCH_MODE_ENV}: {e}"))?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would make a component unusable
    ///
    /// # Errors
    ///
    /// Returns an error for a zero cache capacity, TTL, timeout or pool size.
    pub fn validate(&self) -> Result<()> {
        if self.cache_max_entries == 0 {
            bail!("{CACHE_MAX_ENTRIES_ENV} must be greater than zero");
        }
        if self.cache_ttl.is_zero() {
            bail!("{CACHE_TTL_ENV} must be greater than zero");
        }
        if self.fallback_ttl.is_zero() {
            bail!("{FALLBACK_TTL_ENV} must be greater than zero");
        }
        if self.remote_timeout.is_zero() {
            bail!("{REMOTE_TIMEOUT_ENV} must be greater than zero");
        }
        if self.inference_max_concurrency == 0 {
            bail!("{INFERENCE_MAX_CONCURRENCY_ENV} must be greater than zero");
        }
        Ok(())
    }

    /// Router settings derived from this configuration
    #[must_use]
    pub fn router_config(&self) -> RouterConfig {
        RouterConfig {
            daily_quota: self.daily_quota,
            cache_ttl: self.cache_ttl,
            fallback_ttl: self.fallback_ttl,
            cache_max_entries: self.cache_max_entries,
            remote_timeout: self.remote_timeout,
            match_mode: self.match_mode,
            circuit_breaker: CircuitBreakerConfig::default(),
        }
    }

    /// Human-readable summary for startup logs; never includes the API key
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "FHA Recovery Engine Configuration:\n\
             - Artifact Dir: {}\n\
             - Remote Analysis: {}\n\
             - Daily Quota: {}\n\
             - Cache TTL: {}s (fallback {}s)\n\
             - Cache Max Entries: {}\n\
             - Remote Timeout: {}s\n\
             - Inference Concurrency: {}\n\
             - Match Mode: {}",
            self.artifact_dir.display(),
            self.remote
                .as_ref()
                .map_or_else(|| "Disabled".to_owned(), |r| format!("Enabled ({})", r.model)),
            self.daily_quota,
            self.cache_ttl.as_secs(),
            self.fallback_ttl.as_secs(),
            self.cache_max_entries,
            self.remote_timeout.as_secs(),
            self.inference_max_concurrency,
            self.match_mode,
        )
    }
}

/// Environment variable or a default
fn env_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}

/// Parse an environment variable, falling back to `default` when unset
fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: StdError + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid {key} value: {raw}")),
        Err(_) => Ok(default),
    }
}
