// ABOUTME: Cost-aware meal analysis router: cache, quota-gated remote call, local fallback
// ABOUTME: Never fails; every outcome is tagged with the route that produced it
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Analysis router
//!
//! Order of decisions for one request:
//!
//! 1. Cache lookup by normalized `(meal_type, description)` key.
//! 2. Remote call when a remote analyzer is configured, a quota slot can be
//!    reserved, and the circuit breaker allows it. The call is bounded by a
//!    timeout and its quota slot is only kept on success.
//! 3. Local estimation otherwise, or when the remote call fails.
//!
//! Every result, remote or local, is written back to the cache.

/// Circuit breaker for the remote analyzer
pub mod circuit_breaker;
/// Daily remote call ceiling
pub mod quota;

pub use circuit_breaker::{
    CallPermit, CircuitBreaker, CircuitBreakerConfig, CircuitState, GuardedCallError,
};
pub use quota::{QuotaCounter, QuotaReservation, QuotaStatus};

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use fha_core::constants::analysis::{DEFAULT_DAILY_REMOTE_QUOTA, DEFAULT_REMOTE_TIMEOUT_SECS};
use fha_core::constants::cache::{DEFAULT_CACHE_MAX_ENTRIES, TTL_ANALYSIS_SECS};
use fha_core::errors::RemoteAnalysisError;
use fha_core::models::{MealAnalysis, MealAnalysisRequest};
use fha_intelligence::{LocalEstimationEngine, MatchMode, MealComplexity};
use tokio::time::timeout;
use tracing::{debug, info, instrument, warn};

use crate::cache::{analysis_cache_key, CacheStats, Clock, ResultCache, SystemClock};
use crate::llm::MealAnalyzer;

/// Tunables for [`AnalysisRouter`]
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Successful remote calls allowed per period
    pub daily_quota: u32,
    /// TTL of cached results
    pub cache_ttl: Duration,
    /// TTL of results produced after a remote failure
    pub fallback_ttl: Duration,
    /// Cache capacity
    pub cache_max_entries: usize,
    /// Upper bound on one remote call
    pub remote_timeout: Duration,
    /// Keyword matching for the local estimator
    pub match_mode: MatchMode,
    /// Breaker thresholds for the remote analyzer
    pub circuit_breaker: CircuitBreakerConfig,
}

impl Default for RouterConfig {
    fn default() -> Self {
        let ttl = Duration::from_secs(TTL_ANALYSIS_SECS);
        Self {
            daily_quota: DEFAULT_DAILY_REMOTE_QUOTA,
            cache_ttl: ttl,
            fallback_ttl: ttl,
            cache_max_entries: DEFAULT_CACHE_MAX_ENTRIES,
            remote_timeout: Duration::from_secs(DEFAULT_REMOTE_TIMEOUT_SECS),
            match_mode: MatchMode::default(),
            circuit_breaker: CircuitBreakerConfig::default(),
        }
    }
}

/// Shared mutable state owned by one router
#[derive(Debug)]
pub struct RouterState {
    /// Cached analyses keyed by [`analysis_cache_key`]
    pub cache: ResultCache<MealAnalysis>,
    /// Remote call counter
    pub quota: QuotaCounter,
}

impl RouterState {
    /// Fresh state for `config` reading time from `clock`
    #[must_use]
    pub fn new(config: &RouterConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            cache: ResultCache::with_clock(config.cache_max_entries, config.cache_ttl, clock),
            quota: QuotaCounter::new(config.daily_quota),
        }
    }
}

/// Which branch produced an analysis
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisRoute {
    /// Served from the cache
    CacheHit,
    /// Remote analyzer answered
    Remote,
    /// Remote analyzer failed; local estimate returned instead
    FallbackAfterRemoteError {
        /// What went wrong
        error: RemoteAnalysisError,
    },
    /// Quota used up
    LocalQuotaExhausted,
    /// No remote analyzer configured
    LocalNoRemote,
    /// Circuit breaker rejected the call
    LocalCircuitOpen,
}

impl AnalysisRoute {
    /// Label for logs and CLI output
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::CacheHit => "cache_hit",
            Self::Remote => "remote",
            Self::FallbackAfterRemoteError { .. } => "fallback_after_remote_error",
            Self::LocalQuotaExhausted => "local_quota_exhausted",
            Self::LocalNoRemote => "local_no_remote",
            Self::LocalCircuitOpen => "local_circuit_open",
        }
    }

    /// Whether the local estimator produced the analysis
    #[must_use]
    pub const fn is_local(&self) -> bool {
        !matches!(self, Self::CacheHit | Self::Remote)
    }
}

/// Result of [`AnalysisRouter::analyze`]
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    /// The analysis
    pub analysis: MealAnalysis,
    /// How it was obtained
    pub route: AnalysisRoute,
    /// Complexity of the description as judged by the local estimator
    pub complexity: MealComplexity,
}

/// Routes meal analyses between the cache, a remote analyzer and the local estimator
pub struct AnalysisRouter {
    state: RouterState,
    remote: Option<Arc<dyn MealAnalyzer>>,
    breaker: CircuitBreaker,
    estimator: LocalEstimationEngine,
    config: RouterConfig,
}

impl AnalysisRouter {
    /// Router on the system clock
    #[must_use]
    pub fn new(config: RouterConfig, remote: Option<Arc<dyn MealAnalyzer>>) -> Self {
        Self::with_clock(config, remote, Arc::new(SystemClock))
    }

    /// Router whose cache reads time from `clock`
    #[must_use]
    pub fn with_clock(
        config: RouterConfig,
        remote: Option<Arc<dyn MealAnalyzer>>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let breaker_name = remote.as_ref().map_or("remote", |r| r.name());
        let breaker = CircuitBreaker::with_config(breaker_name, config.circuit_breaker.clone());
        info!(
            remote = breaker_name,
            remote_configured = remote.is_some(),
            daily_quota = config.daily_quota,
            match_mode = %config.match_mode,
            "Analysis router ready"
        );
        Self {
            state: RouterState::new(&config, clock),
            remote,
            breaker,
            estimator: LocalEstimationEngine::new(config.match_mode),
            config,
        }
    }

    /// Analyze one meal
    ///
    /// Never fails. Remote errors are logged and replaced by a local estimate.
    #[instrument(skip(self, request), fields(meal_type = %request.meal_type))]
    pub async fn analyze(&self, request: &MealAnalysisRequest) -> AnalysisOutcome {
        let key = analysis_cache_key(&request.meal_type, &request.description);
        let complexity = self.estimator.assess_complexity(&request.description);

        if let Some(analysis) = self.state.cache.get(&key) {
            debug!("Serving cached meal analysis");
            return AnalysisOutcome {
                analysis,
                route: AnalysisRoute::CacheHit,
                complexity,
            };
        }

        let route = match self.try_remote(request).await {
            RemoteAttempt::Succeeded(analysis) => {
                self.state.cache.put(key, analysis.clone());
                return AnalysisOutcome {
                    analysis,
                    route: AnalysisRoute::Remote,
                    complexity,
                };
            }
            RemoteAttempt::Skipped(route) => route,
            RemoteAttempt::Failed(error) => {
                warn!(
                    error = %error,
                    error_kind = ?error.kind(),
                    "Remote meal analysis failed, using local estimate"
                );
                AnalysisRoute::FallbackAfterRemoteError { error }
            }
        };

        let analysis = self
            .estimator
            .estimate(&request.description, &request.meal_type)
            .to_meal_analysis();
        let ttl = if matches!(route, AnalysisRoute::FallbackAfterRemoteError { .. }) {
            self.config.fallback_ttl
        } else {
            self.config.cache_ttl
        };
        self.state.cache.put_with_ttl(key, analysis.clone(), ttl);
        debug!(route = route.as_str(), "Served local meal estimate");

        AnalysisOutcome {
            analysis,
            route,
            complexity,
        }
    }

    async fn try_remote(&self, request: &MealAnalysisRequest) -> RemoteAttempt {
        let Some(remote) = self.remote.as_ref() else {
            return RemoteAttempt::Skipped(AnalysisRoute::LocalNoRemote);
        };
        // Quota first: a half-open probe must not go to a request the quota rejects
        let Some(reservation) = self.state.quota.try_reserve() else {
            debug!(max = self.state.quota.max(), "Remote analysis quota exhausted");
            return RemoteAttempt::Skipped(AnalysisRoute::LocalQuotaExhausted);
        };

        let limit = self.config.remote_timeout;
        let call = async {
            timeout(limit, remote.analyze(request))
                .await
                .unwrap_or(Err(RemoteAnalysisError::Timeout(limit)))
        };
        match self.breaker.call(call).await {
            Ok(analysis) => {
                reservation.commit();
                RemoteAttempt::Succeeded(analysis)
            }
            Err(GuardedCallError::CircuitOpen {
                retry_after_secs, ..
            }) => {
                debug!(retry_after_secs, "Circuit open, skipping remote analysis");
                RemoteAttempt::Skipped(AnalysisRoute::LocalCircuitOpen)
            }
            Err(GuardedCallError::Remote(error)) => RemoteAttempt::Failed(error),
        }
    }

    /// Remote quota usage
    #[must_use]
    pub fn quota_status(&self) -> QuotaStatus {
        self.state.quota.status()
    }

    /// Start a new quota period
    pub fn reset_quota(&self) {
        self.state.quota.reset();
    }

    /// Cache counters
    #[must_use]
    pub fn cache_stats(&self) -> CacheStats {
        self.state.cache.stats()
    }

    /// Drop expired cache entries, returning how many were removed
    pub fn purge_expired(&self) -> usize {
        self.state.cache.purge_expired()
    }

    /// Breaker state for the remote analyzer
    #[must_use]
    pub fn circuit_state(&self) -> CircuitState {
        self.breaker.state()
    }

    /// Whether a remote analyzer is configured
    #[must_use]
    pub fn has_remote(&self) -> bool {
        self.remote.is_some()
    }

    /// Settings in use
    #[must_use]
    pub const fn config(&self) -> &RouterConfig {
        &self.config
    }
}

impl fmt::Debug for AnalysisRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalysisRouter")
            .field("remote", &self.remote.as_ref().map(|r| r.name()))
            .field("quota", &self.state.quota.status())
            .field("circuit", &self.breaker.state())
            .finish_non_exhaustive()
    }
}

enum RemoteAttempt {
    Succeeded(MealAnalysis),
    Skipped(AnalysisRoute),
    Failed(RemoteAnalysisError),
}
