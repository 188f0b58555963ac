// ABOUTME: Circuit breaker guarding the remote meal analysis service
// ABOUTME: Opens after consecutive outages so the router goes straight to local estimation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use fha_core::errors::RemoteAnalysisError;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

/// Circuit breaker states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CircuitState {
    /// Normal operation - calls pass through
    Closed,
    /// Tripped - calls are rejected until the recovery timeout elapses
    Open,
    /// Probing - a single call is let through to test the service
    HalfOpen,
}

impl CircuitState {
    const fn from_u32(value: u32) -> Self {
        match value {
            0 => Self::Closed,
            1 => Self::Open,
            _ => Self::HalfOpen,
        }
    }

    const fn to_u32(self) -> u32 {
        match self {
            Self::Closed => 0,
            Self::Open => 1,
            Self::HalfOpen => 2,
        }
    }
}

/// Thresholds and timeouts
#[derive(Debug, Clone)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures before the circuit opens
    pub failure_threshold: u32,
    /// Time spent open before a probe is allowed
    pub recovery_timeout: Duration,
    /// Successful probes needed to close again
    pub success_threshold: u32,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            recovery_timeout: Duration::from_secs(30),
            success_threshold: 2,
        }
    }
}

impl CircuitBreakerConfig {
    /// Custom configuration
    #[must_use]
    pub const fn new(
        failure_threshold: u32,
        recovery_timeout: Duration,
        success_threshold: u32,
    ) -> Self {
        Self {
            failure_threshold,
            recovery_timeout,
            success_threshold,
        }
    }

    /// Trip early and wait longer
    #[must_use]
    pub const fn strict() -> Self {
        Self {
            failure_threshold: 3,
            recovery_timeout: Duration::from_secs(60),
            success_threshold: 3,
        }
    }

    /// Tolerate more failures and probe sooner
    #[must_use]
    pub const fn lenient() -> Self {
        Self {
            failure_threshold: 10,
            recovery_timeout: Duration::from_secs(15),
            success_threshold: 1,
        }
    }
}

/// Outcome of a guarded call that did not succeed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GuardedCallError {
    /// Circuit is open; the call was not attempted
    #[error("circuit open for {service}, retry in {retry_after_secs}s")]
    CircuitOpen {
        /// Guarded service
        service: String,
        /// Seconds until a probe is allowed
        retry_after_secs: u64,
    },
    /// Call was attempted and failed
    #[error(transparent)]
    Remote(#[from] RemoteAnalysisError),
}

/// Lock-free circuit breaker
///
/// Only failures for which [`RemoteAnalysisError::indicates_outage`] holds
/// are counted. In half-open state exactly one probe is in flight at a time.
#[derive(Debug)]
pub struct CircuitBreaker {
    service_name: String,
    state: AtomicU32,
    failure_count: AtomicU32,
    success_count: AtomicU32,
    /// Millis since `start_instant` when the circuit last opened
    opened_at_ms: AtomicU64,
    probe_in_flight: AtomicBool,
    config: CircuitBreakerConfig,
    start_instant: Instant,
}

impl CircuitBreaker {
    /// Breaker with the default thresholds
    #[must_use]
    pub fn new(service_name: &str) -> Self {
        Self::with_config(service_name, CircuitBreakerConfig::default())
    }

    /// Breaker with custom thresholds
    #[must_use]
    pub fn with_config(service_name: &str, config: CircuitBreakerConfig) -> Self {
        Self {
            service_name: service_name.to_owned(),
            state: AtomicU32::new(CircuitState::Closed.to_u32()),
            failure_count: AtomicU32::new(0),
            success_count: AtomicU32::new(0),
            opened_at_ms: AtomicU64::new(0),
            probe_in_flight: AtomicBool::new(false),
            config,
            start_instant: Instant::now(),
        }
    }

    /// Current state
    #[must_use]
    pub fn state(&self) -> CircuitState {
        CircuitState::from_u32(self.state.load(Ordering::SeqCst))
    }

    /// Consecutive failures counted while closed
    #[must_use]
    pub fn failure_count(&self) -> u32 {
        self.failure_count.load(Ordering::SeqCst)
    }

    /// Whether a call may go through now
    ///
    /// A `true` answer in open or half-open state claims the single probe slot,
    /// which is handed back by the next [`Self::record_success`] or
    /// [`Self::record_failure`].
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        self.admit().is_some()
    }

    /// `Some(true)` when the admitted call holds the probe slot
    fn admit(&self) -> Option<bool> {
        match self.state() {
            CircuitState::Closed => Some(false),
            CircuitState::Open => self.try_begin_recovery().then_some(true),
            CircuitState::HalfOpen => self
                .probe_in_flight
                .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
                .is_ok()
                .then_some(true),
        }
    }

    /// Admit a call, returning a permit that settles its outcome
    ///
    /// A probe permit dropped before it is settled re-opens the circuit, so
    /// a cancelled probe cannot hold the half-open slot.
    #[must_use]
    pub fn permit(&self) -> Option<CallPermit<'_>> {
        self.admit().map(|probe| CallPermit {
            breaker: self,
            probe,
            settled: false,
        })
    }

    fn try_begin_recovery(&self) -> bool {
        if self.millis_since_open() < self.recovery_ms() {
            return false;
        }
        let moved = self
            .state
            .compare_exchange(
                CircuitState::Open.to_u32(),
                CircuitState::HalfOpen.to_u32(),
                Ordering::SeqCst,
                Ordering::SeqCst,
            )
            .is_ok();
        if moved {
            self.probe_in_flight.store(true, Ordering::SeqCst);
            info!(
                service = %self.service_name,
                "Circuit breaker half-open, probing remote service"
            );
        }
        moved
    }

    fn elapsed_millis(&self) -> u64 {
        self.start_instant.elapsed().as_millis() as u64
    }

    fn recovery_ms(&self) -> u64 {
        self.config.recovery_timeout.as_millis() as u64
    }

    fn millis_since_open(&self) -> u64 {
        self.elapsed_millis()
            .saturating_sub(self.opened_at_ms.load(Ordering::SeqCst))
    }

    fn open(&self) {
        self.state
            .store(CircuitState::Open.to_u32(), Ordering::SeqCst);
        self.opened_at_ms
            .store(self.elapsed_millis(), Ordering::SeqCst);
        self.success_count.store(0, Ordering::SeqCst);
        self.probe_in_flight.store(false, Ordering::SeqCst);
    }

    fn abandon_probe(&self) {
        let reopened = self
            .state
            .compare_exchange(
                CircuitState::HalfOpen.to_u32(),
                CircuitState::Open.to_u32(),
                Ordering::SeqCst,
                Ordering::SeqCst,
            )
            .is_ok();
        if reopened {
            self.opened_at_ms
                .store(self.elapsed_millis(), Ordering::SeqCst);
            self.success_count.store(0, Ordering::SeqCst);
        }
        self.probe_in_flight.store(false, Ordering::SeqCst);
        warn!(
            service = %self.service_name,
            reopened,
            "Circuit breaker probe abandoned before completion"
        );
    }

    /// Count a successful call
    pub fn record_success(&self) {
        match self.state() {
            CircuitState::Closed => self.failure_count.store(0, Ordering::SeqCst),
            CircuitState::HalfOpen => {
                let count = self.success_count.fetch_add(1, Ordering::SeqCst) + 1;
                if count >= self.config.success_threshold {
                    self.state
                        .store(CircuitState::Closed.to_u32(), Ordering::SeqCst);
                    self.failure_count.store(0, Ordering::SeqCst);
                    self.success_count.store(0, Ordering::SeqCst);
                    info!(service = %self.service_name, "Circuit breaker closed, service recovered");
                }
                self.probe_in_flight.store(false, Ordering::SeqCst);
            }
            CircuitState::Open => {}
        }
    }

    /// Count a failed call
    pub fn record_failure(&self) {
        match self.state() {
            CircuitState::Closed => {
                let count = self.failure_count.fetch_add(1, Ordering::SeqCst) + 1;
                if count >= self.config.failure_threshold {
                    self.open();
                    warn!(
                        service = %self.service_name,
                        failures = count,
                        threshold = self.config.failure_threshold,
                        recovery_timeout_secs = self.config.recovery_timeout.as_secs(),
                        "Circuit breaker opened, remote service failing"
                    );
                }
            }
            CircuitState::HalfOpen => {
                self.open();
                warn!(service = %self.service_name, "Circuit breaker re-opened, probe failed");
            }
            CircuitState::Open => {
                self.opened_at_ms
                    .store(self.elapsed_millis(), Ordering::SeqCst);
            }
        }
    }

    /// Run `operation` if the circuit allows it and record the outcome
    ///
    /// # Errors
    ///
    /// [`GuardedCallError::CircuitOpen`] without running the operation when the
    /// circuit rejects calls, otherwise [`GuardedCallError::Remote`] with the
    /// operation's own error.
    pub async fn call<F, T>(&self, operation: F) -> Result<T, GuardedCallError>
    where
        F: Future<Output = Result<T, RemoteAnalysisError>>,
    {
        let Some(permit) = self.permit() else {
            return Err(GuardedCallError::CircuitOpen {
                service: self.service_name.clone(),
                retry_after_secs: self.time_until_recovery(),
            });
        };

        match operation.await {
            Ok(value) => {
                permit.settle(true);
                Ok(value)
            }
            Err(error) => {
                // A non-outage error still means the service answered
                permit.settle(!error.indicates_outage());
                Err(error.into())
            }
        }
    }

    /// Seconds until a probe is allowed, rounded up
    #[must_use]
    pub fn time_until_recovery(&self) -> u64 {
        self.recovery_ms()
            .saturating_sub(self.millis_since_open())
            .saturating_add(999)
            / 1000
    }

    /// Force the circuit closed
    pub fn reset(&self) {
        self.state
            .store(CircuitState::Closed.to_u32(), Ordering::SeqCst);
        self.failure_count.store(0, Ordering::SeqCst);
        self.success_count.store(0, Ordering::SeqCst);
        self.probe_in_flight.store(false, Ordering::SeqCst);
        info!(service = %self.service_name, "Circuit breaker manually reset");
    }
}

/// Admission to a guarded call
///
/// Settle it with the call's outcome. Dropping an unsettled probe permit
/// re-opens the circuit and frees the probe slot.
#[derive(Debug)]
#[must_use]
pub struct CallPermit<'a> {
    breaker: &'a CircuitBreaker,
    probe: bool,
    settled: bool,
}

impl CallPermit<'_> {
    /// Whether this permit holds the half-open probe slot
    #[must_use]
    pub const fn is_probe(&self) -> bool {
        self.probe
    }

    /// Record the outcome of the admitted call
    pub fn settle(mut self, succeeded: bool) {
        self.settled = true;
        if succeeded {
            self.breaker.record_success();
        } else {
            self.breaker.record_failure();
        }
    }
}

impl Drop for CallPermit<'_> {
    fn drop(&mut self) {
        if self.probe && !self.settled {
            self.breaker.abandon_probe();
        }
    }
}
