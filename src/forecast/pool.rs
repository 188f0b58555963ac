// ABOUTME: Bounded pool for CPU-bound model inference on the blocking thread pool
// ABOUTME: A semaphore caps how many inferences run at once
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use fha_core::errors::{AppError, AppResult};
use tokio::sync::Semaphore;
use tokio::task;
use tracing::warn;

/// Runs closures on `spawn_blocking`, at most `max_concurrency` at a time
#[derive(Debug, Clone)]
pub struct InferencePool {
    permits: Arc<Semaphore>,
    max_concurrency: usize,
}

impl InferencePool {
    /// Pool admitting `max_concurrency` jobs (at least one)
    #[must_use]
    pub fn new(max_concurrency: usize) -> Self {
        let max_concurrency = max_concurrency.max(1);
        Self {
            permits: Arc::new(Semaphore::new(max_concurrency)),
            max_concurrency,
        }
    }

    /// Concurrency ceiling
    #[must_use]
    pub const fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    /// Permits not currently held
    #[must_use]
    pub fn available_permits(&self) -> usize {
        self.permits.available_permits()
    }

    /// Run `job` once a permit is free
    ///
    /// # Errors
    ///
    /// [`AppError::internal`] if the pool is closed or the job panicked.
    pub async fn run<F, T>(&self, job: F) -> AppResult<T>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let permit = Arc::clone(&self.permits)
            .acquire_owned()
            .await
            .map_err(|e| AppError::internal(format!("inference pool closed: {e}")))?;

        task::spawn_blocking(move || {
            let _permit = permit;
            job()
        })
        .await
        .map_err(|e| {
            warn!(error = %e, "Inference task failed");
            AppError::internal(format!("inference task failed: {e}"))
        })
    }
}
