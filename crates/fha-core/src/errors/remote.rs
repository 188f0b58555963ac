// ABOUTME: Error types for the remote meal analysis collaborator
// ABOUTME: Every variant is transient from the router's point of view and triggers fallback
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::time::Duration;
use thiserror::Error;

use super::ErrorKind;

/// Failure of a remote analysis call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteAnalysisError {
    /// Call did not complete within the configured timeout
    #[error("remote analysis timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    /// Network-level failure (connect, TLS, body read)
    #[error("transport failure: {0}")]
    Transport(String),

    /// Service answered with a non-success status
    #[error("remote service returned {status}: {message}")]
    Api {
        /// HTTP status
        status: u16,
        /// Error body or summary
        message: String,
    },

    /// Service answered but the payload could not be understood
    #[error("malformed remote response: {0}")]
    MalformedResponse(String),
}

impl RemoteAnalysisError {
    /// Always [`ErrorKind::TransientRemote`]
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        ErrorKind::TransientRemote
    }

    /// Whether the failure says something about service health
    ///
    /// Rate limiting and server-side errors count against the circuit breaker,
    /// a 4xx caused by our own request does not.
    #[must_use]
    pub const fn indicates_outage(&self) -> bool {
        match self {
            Self::Timeout(_) | Self::Transport(_) => true,
            Self::Api { status, .. } => *status == 429 || *status >= 500,
            Self::MalformedResponse(_) => false,
        }
    }
}
