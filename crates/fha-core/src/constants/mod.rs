// ABOUTME: Application constants organized by domain
// ABOUTME: Prediction windows, covariate bounds, cache TTLs and quota defaults
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Analysis cache TTL and capacity defaults
pub mod cache;

/// Sequence window, channel defaults and survival horizon
pub mod prediction;

/// Remote analysis quota, timeout and model defaults
pub mod analysis;
