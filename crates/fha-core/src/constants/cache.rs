// ABOUTME: Cache-related constants for analysis result TTL and capacity
// ABOUTME: Defaults mirror a one-day validity window for meal analyses
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Analysis result TTL (24 hours)
pub const TTL_ANALYSIS_SECS: u64 = 86_400;

/// Default maximum cache entries before LRU eviction
pub const DEFAULT_CACHE_MAX_ENTRIES: usize = 10_000;
