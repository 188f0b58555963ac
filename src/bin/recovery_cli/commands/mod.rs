// ABOUTME: Command handlers for fha-recovery-cli
// ABOUTME: One module per concern: status, forecasting, meal analysis
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

pub mod analyze;
pub mod forecast;
pub mod status;
