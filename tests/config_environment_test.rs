// ABOUTME: Unit tests for environment-driven configuration
// ABOUTME: Validates defaults, overrides, validation failures and secret redaction
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use fha_intelligence::MatchMode;
use fha_recovery::config::environment::{
    ARTIFACT_DIR_ENV, CACHE_MAX_ENTRIES_ENV, CACHE_TTL_ENV, DAILY_QUOTA_ENV, FALLBACK_TTL_ENV,
    GEMINI_API_KEY_ENV, GEMINI_MODEL_ENV, INFERENCE_MAX_CONCURRENCY_ENV, MATCH_MODE_ENV,
    REMOTE_TIMEOUT_ENV,
};
use fha_recovery::config::{RecoveryConfig, RemoteAnalysisConfig};
use serial_test::serial;

const ALL_VARS: [&str; 10] = [
    ARTIFACT_DIR_ENV,
    DAILY_QUOTA_ENV,
    CACHE_TTL_ENV,
    FALLBACK_TTL_ENV,
    CACHE_MAX_ENTRIES_ENV,
    REMOTE_TIMEOUT_ENV,
    GEMINI_API_KEY_ENV,
    GEMINI_MODEL_ENV,
    INFERENCE_MAX_CONCURRENCY_ENV,
    MATCH_MODE_ENV,
];

fn clear_env() {
    for var in ALL_VARS {
        env::remove_var(var);
    }
}

#[test]
#[serial]
fn test_empty_environment_yields_local_only_defaults() {
    clear_env();
    let config = RecoveryConfig::from_env().unwrap();

    assert_eq!(config.artifact_dir, PathBuf::from("./artifacts"));
    assert_eq!(config.daily_quota, 50);
    assert_eq!(config.cache_ttl, Duration::from_secs(86_400));
    assert_eq!(config.fallback_ttl, config.cache_ttl);
    assert_eq!(config.remote_timeout, Duration::from_secs(30));
    assert_eq!(config.match_mode, MatchMode::WordBoundary);
    assert!(config.remote.is_none());
}

#[test]
#[serial]
fn test_overrides_are_parsed() {
    clear_env();
    env::set_var(ARTIFACT_DIR_ENV, "/srv/models");
    env::set_var(DAILY_QUOTA_ENV, "7");
    env::set_var(CACHE_TTL_ENV, "600");
    env::set_var(FALLBACK_TTL_ENV, "120");
    env::set_var(CACHE_MAX_ENTRIES_ENV, " 32 ");
    env::set_var(REMOTE_TIMEOUT_ENV, "5");
    env::set_var(INFERENCE_MAX_CONCURRENCY_ENV, "2");
    env::set_var(MATCH_MODE_ENV, "substring");
    env::set_var(GEMINI_API_KEY_ENV, "secret-key");
    env::set_var(GEMINI_MODEL_ENV, "gemini-test");

    let config = RecoveryConfig::from_env().unwrap();
    clear_env();

    assert_eq!(config.artifact_dir, PathBuf::from("/srv/models"));
    assert_eq!(config.daily_quota, 7);
    assert_eq!(config.cache_ttl, Duration::from_secs(600));
    assert_eq!(config.fallback_ttl, Duration::from_secs(120));
    assert_eq!(config.cache_max_entries, 32);
    assert_eq!(config.remote_timeout, Duration::from_secs(5));
    assert_eq!(config.inference_max_concurrency, 2);
    assert_eq!(config.match_mode, MatchMode::Substring);
    assert_eq!(
        config.remote,
        Some(RemoteAnalysisConfig {
            api_key: "secret-key".to_owned(),
            model: "gemini-test".to_owned(),
        })
    );

    let router = config.router_config();
    assert_eq!(router.daily_quota, 7);
    assert_eq!(router.fallback_ttl, Duration::from_secs(120));
    assert_eq!(router.match_mode, MatchMode::Substring);
}

#[test]
#[serial]
fn test_fallback_ttl_follows_cache_ttl_when_unset() {
    clear_env();
    env::set_var(CACHE_TTL_ENV, "900");
    let config = RecoveryConfig::from_env().unwrap();
    clear_env();

    assert_eq!(config.fallback_ttl, Duration::from_secs(900));
}

#[test]
#[serial]
fn test_blank_api_key_disables_remote() {
    clear_env();
    env::set_var(GEMINI_API_KEY_ENV, "   ");
    let config = RecoveryConfig::from_env().unwrap();
    clear_env();

    assert!(config.remote.is_none());
}

#[test]
#[serial]
fn test_unparseable_value_is_an_error() {
    clear_env();
    env::set_var(DAILY_QUOTA_ENV, "fifty");
    let err = RecoveryConfig::from_env().unwrap_err();
    clear_env();

    assert!(err.to_string().contains(DAILY_QUOTA_ENV));
}

#[test]
#[serial]
fn test_unknown_match_mode_is_an_error() {
    clear_env();
    env::set_var(MATCH_MODE_ENV, "fuzzy");
    let result = RecoveryConfig::from_env();
    clear_env();

    assert!(result.is_err());
}

#[test]
#[serial]
fn test_zero_values_fail_validation() {
    clear_env();
    env::set_var(CACHE_MAX_ENTRIES_ENV, "0");
    assert!(RecoveryConfig::from_env().is_err());

    clear_env();
    env::set_var(REMOTE_TIMEOUT_ENV, "0");
    assert!(RecoveryConfig::from_env().is_err());

    clear_env();
    env::set_var(INFERENCE_MAX_CONCURRENCY_ENV, "0");
    assert!(RecoveryConfig::from_env().is_err());
    clear_env();
}

#[test]
fn test_zero_quota_is_valid() {
    let config = RecoveryConfig {
        daily_quota: 0,
        ..RecoveryConfig::default()
    };
    assert!(config.validate().is_ok());
}

#[test]
fn test_api_key_never_printed() {
    let config = RecoveryConfig {
        remote: Some(RemoteAnalysisConfig {
            api_key: "top-secret".to_owned(),
            model: "gemini-2.0-flash".to_owned(),
        }),
        ..RecoveryConfig::default()
    };

    let summary = config.summary();
    assert!(summary.contains("Enabled (gemini-2.0-flash)"));
    assert!(!summary.contains("top-secret"));
    assert!(!format!("{config:?}").contains("top-secret"));
}
