//! Config environment variable tests
//!
//! These tests verify that Config::from_env() correctly reads and applies
//! environment variable overrides. Tests use #[serial] to prevent race
//! conditions with shared env vars, and every test sets the variables it
//! depends on.

use serial_test::serial;
use std::env;

use argus_engine::config::{Config, LogFormat};
use argus_engine::error::EngineError;

fn set_api_key() {
    env::set_var("REASONING_API_KEY", "test-key");
}

#[test]
#[serial]
fn test_missing_api_key_is_a_config_error() {
    env::remove_var("REASONING_API_KEY");

    let result = Config::from_env();
    match result {
        Err(EngineError::Config { message }) => {
            assert!(message.contains("REASONING_API_KEY"));
        }
        other => panic!("expected Config error, got {:?}", other.map(|_| ())),
    }
}

#[test]
#[serial]
fn test_defaults_when_only_api_key_set() {
    set_api_key();
    env::remove_var("REASONING_BASE_URL");
    env::remove_var("MAX_CONCURRENCY");
    env::remove_var("PIPE_DECOMPOSE");

    let config = Config::from_env().unwrap();
    assert_eq!(config.gateway.base_url, "https://api.langbase.com");
    assert_eq!(config.request.timeout_ms, 30000);
    assert_eq!(config.engine.max_concurrency, 5);
    assert_eq!(config.engine.max_rounds, 10);
    assert_eq!(config.tasks.decompose, "argument-decompose-v1");
    assert_eq!(config.tasks.fallacies, "fallacy-detect-v1");
    assert_eq!(config.scoring.collapse_threshold, 0.6);
    assert_eq!(config.scoring.severe_threshold, 0.8);
    assert_eq!(config.logging.format, LogFormat::Pretty);
}

#[test]
#[serial]
fn test_custom_base_url_and_pipes() {
    set_api_key();
    env::set_var("REASONING_BASE_URL", "https://custom.api.com");
    env::set_var("PIPE_DECOMPOSE", "decompose-v2");
    env::set_var("PIPE_ATTACK", "attack-v2");

    let config = Config::from_env().unwrap();
    assert_eq!(config.gateway.base_url, "https://custom.api.com");
    assert_eq!(config.tasks.decompose, "decompose-v2");
    assert_eq!(config.tasks.attack, "attack-v2");
    // Unset pipes keep their defaults
    assert_eq!(config.tasks.defend, "claim-defend-v1");

    env::remove_var("REASONING_BASE_URL");
    env::remove_var("PIPE_DECOMPOSE");
    env::remove_var("PIPE_ATTACK");
}

#[test]
#[serial]
fn test_custom_request_and_engine_limits() {
    set_api_key();
    env::set_var("REQUEST_TIMEOUT_MS", "60000");
    env::set_var("MAX_RETRIES", "5");
    env::set_var("MAX_CONCURRENCY", "2");
    env::set_var("MAX_ROUNDS", "4");

    let config = Config::from_env().unwrap();
    assert_eq!(config.request.timeout_ms, 60000);
    assert_eq!(config.request.max_retries, 5);
    assert_eq!(config.engine.max_concurrency, 2);
    assert_eq!(config.engine.max_rounds, 4);

    env::remove_var("REQUEST_TIMEOUT_MS");
    env::remove_var("MAX_RETRIES");
    env::remove_var("MAX_CONCURRENCY");
    env::remove_var("MAX_ROUNDS");
}

#[test]
#[serial]
fn test_scoring_threshold_overrides() {
    set_api_key();
    env::set_var("SCORING_COLLAPSE_THRESHOLD", "0.5");
    env::set_var("SCORING_SEVERE_THRESHOLD", "0.9");

    let config = Config::from_env().unwrap();
    assert_eq!(config.scoring.collapse_threshold, 0.5);
    assert_eq!(config.scoring.severe_threshold, 0.9);
    // Weights keep their defaults
    assert_eq!(config.scoring.weight_severe, 1.0);

    env::remove_var("SCORING_COLLAPSE_THRESHOLD");
    env::remove_var("SCORING_SEVERE_THRESHOLD");
}

#[test]
#[serial]
fn test_invalid_number_uses_default() {
    set_api_key();
    env::set_var("MAX_CONCURRENCY", "not-a-number");

    let config = Config::from_env().unwrap();
    assert_eq!(config.engine.max_concurrency, 5);

    env::remove_var("MAX_CONCURRENCY");
}

#[test]
#[serial]
fn test_json_log_format() {
    set_api_key();
    env::set_var("LOG_FORMAT", "json");

    let config = Config::from_env().unwrap();
    assert_eq!(config.logging.format, LogFormat::Json);

    env::remove_var("LOG_FORMAT");
}

#[test]
#[serial]
fn test_log_level_override() {
    set_api_key();
    env::set_var("LOG_LEVEL", "debug");

    let config = Config::from_env().unwrap();
    assert_eq!(config.logging.level, "debug");

    env::remove_var("LOG_LEVEL");
}
