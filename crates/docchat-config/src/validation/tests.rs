//! Tests for the full validation pipeline.

use super::*;

#[test]
fn default_config_validates() {
    let config = DocchatConfig::default();
    assert!(validate(&config).is_ok());
}

#[test]
fn catches_temperature_out_of_range() {
    let mut config = DocchatConfig::default();
    config.generation.temperature = 2.5;
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("generation.temperature"));
}

#[test]
fn catches_nan_top_p() {
    let mut config = DocchatConfig::default();
    config.generation.top_p = f64::NAN;
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("generation.top_p"));
}

#[test]
fn catches_zero_top_k() {
    let mut config = DocchatConfig::default();
    config.generation.top_k = 0;
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("generation.top_k"));
}

#[test]
fn catches_blank_seed_question() {
    let mut config = DocchatConfig::default();
    config.chat.seed_question = "   ".into();
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("chat.seed_question must not be empty"));
}

#[test]
fn catches_non_http_api_base() {
    let mut config = DocchatConfig::default();
    config.provider.api_base = "ftp://example.com".into();
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("provider.api_base"));
}

#[test]
fn catches_zero_port() {
    let mut config = DocchatConfig::default();
    config.server.port = 0;
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("server.port"));
}

#[test]
fn catches_max_files_zero() {
    let mut config = DocchatConfig::default();
    config.upload.max_files = 0;
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("upload.max_files"));
}

#[test]
fn collects_multiple_errors() {
    let mut config = DocchatConfig::default();
    config.generation.top_k = 0;
    config.provider.model = String::new();
    config.upload.max_files = 500;
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("generation.top_k"));
    assert!(err.contains("provider.model"));
    assert!(err.contains("upload.max_files"));
    assert_eq!(err.matches("; ").count(), 2);
}

#[test]
fn boundary_values_are_valid() {
    let mut config = DocchatConfig::default();
    config.generation.temperature = 0.0;
    config.generation.top_p = 1.0;
    config.generation.top_k = 1;
    config.generation.max_output_tokens = 65_536;
    config.upload.max_files = 100;
    assert!(validate(&config).is_ok());
}
