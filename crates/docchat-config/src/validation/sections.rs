//! Per-section validation rules.

use crate::schema::DocchatConfig;

use super::helpers::{validate_non_empty, validate_range, validate_range_f64};

pub(crate) fn validate_provider(errors: &mut Vec<String>, config: &DocchatConfig) {
    let p = &config.provider;
    validate_non_empty(errors, "provider.model", &p.model);
    validate_non_empty(errors, "provider.api_key_env", &p.api_key_env);
    for (name, url) in [
        ("provider.api_base", &p.api_base),
        ("provider.upload_base", &p.upload_base),
    ] {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            errors.push(format!("{name} = {url:?} must be an http(s) URL"));
        }
    }
    validate_range(
        errors,
        "provider.request_timeout_secs",
        p.request_timeout_secs,
        5,
        600,
    );
    validate_range(
        errors,
        "provider.activation_poll_ms",
        p.activation_poll_ms,
        100,
        60_000,
    );
    validate_range(
        errors,
        "provider.activation_max_polls",
        p.activation_max_polls,
        1,
        600,
    );
}

pub(crate) fn validate_generation(errors: &mut Vec<String>, config: &DocchatConfig) {
    let g = &config.generation;
    validate_range_f64(errors, "generation.temperature", g.temperature, 0.0, 2.0);
    validate_range_f64(errors, "generation.top_p", g.top_p, 0.0, 1.0);
    validate_range(errors, "generation.top_k", g.top_k, 1, 1000);
    validate_range(
        errors,
        "generation.max_output_tokens",
        g.max_output_tokens,
        1,
        65_536,
    );
}

pub(crate) fn validate_chat(errors: &mut Vec<String>, config: &DocchatConfig) {
    validate_non_empty(errors, "chat.seed_question", &config.chat.seed_question);
}

pub(crate) fn validate_upload(errors: &mut Vec<String>, config: &DocchatConfig) {
    let u = &config.upload;
    validate_range(errors, "upload.max_files", u.max_files, 1, 100);
    validate_range(errors, "upload.max_file_size_mb", u.max_file_size_mb, 1, 2048);
}

pub(crate) fn validate_server(errors: &mut Vec<String>, config: &DocchatConfig) {
    let s = &config.server;
    validate_non_empty(errors, "server.bind", &s.bind);
    if s.port == 0 {
        errors.push("server.port must not be 0".into());
    }
    if s.reap_interval_secs == 0 {
        errors.push("server.reap_interval_secs must not be 0".into());
    }
    if s.hello_timeout_secs == 0 {
        errors.push("server.hello_timeout_secs must not be 0".into());
    }
}
