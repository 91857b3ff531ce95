//! Full configuration validation.
//!
//! Each section has its own check in `sections`; this orchestrator calls
//! them all and collects errors into a single `ConfigError`.

mod helpers;
mod sections;

#[cfg(test)]
mod tests;

use crate::schema::DocchatConfig;
use docchat_common::ConfigError;

/// Run all validations on a config, collecting all errors.
pub fn validate(config: &DocchatConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    sections::validate_provider(&mut errors, config);
    sections::validate_generation(&mut errors, config);
    sections::validate_chat(&mut errors, config);
    sections::validate_upload(&mut errors, config);
    sections::validate_server(&mut errors, config);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}
