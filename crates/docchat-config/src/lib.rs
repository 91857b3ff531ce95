//! docchat configuration system.
//!
//! Provides TOML-based configuration with validation and API key
//! resolution. All config sections use sensible defaults so partial
//! configs work out of the box.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use docchat_config::{config_to_json, load_config};
//!
//! let config = load_config(None).expect("failed to load config");
//! println!("{}", config_to_json(&config));
//! ```

pub mod schema;
pub mod secrets;
pub mod toml_loader;
pub mod validation;

pub use schema::{DocchatConfig, CONFIG_SCHEMA_VERSION};
pub use secrets::resolve_api_key;

use std::path::Path;

use docchat_common::ConfigError;

/// Load and validate config.
///
/// With an explicit `path` the file must exist. Without one, `config.toml`
/// is read from the OS config directory and created with defaults if missing.
pub fn load_config(path: Option<&Path>) -> Result<DocchatConfig, ConfigError> {
    let config = match path {
        Some(path) => toml_loader::load_from_path(path)?,
        None => toml_loader::load_default()?,
    };
    validation::validate(&config)?;
    Ok(config)
}

/// Serialize a config to a pretty-printed JSON string.
pub fn config_to_json(config: &DocchatConfig) -> String {
    serde_json::to_string_pretty(config)
        .unwrap_or_else(|e| format!("{{\"error\": \"failed to serialize config: {e}\"}}"))
}
