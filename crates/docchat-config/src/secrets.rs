//! API key resolution.
//!
//! Resolution order:
//! 1. the env var named by `provider.api_key_env`
//! 2. `GEMINI_API_KEY`
//! 3. `GOOGLE_API_KEY` in `<config_dir>/docchat/secrets.toml`

use std::path::Path;

use docchat_common::ConfigError;
use serde::Deserialize;
use tracing::debug;

use crate::schema::ProviderConfig;
use crate::toml_loader::config_dir;

const FALLBACK_ENV: &str = "GEMINI_API_KEY";
const SECRETS_FILE: &str = "secrets.toml";

#[derive(Debug, Default, Deserialize)]
struct SecretsFile {
    #[serde(rename = "GOOGLE_API_KEY")]
    google_api_key: Option<String>,
}

/// Resolve the provider API key from the environment or the secrets file.
pub fn resolve_api_key(provider: &ProviderConfig) -> Result<String, ConfigError> {
    let secrets_path = config_dir()?.join(SECRETS_FILE);
    resolve_api_key_with(provider, |name| std::env::var(name).ok(), &secrets_path)
}

/// Resolution with an injectable env lookup and secrets path.
pub fn resolve_api_key_with(
    provider: &ProviderConfig,
    env: impl Fn(&str) -> Option<String>,
    secrets_path: &Path,
) -> Result<String, ConfigError> {
    for name in [provider.api_key_env.as_str(), FALLBACK_ENV] {
        if let Some(key) = env(name).filter(|k| !k.trim().is_empty()) {
            debug!(source = name, "api key resolved from environment");
            return Ok(key.trim().to_string());
        }
    }

    if let Some(key) = read_secrets_file(secrets_path)? {
        debug!(source = %secrets_path.display(), "api key resolved from secrets file");
        return Ok(key);
    }

    Err(ConfigError::MissingApiKey(provider.api_key_env.clone()))
}

fn read_secrets_file(path: &Path) -> Result<Option<String>, ConfigError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(ConfigError::ParseError(format!(
                "failed to read {}: {e}",
                path.display()
            )))
        }
    };
    let secrets: SecretsFile = toml::from_str(&content).map_err(|e| {
        ConfigError::ParseError(format!("failed to parse {}: {e}", path.display()))
    })?;
    Ok(secrets
        .google_api_key
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty()))
}
