//! Remote model provider configuration.

use serde::{Deserialize, Serialize};

/// Which model to call and where the Gemini endpoints live.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub model: String,
    /// Base URL for `models/*` and `files/*` resources.
    pub api_base: String,
    /// Base URL for media uploads.
    pub upload_base: String,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    /// Whole-request timeout in seconds (valid range: 5-600).
    pub request_timeout_secs: u32,
    /// Delay between polls while an uploaded file is still processing.
    pub activation_poll_ms: u32,
    /// Give up on a processing file after this many polls.
    pub activation_max_polls: u32,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            model: "gemini-1.5-flash".into(),
            api_base: "https://generativelanguage.googleapis.com/v1beta".into(),
            upload_base: "https://generativelanguage.googleapis.com/upload/v1beta".into(),
            api_key_env: "GOOGLE_API_KEY".into(),
            request_timeout_secs: 120,
            activation_poll_ms: 1000,
            activation_max_polls: 30,
        }
    }
}
