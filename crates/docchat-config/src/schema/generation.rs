//! Sampling parameters sent with every generation request.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// 0.0-2.0
    pub temperature: f64,
    /// 0.0-1.0
    pub top_p: f64,
    pub top_k: u32,
    /// 1-65536
    pub max_output_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.3,
            top_p: 0.95,
            top_k: 64,
            max_output_tokens: 8192,
        }
    }
}
