//! WebSocket server configuration.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
    /// Detached sessions older than this are cleaned up and dropped.
    pub session_ttl_secs: u64,
    pub reap_interval_secs: u64,
    pub hello_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".into(),
            port: 8501,
            session_ttl_secs: 1800,
            reap_interval_secs: 60,
            hello_timeout_secs: 10,
        }
    }
}

impl ServerConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}
