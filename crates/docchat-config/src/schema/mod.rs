//! Configuration schema types for docchat.
//!
//! All structs use `serde(default)` so partial configs work correctly.
//! Missing fields are filled with the defaults the service ships with.

mod chat;
mod generation;
mod logging;
mod provider;
mod server;
mod upload;

pub use chat::*;
pub use generation::*;
pub use logging::*;
pub use provider::*;
pub use server::*;
pub use upload::*;

use serde::{Deserialize, Serialize};

/// Current config schema version.
pub const CONFIG_SCHEMA_VERSION: u32 = 1;

/// Root configuration for docchat.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DocchatConfig {
    pub provider: ProviderConfig,
    pub generation: GenerationConfig,
    pub chat: ChatConfig,
    pub upload: UploadConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}
