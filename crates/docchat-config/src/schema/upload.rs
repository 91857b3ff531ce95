//! Upload intake limits, staging location and toast timings.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// Where uploaded bytes are staged before hand-off. `None` = OS temp dir.
    pub staging_dir: Option<PathBuf>,
    /// Maximum files per batch (valid range: 1-100).
    pub max_files: u32,
    pub max_file_size_mb: u32,
    pub upload_toast_ms: u32,
    pub delete_toast_ms: u32,
    pub summary_toast_ms: u32,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            staging_dir: None,
            max_files: 10,
            max_file_size_mb: 50,
            upload_toast_ms: 2000,
            delete_toast_ms: 1000,
            summary_toast_ms: 2000,
        }
    }
}

impl UploadConfig {
    pub fn max_file_size_bytes(&self) -> usize {
        (self.max_file_size_mb as usize).saturating_mul(1024 * 1024)
    }
}
