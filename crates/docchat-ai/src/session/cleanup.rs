//! Cleanup stage: delete every remote file and reset the session.

use docchat_common::Notification;
use tracing::{info, warn};

use crate::AiClient;

use super::manager::Session;
use super::types::{CleanupError, Phase};

impl Session {
    /// Delete all active files remotely, then clear files and transcript.
    ///
    /// Every deletion is attempted; failures are collected and returned
    /// after the reset, which happens regardless.
    pub async fn cleanup(&mut self, client: &dyn AiClient) -> Result<(), Vec<CleanupError>> {
        let mut failures = Vec::new();

        for file in &self.active_files {
            match client.delete_file(&file.remote_id).await {
                Ok(()) => self.notify(Notification::success(
                    format!("Deleted file: {}", file.remote_id),
                    self.settings.delete_toast,
                )),
                Err(source) => {
                    warn!(remote_id = %file.remote_id, error = %source, "delete failed");
                    failures.push(CleanupError {
                        remote_id: file.remote_id.clone(),
                        source,
                    });
                }
            }
        }

        let held = self.active_files.len();
        self.active_files.clear();
        self.transcript.clear();
        self.tracker.reset();
        self.phase = Phase::AwaitingUpload;

        if held > 0 {
            if failures.is_empty() {
                self.notify(Notification::success(
                    "All uploaded files have been deleted.",
                    self.settings.summary_toast,
                ));
            } else {
                self.notify(Notification::warning(format!(
                    "{} of {held} file(s) could not be deleted.",
                    failures.len()
                )));
            }
        }
        info!(held, failed = failures.len(), "session cleaned up");

        if failures.is_empty() {
            Ok(())
        } else {
            Err(failures)
        }
    }
}
