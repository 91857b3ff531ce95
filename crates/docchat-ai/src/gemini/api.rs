//! AiClient trait implementation for GeminiClient.

use std::path::Path;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::{AiClient, AiError, AiResponse, FileHandle, Message};

use super::client::{ensure_success, GeminiClient};

#[async_trait]
impl AiClient for GeminiClient {
    async fn upload_file(
        &self,
        path: &Path,
        display_name: &str,
        mime_type: &str,
    ) -> Result<FileHandle, AiError> {
        let (handle, state) = self.upload_resumable(path, display_name, mime_type).await?;
        let remote_id = handle.remote_id.clone();

        match self.wait_until_active(handle, state).await {
            Ok(handle) => {
                info!(remote_id = %handle.remote_id, display_name, "Gemini file uploaded");
                Ok(handle)
            }
            Err(e) => {
                // The resource exists remotely but will never be usable.
                if let Err(del) = self.delete_resource(&remote_id).await {
                    warn!(remote_id, error = %del, "failed to delete unusable upload");
                }
                Err(e)
            }
        }
    }

    async fn delete_file(&self, remote_id: &str) -> Result<(), AiError> {
        self.delete_resource(remote_id).await
    }

    async fn generate_content(
        &self,
        files: &[FileHandle],
        history: &[Message],
        prompt: &str,
    ) -> Result<AiResponse, AiError> {
        let body = self.build_request_body(files, history, prompt);

        debug!(
            model = %self.config.model,
            files = files.len(),
            turns = history.len(),
            "Gemini API request"
        );

        let response = self
            .http
            .post(self.generate_url())
            .header("content-type", "application/json")
            .header("x-goog-api-key", &self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AiError::NetworkError(e.to_string()))?;
        let response = ensure_success(response).await?;

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| AiError::ParseError(e.to_string()))?;

        self.parse_response(json)
    }
}
