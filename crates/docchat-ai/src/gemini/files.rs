//! Files API calls: resumable upload, lookup, deletion, activation polling.

use std::path::Path;

use tracing::{debug, info};

use crate::{AiError, FileHandle};

use super::client::{ensure_success, FileState, GeminiClient};

const UPLOAD_URL_HEADER: &str = "x-goog-upload-url";

impl GeminiClient {
    /// Upload a local file with the two-step resumable protocol.
    pub(crate) async fn upload_resumable(
        &self,
        path: &Path,
        display_name: &str,
        mime_type: &str,
    ) -> Result<(FileHandle, FileState), AiError> {
        let bytes = tokio::fs::read(path).await?;
        let len = bytes.len();

        debug!(display_name, size = len, "Gemini upload start");

        let start = self
            .http
            .post(self.upload_url())
            .header("x-goog-api-key", &self.config.api_key)
            .header("X-Goog-Upload-Protocol", "resumable")
            .header("X-Goog-Upload-Command", "start")
            .header("X-Goog-Upload-Header-Content-Length", len.to_string())
            .header("X-Goog-Upload-Header-Content-Type", mime_type)
            .json(&serde_json::json!({ "file": { "display_name": display_name } }))
            .send()
            .await
            .map_err(|e| AiError::NetworkError(e.to_string()))?;
        let start = ensure_success(start).await?;

        let session_url = start
            .headers()
            .get(UPLOAD_URL_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AiError::ParseError(format!("missing {UPLOAD_URL_HEADER} header")))?
            .to_string();

        let finish = self
            .http
            .post(&session_url)
            .header("x-goog-api-key", &self.config.api_key)
            .header("X-Goog-Upload-Offset", "0")
            .header("X-Goog-Upload-Command", "upload, finalize")
            .body(bytes)
            .send()
            .await
            .map_err(|e| AiError::NetworkError(e.to_string()))?;
        let finish = ensure_success(finish).await?;

        let json: serde_json::Value = finish
            .json()
            .await
            .map_err(|e| AiError::ParseError(e.to_string()))?;

        Self::parse_file(&json["file"])
    }

    /// Fetch the current metadata of a file resource.
    pub(crate) async fn get_file(
        &self,
        remote_id: &str,
    ) -> Result<(FileHandle, FileState), AiError> {
        let url = self.file_url(remote_id)?;
        let response = self
            .http
            .get(&url)
            .header("x-goog-api-key", &self.config.api_key)
            .send()
            .await
            .map_err(|e| AiError::NetworkError(e.to_string()))?;
        let response = ensure_success(response).await?;

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| AiError::ParseError(e.to_string()))?;
        Self::parse_file(&json)
    }

    /// Poll a processing file until it is `ACTIVE`.
    pub(crate) async fn wait_until_active(
        &self,
        handle: FileHandle,
        mut state: FileState,
    ) -> Result<FileHandle, AiError> {
        let mut handle = handle;
        let mut polls = 0;

        while state == FileState::Processing {
            if polls >= self.config.activation_max_polls {
                return Err(AiError::ApiError(format!(
                    "file {} still processing after {polls} polls",
                    handle.remote_id
                )));
            }
            polls += 1;
            tokio::time::sleep(self.config.activation_poll).await;
            (handle, state) = self.get_file(&handle.remote_id).await?;
            debug!(remote_id = %handle.remote_id, ?state, polls, "Gemini file state");
        }

        if state == FileState::Failed {
            return Err(AiError::FileFailed(handle.remote_id));
        }
        Ok(handle)
    }

    pub(crate) async fn delete_resource(&self, remote_id: &str) -> Result<(), AiError> {
        let url = self.file_url(remote_id)?;
        let response = self
            .http
            .delete(&url)
            .header("x-goog-api-key", &self.config.api_key)
            .send()
            .await
            .map_err(|e| AiError::NetworkError(e.to_string()))?;
        ensure_success(response).await?;

        info!(remote_id, "Gemini file deleted");
        Ok(())
    }
}
