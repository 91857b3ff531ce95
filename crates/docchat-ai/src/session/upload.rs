//! Upload stage: stage each blob in a temp file and hand it to the provider.

use std::io::Write;

use docchat_common::Notification;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::{AiClient, FileHandle, PDF_MIME};

use super::manager::Session;
use super::types::{Phase, UploadBlob, UploadError, UploadReport};

impl Session {
    /// Upload a batch of PDFs and move the session to `Ready`.
    ///
    /// Every blob is attempted even when an earlier one fails. The batch
    /// succeeds if at least one file was accepted; the accepted handles
    /// then become the session's active files.
    pub async fn submit_upload(
        &mut self,
        client: &dyn AiClient,
        blobs: Vec<UploadBlob>,
    ) -> Result<UploadReport, UploadError> {
        if self.phase == Phase::Ready {
            return Err(UploadError::SessionReady);
        }
        if blobs.is_empty() {
            return Err(UploadError::EmptyBatch);
        }

        let mut accepted = Vec::with_capacity(blobs.len());
        let mut rejected = Vec::new();

        for blob in &blobs {
            match self.upload_one(client, blob).await {
                Ok(handle) => {
                    self.notify(Notification::success(
                        format!("Uploaded file: {}", handle.remote_id),
                        self.settings.upload_toast,
                    ));
                    accepted.push(handle);
                }
                Err(e) => {
                    warn!(file = %blob.name, error = %e, "upload failed");
                    rejected.push(e);
                }
            }
        }

        if accepted.is_empty() {
            return Err(UploadError::NothingAccepted(rejected));
        }

        self.active_files = accepted.clone();
        self.phase = Phase::Ready;
        info!(
            accepted = accepted.len(),
            rejected = rejected.len(),
            "session ready"
        );

        Ok(UploadReport { accepted, rejected })
    }

    async fn upload_one(
        &self,
        client: &dyn AiClient,
        blob: &UploadBlob,
    ) -> Result<FileHandle, UploadError> {
        let staged = self.stage(blob).map_err(|source| UploadError::Staging {
            name: blob.name.clone(),
            source,
        })?;
        debug!(file = %blob.name, path = %staged.path().display(), "staged upload");

        let result = client
            .upload_file(staged.path(), &blob.name, PDF_MIME)
            .await
            .map_err(|source| UploadError::Ingest {
                name: blob.name.clone(),
                source,
            });

        // close() removes the staged file; Drop covers early returns and cancellation.
        if let Err(e) = staged.close() {
            warn!(file = %blob.name, error = %e, "failed to remove staged file");
        }

        result
    }

    fn stage(&self, blob: &UploadBlob) -> std::io::Result<NamedTempFile> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("docchat-").suffix(".pdf");
        let mut file = match self.settings.staging_dir {
            Some(ref dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };
        file.write_all(&blob.bytes)?;
        file.flush()?;
        Ok(file)
    }
}
