//! Session value types and stage errors.

use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;

use crate::{AiError, FileHandle};

/// Lifecycle phase of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    AwaitingUpload,
    Ready,
}

/// One uploaded document as received from the UI.
#[derive(Clone)]
pub struct UploadBlob {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl UploadBlob {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }
}

impl std::fmt::Debug for UploadBlob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadBlob")
            .field("name", &self.name)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Outcome of an upload batch in which at least one file was accepted.
#[derive(Debug)]
pub struct UploadReport {
    pub accepted: Vec<FileHandle>,
    pub rejected: Vec<UploadError>,
}

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("failed to stage {name}: {source}")]
    Staging {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("upload of {name} rejected: {source}")]
    Ingest {
        name: String,
        #[source]
        source: AiError,
    },

    #[error("no file was accepted ({} failed)", .0.len())]
    NothingAccepted(Vec<UploadError>),

    #[error("no files to upload")]
    EmptyBatch,

    #[error("files are already active; clean up before uploading again")]
    SessionReady,
}

impl UploadError {
    /// Name of the blob this error concerns, if it is a per-file error.
    pub fn file_name(&self) -> Option<&str> {
        match self {
            UploadError::Staging { name, .. } | UploadError::Ingest { name, .. } => Some(name),
            _ => None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("no documents uploaded yet")]
    NotReady,

    #[error("question is empty")]
    EmptyQuestion,

    #[error(transparent)]
    Provider(#[from] AiError),

    #[error("model returned an empty answer")]
    EmptyResponse,
}

/// A remote deletion that failed during cleanup.
#[derive(Debug, thiserror::Error)]
#[error("failed to delete {remote_id}: {source}")]
pub struct CleanupError {
    pub remote_id: String,
    #[source]
    pub source: AiError,
}

/// Static per-session configuration.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub seed_question: String,
    /// Appended verbatim to every question sent to the model.
    pub directive: String,
    pub replay_history: bool,
    pub staging_dir: Option<PathBuf>,
    pub upload_toast: Duration,
    pub delete_toast: Duration,
    pub summary_toast: Duration,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            seed_question: "What is the title of the document(s)?".to_string(),
            directive: String::new(),
            replay_history: true,
            staging_dir: None,
            upload_toast: Duration::from_secs(2),
            delete_toast: Duration::from_secs(1),
            summary_toast: Duration::from_secs(2),
        }
    }
}
