//! Model provider and session engine for docchat.
//!
//! Provides:
//! - the `AiClient` trait: file upload/delete and grounded generation
//! - a Gemini implementation over the Generative Language REST API
//! - `Session`, the upload → chat → cleanup state machine
//! - per-session token usage tracking

pub mod gemini;
pub mod session;
pub mod token_tracker;

use std::path::Path;

use async_trait::async_trait;

pub use gemini::{GeminiClient, GeminiConfig};
pub use session::{
    CleanupError, Phase, QueryError, Session, SessionSettings, UploadBlob, UploadError,
    UploadReport,
};
pub use token_tracker::TokenTracker;

/// MIME type every staged document is ingested as.
pub const PDF_MIME: &str = "application/pdf";

/// Remote file store and generation endpoint.
///
/// Every call blocks the caller until the provider answers or fails;
/// implementations do not retry.
#[async_trait]
pub trait AiClient: Send + Sync {
    /// Ingest the file at `path` and return a handle once it is usable.
    async fn upload_file(
        &self,
        path: &Path,
        display_name: &str,
        mime_type: &str,
    ) -> Result<FileHandle, AiError>;

    /// Delete a previously uploaded file by its provider-assigned id.
    async fn delete_file(&self, remote_id: &str) -> Result<(), AiError>;

    /// Generate one complete answer to `prompt`, grounded in `files`,
    /// with `history` sent as prior turns.
    async fn generate_content(
        &self,
        files: &[FileHandle],
        history: &[Message],
        prompt: &str,
    ) -> Result<AiResponse, AiError>;
}

/// A document accepted by the remote store.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FileHandle {
    /// Provider-assigned resource name, e.g. `files/abc123`.
    pub remote_id: String,
    pub display_name: String,
    /// URI used to reference the file from generation requests.
    pub uri: String,
    pub mime_type: String,
    pub size_bytes: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone)]
pub struct AiResponse {
    pub content: String,
    pub usage: TokenUsage,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl TokenUsage {
    pub fn total_tokens(&self) -> u64 {
        self.input_tokens.saturating_add(self.output_tokens)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AiError {
    #[error("API error: {0}")]
    ApiError(String),
    #[error("Rate limited")]
    RateLimited,
    #[error("Network error: {0}")]
    NetworkError(String),
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("File {0} failed processing")]
    FileFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_serializes_lowercase() {
        let json = serde_json::to_string(&Message::assistant("hi")).unwrap();
        assert_eq!(json, r#"{"role":"assistant","content":"hi"}"#);
    }

    #[test]
    fn usage_total_saturates() {
        let usage = TokenUsage {
            input_tokens: u64::MAX,
            output_tokens: 5,
        };
        assert_eq!(usage.total_tokens(), u64::MAX);
    }

    #[test]
    fn ai_error_display() {
        assert_eq!(AiError::RateLimited.to_string(), "Rate limited");
        assert_eq!(
            AiError::ApiError("HTTP 400: bad".into()).to_string(),
            "API error: HTTP 400: bad"
        );
        assert_eq!(
            AiError::FileFailed("files/x".into()).to_string(),
            "File files/x failed processing"
        );
    }
}
