//! Gemini API client struct, request building, and response parsing.

use crate::{AiError, AiResponse, FileHandle, Message, Role, TokenUsage};

use super::config::GeminiConfig;

/// Processing state the Files API reports for an upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileState {
    Processing,
    Active,
    Failed,
    Unspecified,
}

impl FileState {
    fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("PROCESSING") => FileState::Processing,
            Some("ACTIVE") => FileState::Active,
            Some("FAILED") => FileState::Failed,
            _ => FileState::Unspecified,
        }
    }
}

/// Gemini API client.
pub struct GeminiClient {
    pub(crate) config: GeminiConfig,
    pub(crate) http: reqwest::Client,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Self {
        let http = reqwest::Client::builder()
            .connect_timeout(std::time::Duration::from_secs(10))
            .timeout(config.request_timeout)
            .build()
            .expect("failed to build HTTP client");
        Self { config, http }
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    pub(crate) fn generate_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.api_base, self.config.model
        )
    }

    pub(crate) fn upload_url(&self) -> String {
        format!("{}/files", self.config.upload_base)
    }

    /// URL of a file resource. Rejects ids outside the `files/` collection.
    pub(crate) fn file_url(&self, remote_id: &str) -> Result<String, AiError> {
        let valid = remote_id.strip_prefix("files/").is_some_and(|id| {
            !id.is_empty() && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        });
        if !valid {
            return Err(AiError::ApiError(format!(
                "invalid file resource name: {remote_id:?}"
            )));
        }
        Ok(format!("{}/{}", self.config.api_base, remote_id))
    }

    /// Build the JSON request body for `generateContent`.
    ///
    /// Prior turns come first; the final user turn carries every file
    /// followed by the prompt text.
    pub(crate) fn build_request_body(
        &self,
        files: &[FileHandle],
        history: &[Message],
        prompt: &str,
    ) -> serde_json::Value {
        let mut contents = Vec::with_capacity(history.len() + 1);

        for msg in history {
            let role = match msg.role {
                Role::User => "user",
                Role::Assistant => "model",
            };
            contents.push(serde_json::json!({
                "role": role,
                "parts": [{ "text": msg.content }]
            }));
        }

        let mut parts: Vec<serde_json::Value> = files
            .iter()
            .map(|f| {
                serde_json::json!({
                    "fileData": { "mimeType": f.mime_type, "fileUri": f.uri }
                })
            })
            .collect();
        parts.push(serde_json::json!({ "text": prompt }));
        contents.push(serde_json::json!({ "role": "user", "parts": parts }));

        serde_json::json!({
            "contents": contents,
            "generationConfig": {
                "temperature": self.config.temperature,
                "topP": self.config.top_p,
                "topK": self.config.top_k,
                "maxOutputTokens": self.config.max_output_tokens,
            }
        })
    }

    /// Parse a `generateContent` response.
    pub(crate) fn parse_response(&self, json: serde_json::Value) -> Result<AiResponse, AiError> {
        if let Some(reason) = json["promptFeedback"]["blockReason"].as_str() {
            return Err(AiError::ApiError(format!("prompt blocked: {reason}")));
        }

        let candidates = json["candidates"]
            .as_array()
            .ok_or_else(|| AiError::ParseError("no candidates in response".to_string()))?;

        let first = candidates
            .first()
            .ok_or_else(|| AiError::ParseError("empty candidates".to_string()))?;

        let mut content = String::new();
        if let Some(parts) = first["content"]["parts"].as_array() {
            for part in parts {
                if let Some(text) = part["text"].as_str() {
                    content.push_str(text);
                }
            }
        }

        if content.is_empty() {
            if let Some(reason) = first["finishReason"].as_str() {
                tracing::debug!(finish_reason = reason, "Gemini returned no text");
            }
        }

        let usage = TokenUsage {
            input_tokens: json["usageMetadata"]["promptTokenCount"]
                .as_u64()
                .unwrap_or(0),
            output_tokens: json["usageMetadata"]["candidatesTokenCount"]
                .as_u64()
                .unwrap_or(0),
        };

        Ok(AiResponse { content, usage })
    }

    /// Parse a Files API `File` resource.
    pub(crate) fn parse_file(json: &serde_json::Value) -> Result<(FileHandle, FileState), AiError> {
        let remote_id = json["name"]
            .as_str()
            .ok_or_else(|| AiError::ParseError("file resource has no name".to_string()))?
            .to_string();
        let uri = json["uri"]
            .as_str()
            .ok_or_else(|| AiError::ParseError(format!("file {remote_id} has no uri")))?
            .to_string();

        // int64 fields arrive as JSON strings
        let size_bytes = match &json["sizeBytes"] {
            serde_json::Value::String(s) => s.parse().unwrap_or(0),
            v => v.as_u64().unwrap_or(0),
        };

        let handle = FileHandle {
            display_name: json["displayName"]
                .as_str()
                .unwrap_or(&remote_id)
                .to_string(),
            mime_type: json["mimeType"]
                .as_str()
                .unwrap_or(crate::PDF_MIME)
                .to_string(),
            remote_id,
            uri,
            size_bytes,
        };
        Ok((handle, FileState::parse(json["state"].as_str())))
    }
}

/// Map non-success HTTP statuses to `AiError`.
pub(crate) async fn ensure_success(
    response: reqwest::Response,
) -> Result<reqwest::Response, AiError> {
    let status = response.status();
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return Err(AiError::RateLimited);
    }
    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();
        return Err(AiError::ApiError(format!("HTTP {status}: {text}")));
    }
    Ok(response)
}
