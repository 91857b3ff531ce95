//! Wire protocol: JSON text frames tagged by `"type"`.

use docchat_ai::{CleanupError, FileHandle, Message, Phase, Role, Session, UploadError};
use docchat_common::{Notification, NotificationLevel, SessionId};
use serde::{Deserialize, Serialize};

/// Commands a client sends. The first frame must be `hello`.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientCommand {
    Hello {
        #[serde(default)]
        session_id: Option<String>,
    },
    Upload {
        files: Vec<IncomingFile>,
    },
    Ask {
        question: String,
    },
    Cleanup,
    Transcript,
}

/// One uploaded blob as it arrives on the wire.
#[derive(Debug, Deserialize)]
pub struct IncomingFile {
    pub name: String,
    /// Standard base64.
    pub data: String,
}

/// Events the server sends back to clients.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    SessionReady {
        session_id: String,
        phase: Phase,
        files: Vec<FileHandle>,
        transcript: Vec<Message>,
    },
    Uploaded {
        files: Vec<FileHandle>,
        rejected: Vec<Rejection>,
    },
    Message {
        role: Role,
        content: String,
    },
    Cleaned {
        failures: Vec<CleanupFailure>,
    },
    Toast {
        level: NotificationLevel,
        text: String,
        ttl_ms: u64,
    },
    Error {
        message: String,
    },
}

impl ServerEvent {
    /// Full state of a session, sent on attach and on `transcript`.
    pub fn snapshot(id: &SessionId, session: &Session) -> Self {
        Self::SessionReady {
            session_id: id.to_string(),
            phase: session.phase(),
            files: session.active_files().to_vec(),
            transcript: session.transcript().to_vec(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }
}

impl From<&Message> for ServerEvent {
    fn from(msg: &Message) -> Self {
        Self::Message {
            role: msg.role,
            content: msg.content.clone(),
        }
    }
}

impl From<Notification> for ServerEvent {
    fn from(n: Notification) -> Self {
        Self::Toast {
            level: n.level,
            ttl_ms: n.ttl_ms(),
            text: n.text,
        }
    }
}

/// A file that did not make it into the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rejection {
    pub name: String,
    pub reason: String,
}

impl Rejection {
    pub fn new(name: impl Into<String>, reason: impl ToString) -> Self {
        Self {
            name: name.into(),
            reason: reason.to_string(),
        }
    }
}

impl From<&UploadError> for Rejection {
    fn from(e: &UploadError) -> Self {
        let reason = match e {
            UploadError::Staging { source, .. } => source.to_string(),
            UploadError::Ingest { source, .. } => source.to_string(),
            other => other.to_string(),
        };
        Self {
            name: e.file_name().unwrap_or_default().to_string(),
            reason,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CleanupFailure {
    pub remote_id: String,
    pub reason: String,
}

impl From<&CleanupError> for CleanupFailure {
    fn from(e: &CleanupError) -> Self {
        Self {
            remote_id: e.remote_id.clone(),
            reason: e.source.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docchat_ai::AiError;
    use serde_json::json;
    use std::time::Duration;

    #[test]
    fn parses_hello_with_and_without_id() {
        let cmd: ClientCommand = serde_json::from_str(r#"{"type":"hello"}"#).unwrap();
        assert!(matches!(cmd, ClientCommand::Hello { session_id: None }));

        let cmd: ClientCommand =
            serde_json::from_str(r#"{"type":"hello","session_id":"abc"}"#).unwrap();
        assert!(matches!(cmd, ClientCommand::Hello { session_id: Some(ref s) } if s == "abc"));
    }

    #[test]
    fn parses_commands() {
        let cmd: ClientCommand = serde_json::from_value(json!({
            "type": "upload",
            "files": [{ "name": "a.pdf", "data": "JVBERi0=" }]
        }))
        .unwrap();
        match cmd {
            ClientCommand::Upload { files } => {
                assert_eq!(files.len(), 1);
                assert_eq!(files[0].name, "a.pdf");
            }
            other => panic!("unexpected: {other:?}"),
        }

        let cmd: ClientCommand =
            serde_json::from_str(r#"{"type":"ask","question":"Why?"}"#).unwrap();
        assert!(matches!(cmd, ClientCommand::Ask { ref question } if question == "Why?"));

        let cmd: ClientCommand = serde_json::from_str(r#"{"type":"cleanup"}"#).unwrap();
        assert!(matches!(cmd, ClientCommand::Cleanup));
        let cmd: ClientCommand = serde_json::from_str(r#"{"type":"transcript"}"#).unwrap();
        assert!(matches!(cmd, ClientCommand::Transcript));
    }

    #[test]
    fn rejects_unknown_command() {
        assert!(serde_json::from_str::<ClientCommand>(r#"{"type":"shutdown"}"#).is_err());
        assert!(serde_json::from_str::<ClientCommand>(r#"{"type":"ask"}"#).is_err());
    }

    #[test]
    fn snapshot_of_fresh_session() {
        let id = SessionId::new();
        let session = Session::default();
        let value = serde_json::to_value(ServerEvent::snapshot(&id, &session)).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "session_ready",
                "session_id": id.as_str(),
                "phase": "awaiting_upload",
                "files": [],
                "transcript": [],
            })
        );
    }

    #[test]
    fn message_event_shape() {
        let value = serde_json::to_value(ServerEvent::from(&Message::assistant("Hi"))).unwrap();
        assert_eq!(
            value,
            json!({ "type": "message", "role": "assistant", "content": "Hi" })
        );
    }

    #[test]
    fn toast_from_notification() {
        let n = Notification::success("Deleted file: files/x", Duration::from_secs(1));
        let value = serde_json::to_value(ServerEvent::from(n)).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "toast",
                "level": "success",
                "text": "Deleted file: files/x",
                "ttl_ms": 1000,
            })
        );
    }

    #[test]
    fn rejection_reason_is_the_underlying_cause() {
        let err = UploadError::Ingest {
            name: "a.pdf".into(),
            source: AiError::RateLimited,
        };
        let rejection = Rejection::from(&err);
        assert_eq!(rejection.name, "a.pdf");
        assert_eq!(rejection.reason, AiError::RateLimited.to_string());
    }

    #[test]
    fn cleanup_failure_shape() {
        let err = CleanupError {
            remote_id: "files/x".into(),
            source: AiError::NetworkError("reset".into()),
        };
        let value = serde_json::to_value(ServerEvent::Cleaned {
            failures: vec![CleanupFailure::from(&err)],
        })
        .unwrap();
        assert_eq!(value["type"], "cleaned");
        assert_eq!(value["failures"][0]["remote_id"], "files/x");
        assert!(value["failures"][0]["reason"]
            .as_str()
            .unwrap()
            .contains("reset"));
    }
}
