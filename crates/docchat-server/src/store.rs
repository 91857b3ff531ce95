//! Session store: maps session IDs to chat sessions and tracks attachment.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use docchat_ai::{AiClient, Session, SessionSettings};
use docchat_common::{log_notifier, SessionId};
use tokio::sync::{Mutex, RwLock};

/// A session plus the bookkeeping needed to resume or reap it.
struct Entry {
    session: Arc<Mutex<Session>>,
    attached: bool,
    last_seen: Instant,
}

#[derive(Debug, thiserror::Error)]
pub enum AttachError {
    #[error("session {0} is already attached to another connection")]
    AlreadyAttached(SessionId),
}

/// Thread-safe session store.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<SessionId, Entry>>>,
    settings: SessionSettings,
}

impl SessionStore {
    pub fn new(settings: SessionSettings) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            settings,
        }
    }

    /// Attach a connection to a session.
    ///
    /// A known, detached id resumes that session. No id, a malformed id,
    /// or an id that has since been reaped starts a fresh session.
    pub async fn attach(
        &self,
        requested: Option<&str>,
    ) -> Result<(SessionId, Arc<Mutex<Session>>), AttachError> {
        let mut map = self.sessions.write().await;

        if let Some(id) = requested.and_then(SessionId::parse) {
            if let Some(entry) = map.get_mut(&id) {
                if entry.attached {
                    return Err(AttachError::AlreadyAttached(id));
                }
                entry.attached = true;
                entry.last_seen = Instant::now();
                tracing::info!(session = %id, "Session resumed");
                return Ok((id, entry.session.clone()));
            }
            tracing::debug!(session = %id, "Unknown session, starting a new one");
        }

        let id = SessionId::new();
        let session = Arc::new(Mutex::new(Session::new(self.settings.clone())));
        map.insert(
            id.clone(),
            Entry {
                session: session.clone(),
                attached: true,
                last_seen: Instant::now(),
            },
        );
        tracing::info!(session = %id, "Session created");
        Ok((id, session))
    }

    /// Mark a session as no longer attached. It stays resumable until reaped.
    pub async fn detach(&self, id: &SessionId) {
        let mut map = self.sessions.write().await;
        if let Some(entry) = map.get_mut(id) {
            entry.attached = false;
            entry.last_seen = Instant::now();
        }
    }

    /// Remove sessions detached for longer than `max_age` and delete their
    /// remote files. Returns how many sessions were reaped.
    pub async fn reap_stale(&self, max_age: Duration, client: &dyn AiClient) -> usize {
        let stale: Vec<(SessionId, Arc<Mutex<Session>>)> = {
            let mut map = self.sessions.write().await;
            let now = Instant::now();
            let ids: Vec<SessionId> = map
                .iter()
                .filter(|(_, e)| !e.attached && now.duration_since(e.last_seen) > max_age)
                .map(|(id, _)| id.clone())
                .collect();
            ids.into_iter()
                .filter_map(|id| map.remove(&id).map(|e| (id, e.session)))
                .collect()
        };

        let reaped = stale.len();
        for (id, session) in stale {
            tracing::info!(session = %id, "Reaping stale session");
            release(&id, &session, client).await;
        }
        reaped
    }

    /// Remove every session and delete their remote files. Used on shutdown.
    pub async fn drain(&self, client: &dyn AiClient) -> usize {
        let all: Vec<(SessionId, Entry)> = self.sessions.write().await.drain().collect();
        let drained = all.len();
        for (id, entry) in all {
            release(&id, &entry.session, client).await;
        }
        drained
    }

    /// Check if a session exists.
    #[cfg(test)]
    pub async fn exists(&self, id: &SessionId) -> bool {
        self.sessions.read().await.contains_key(id)
    }

    /// Number of sessions, attached or not.
    pub async fn count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

async fn release(id: &SessionId, session: &Mutex<Session>, client: &dyn AiClient) {
    let mut session = session.lock().await;
    if session.active_files().is_empty() {
        return;
    }
    session.set_notifier(Some(log_notifier()));
    if let Err(failures) = session.cleanup(client).await {
        for failure in &failures {
            tracing::warn!(session = %id, error = %failure, "Remote file left behind");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    use async_trait::async_trait;
    use docchat_ai::{AiError, AiResponse, FileHandle, Message, UploadBlob};

    #[derive(Default)]
    struct CountingClient {
        deleted: std::sync::Mutex<Vec<String>>,
    }

    #[async_trait]
    impl AiClient for CountingClient {
        async fn upload_file(
            &self,
            _path: &Path,
            display_name: &str,
            mime_type: &str,
        ) -> Result<FileHandle, AiError> {
            Ok(FileHandle {
                remote_id: format!("files/{}", display_name.trim_end_matches(".pdf")),
                display_name: display_name.into(),
                uri: String::new(),
                mime_type: mime_type.into(),
                size_bytes: 0,
            })
        }

        async fn delete_file(&self, remote_id: &str) -> Result<(), AiError> {
            self.deleted.lock().unwrap().push(remote_id.into());
            Ok(())
        }

        async fn generate_content(
            &self,
            _files: &[FileHandle],
            _history: &[Message],
            _prompt: &str,
        ) -> Result<AiResponse, AiError> {
            Err(AiError::RateLimited)
        }
    }

    fn store() -> SessionStore {
        SessionStore::new(SessionSettings::default())
    }

    #[tokio::test]
    async fn attach_without_id_creates_session() {
        let store = store();
        let (id, _) = store.attach(None).await.unwrap();
        assert!(store.exists(&id).await);
        assert_eq!(store.count().await, 1);
    }

    #[tokio::test]
    async fn attached_session_cannot_be_shared() {
        let store = store();
        let (id, _) = store.attach(None).await.unwrap();
        let Err(err) = store.attach(Some(id.as_str())).await else {
            panic!("second attach should fail");
        };
        assert!(matches!(err, AttachError::AlreadyAttached(ref other) if *other == id));
    }

    #[tokio::test]
    async fn detached_session_can_be_resumed() {
        let store = store();
        let (id, first) = store.attach(None).await.unwrap();
        store.detach(&id).await;

        let (resumed, second) = store.attach(Some(id.as_str())).await.unwrap();
        assert_eq!(resumed, id);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(store.count().await, 1);
    }

    #[tokio::test]
    async fn unknown_or_malformed_id_starts_fresh() {
        let store = store();
        let (a, _) = store.attach(Some("not-a-uuid")).await.unwrap();
        let unknown = SessionId::new();
        let (b, _) = store.attach(Some(unknown.as_str())).await.unwrap();
        assert_ne!(b, unknown);
        assert_ne!(a, b);
        assert_eq!(store.count().await, 2);
    }

    #[tokio::test]
    async fn reaper_skips_attached_and_recent_sessions() {
        let store = store();
        let client = CountingClient::default();
        let (attached, _) = store.attach(None).await.unwrap();
        let (detached, _) = store.attach(None).await.unwrap();
        store.detach(&detached).await;

        assert_eq!(store.reap_stale(Duration::from_secs(60), &client).await, 0);
        assert!(store.exists(&attached).await);
        assert!(store.exists(&detached).await);
    }

    #[tokio::test]
    async fn reaper_removes_stale_sessions_and_their_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(SessionSettings {
            staging_dir: Some(dir.path().to_path_buf()),
            ..SessionSettings::default()
        });
        let client = CountingClient::default();

        let (id, session) = store.attach(None).await.unwrap();
        session
            .lock()
            .await
            .submit_upload(&client, vec![UploadBlob::new("a.pdf", b"%PDF-".to_vec())])
            .await
            .unwrap();
        let (kept, _) = store.attach(None).await.unwrap();
        store.detach(&id).await;

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(store.reap_stale(Duration::from_millis(5), &client).await, 1);

        assert!(!store.exists(&id).await);
        assert!(store.exists(&kept).await);
        assert_eq!(*client.deleted.lock().unwrap(), ["files/a"]);
        assert!(session.lock().await.active_files().is_empty());
    }

    #[tokio::test]
    async fn drain_empties_store() {
        let store = store();
        let client = CountingClient::default();
        store.attach(None).await.unwrap();
        store.attach(None).await.unwrap();

        assert_eq!(store.drain(&client).await, 2);
        assert_eq!(store.count().await, 0);
        assert!(client.deleted.lock().unwrap().is_empty());
    }
}
