//! Per-connection handler: hello, attach, then run commands against the session.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use docchat_ai::{AiClient, Session, UploadError};
use docchat_common::{new_correlation_id, Notification, SessionId};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, Mutex};
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::WebSocketStream;

use crate::intake::{self, IntakeLimits};
use crate::protocol::{ClientCommand, CleanupFailure, IncomingFile, Rejection, ServerEvent};
use crate::store::SessionStore;

/// Everything a connection needs, shared by all connections.
pub struct ServerContext {
    pub store: SessionStore,
    pub client: Arc<dyn AiClient>,
    pub limits: IntakeLimits,
    pub hello_timeout: Duration,
}

/// Queue of frames for the connection's writer task.
#[derive(Clone)]
struct Outbox(mpsc::Sender<WsMessage>);

impl Outbox {
    async fn send(&self, event: &ServerEvent) {
        if let Some(frame) = encode(event) {
            let _ = self.0.send(frame).await;
        }
    }

    async fn error(&self, message: impl Into<String>) {
        self.send(&ServerEvent::error(message)).await;
    }

    /// Non-blocking send for notifications raised inside session calls.
    fn try_send(&self, event: &ServerEvent) {
        if let Some(frame) = encode(event) {
            if self.0.try_send(frame).is_err() {
                tracing::debug!("Outbox full or closed, dropping toast");
            }
        }
    }
}

fn encode(event: &ServerEvent) -> Option<WsMessage> {
    match serde_json::to_string(event) {
        Ok(json) => Some(WsMessage::Text(json.into())),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to encode event");
            None
        }
    }
}

/// Handle a single WebSocket connection.
pub async fn handle_connection(
    ws: WebSocketStream<TcpStream>,
    addr: SocketAddr,
    ctx: Arc<ServerContext>,
) {
    let (mut sink, mut stream) = ws.split();

    // 1. Read the hello message.
    let requested = match read_hello(&mut stream, addr, ctx.hello_timeout).await {
        Some(v) => v,
        None => return,
    };

    // 2. Attach to a session.
    let (session_id, session) = match ctx.store.attach(requested.as_deref()).await {
        Ok(v) => v,
        Err(e) => {
            if let Some(frame) = encode(&ServerEvent::error(e.to_string())) {
                let _ = sink.send(frame).await;
            }
            return;
        }
    };

    tracing::info!(peer = %addr, session = %session_id, "Client attached");

    // 3. Writer task: everything sent to the client goes through the outbox,
    //    so toasts raised mid-command are delivered while the command runs.
    let (tx, mut rx) = mpsc::channel::<WsMessage>(256);
    let outbox = Outbox(tx);
    let writer = tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            if sink.send(frame).await.is_err() {
                break;
            }
        }
        let _ = sink.close().await;
    });

    {
        let mut guard = session.lock().await;
        let toasts = outbox.clone();
        guard.set_notifier(Some(Box::new(move |n: Notification| {
            toasts.try_send(&ServerEvent::from(n));
        })));
        outbox.send(&ServerEvent::snapshot(&session_id, &guard)).await;
    }

    // 4. Command loop.
    while let Some(frame) = stream.next().await {
        match frame {
            Ok(WsMessage::Text(text)) => match serde_json::from_str::<ClientCommand>(&text) {
                Ok(command) => {
                    dispatch(&ctx, &session_id, &session, &outbox, command).await;
                }
                Err(e) => {
                    tracing::debug!(peer = %addr, error = %e, "Invalid command");
                    outbox.error(format!("invalid command: {e}")).await;
                }
            },
            Ok(WsMessage::Ping(data)) => {
                let _ = outbox.0.send(WsMessage::Pong(data)).await;
            }
            Ok(WsMessage::Close(_)) => break,
            Err(e) => {
                tracing::debug!(peer = %addr, error = %e, "WS error");
                break;
            }
            _ => {}
        }
    }

    // 5. Detach. The session keeps its files until cleanup or the reaper.
    tracing::info!(peer = %addr, session = %session_id, "Client disconnected");
    session.lock().await.set_notifier(None);
    ctx.store.detach(&session_id).await;

    drop(outbox);
    let _ = writer.await;
}

async fn dispatch(
    ctx: &ServerContext,
    session_id: &SessionId,
    session: &Mutex<Session>,
    out: &Outbox,
    command: ClientCommand,
) {
    let request = new_correlation_id();
    let client = ctx.client.as_ref();
    let mut session = session.lock().await;

    match command {
        ClientCommand::Hello { .. } => {
            out.error("already attached to a session").await;
        }
        ClientCommand::Upload { files } => {
            tracing::info!(
                session = %session_id,
                request = %request,
                files = files.len(),
                "upload"
            );
            handle_upload(ctx, &mut session, out, files).await;
        }
        ClientCommand::Ask { question } => {
            tracing::info!(session = %session_id, request = %request, "ask");
            match session.ask(client, question).await {
                Ok(_) => send_last_turn(&session, out).await,
                Err(e) => {
                    tracing::warn!(
                        session = %session_id,
                        request = %request,
                        error = %e,
                        "ask failed"
                    );
                    out.error(e.to_string()).await;
                }
            }
        }
        ClientCommand::Cleanup => {
            tracing::info!(session = %session_id, request = %request, "cleanup");
            let failures = match session.cleanup(client).await {
                Ok(()) => Vec::new(),
                Err(errors) => errors.iter().map(CleanupFailure::from).collect(),
            };
            out.send(&ServerEvent::Cleaned { failures }).await;
        }
        ClientCommand::Transcript => {
            out.send(&ServerEvent::snapshot(session_id, &session)).await;
        }
    }
}

/// Intake, upload, then the seed question.
async fn handle_upload(
    ctx: &ServerContext,
    session: &mut Session,
    out: &Outbox,
    files: Vec<IncomingFile>,
) {
    let client = ctx.client.as_ref();

    let checked = match intake::check_batch(files, &ctx.limits) {
        Ok(checked) => checked,
        Err(e) => {
            out.error(e.to_string()).await;
            return;
        }
    };
    let mut rejected = checked.rejected;
    if checked.blobs.is_empty() {
        out.send(&ServerEvent::Uploaded {
            files: Vec::new(),
            rejected,
        })
        .await;
        out.error("no acceptable PDF files in upload").await;
        return;
    }

    match session.submit_upload(client, checked.blobs).await {
        Ok(report) => {
            rejected.extend(report.rejected.iter().map(Rejection::from));
            out.send(&ServerEvent::Uploaded {
                files: report.accepted,
                rejected,
            })
            .await;
        }
        Err(e) => {
            if let UploadError::NothingAccepted(ref errors) = e {
                rejected.extend(errors.iter().map(Rejection::from));
                out.send(&ServerEvent::Uploaded {
                    files: Vec::new(),
                    rejected,
                })
                .await;
            }
            out.error(e.to_string()).await;
            return;
        }
    }

    match session.seed(client).await {
        Ok(Some(_)) => send_last_turn(session, out).await,
        Ok(None) => {}
        Err(e) => {
            tracing::warn!(error = %e, "seed question failed");
            out.error(format!("seed question failed: {e}")).await;
        }
    }
}

/// Send the question and answer that were just appended.
async fn send_last_turn(session: &Session, out: &Outbox) {
    let transcript = session.transcript();
    let start = transcript.len().saturating_sub(2);
    for message in &transcript[start..] {
        out.send(&ServerEvent::from(message)).await;
    }
}

/// Read and parse the first message as a hello. Returns the requested
/// session id, if any.
async fn read_hello(
    stream: &mut futures_util::stream::SplitStream<WebSocketStream<TcpStream>>,
    addr: SocketAddr,
    timeout: Duration,
) -> Option<Option<String>> {
    let frame = tokio::time::timeout(timeout, stream.next()).await;

    match frame {
        Ok(Some(Ok(WsMessage::Text(text)))) => match serde_json::from_str::<ClientCommand>(&text) {
            Ok(ClientCommand::Hello { session_id }) => Some(session_id),
            Ok(_) => {
                tracing::warn!(peer = %addr, "First message was not a hello");
                None
            }
            Err(e) => {
                tracing::warn!(peer = %addr, error = %e, "Invalid hello message");
                None
            }
        },
        Ok(Some(Ok(_))) => {
            tracing::warn!(peer = %addr, "Expected text hello, got binary");
            None
        }
        Ok(Some(Err(e))) => {
            tracing::warn!(peer = %addr, error = %e, "WS error during hello");
            None
        }
        Ok(None) => {
            tracing::debug!(peer = %addr, "Connection closed before hello");
            None
        }
        Err(_) => {
            tracing::warn!(peer = %addr, timeout_secs = timeout.as_secs(), "Hello timeout");
            None
        }
    }
}
