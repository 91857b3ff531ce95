//! docchat: WebSocket server for chatting with uploaded PDF documents.
//!
//! Each connection attaches to its own session. Uploaded files are held by
//! the Gemini Files API until the client cleans up or the session is
//! reaped after sitting detached for `server.session_ttl_secs`.

mod cli;
mod connection;
mod intake;
mod protocol;
mod store;

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use docchat_ai::{AiClient, GeminiClient, GeminiConfig, SessionSettings};
use docchat_common::DocchatError;
use docchat_config::{config_to_json, DocchatConfig};
use tokio::net::TcpListener;
use tokio_tungstenite::accept_async_with_config;
use tokio_tungstenite::tungstenite::protocol::WebSocketConfig;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{reload, EnvFilter};

use crate::connection::{handle_connection, ServerContext};
use crate::intake::IntakeLimits;
use crate::store::SessionStore;

const DEFAULT_LOG_FILTER: &str = "docchat=info";

/// Load a `.env` file into the environment without overriding existing vars.
fn load_dotenv() {
    let manifest_dir = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let candidates = [
        std::path::PathBuf::from(".env"),
        // Workspace root, two levels up from crates/docchat-server/
        manifest_dir.join("..").join("..").join(".env"),
    ];

    for path in &candidates {
        if let Ok(contents) = std::fs::read_to_string(path) {
            for (key, value) in parse_dotenv(&contents) {
                if std::env::var(key).is_err() {
                    std::env::set_var(key, value);
                }
            }
            return;
        }
    }
}

fn parse_dotenv(contents: &str) -> Vec<(&str, &str)> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| {
            let key = key.trim().trim_start_matches("export ").trim();
            let value = value.trim().trim_matches('"').trim_matches('\'');
            (key, value)
        })
        .filter(|(key, _)| !key.is_empty())
        .collect()
}

/// Filter installed before config is read: `--log-level`, then `RUST_LOG`,
/// then the built-in default.
fn startup_filter(cli: Option<&str>) -> EnvFilter {
    if let Some(directive) = cli {
        return EnvFilter::new(directive);
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

/// `logging.level` from config replaces the startup filter only when neither
/// `--log-level` nor `RUST_LOG` was given.
fn configured_filter(cli: Option<&str>, rust_log: Option<&str>, level: &str) -> Option<EnvFilter> {
    let overridden = cli.is_some() || rust_log.is_some_and(|v| !v.trim().is_empty());
    (!overridden).then(|| EnvFilter::new(level))
}

fn gemini_config(config: &DocchatConfig, api_key: String) -> GeminiConfig {
    let provider = &config.provider;
    let generation = &config.generation;
    GeminiConfig::new(api_key)
        .with_model(&provider.model)
        .with_endpoints(&provider.api_base, &provider.upload_base)
        .with_sampling(generation.temperature, generation.top_p, generation.top_k)
        .with_max_output_tokens(generation.max_output_tokens)
        .with_request_timeout(Duration::from_secs(provider.request_timeout_secs.into()))
        .with_activation_polling(
            Duration::from_millis(provider.activation_poll_ms.into()),
            provider.activation_max_polls,
        )
}

fn session_settings(config: &DocchatConfig) -> SessionSettings {
    SessionSettings {
        seed_question: config.chat.seed_question.clone(),
        directive: config.chat.directive.clone(),
        replay_history: config.chat.replay_history,
        staging_dir: config.upload.staging_dir.clone(),
        upload_toast: Duration::from_millis(config.upload.upload_toast_ms.into()),
        delete_toast: Duration::from_millis(config.upload.delete_toast_ms.into()),
        summary_toast: Duration::from_millis(config.upload.summary_toast_ms.into()),
    }
}

fn websocket_config(limits: &IntakeLimits) -> WebSocketConfig {
    let max = limits.max_message_bytes();
    let mut ws = WebSocketConfig::default();
    ws.max_message_size = Some(max);
    ws.max_frame_size = Some(max);
    ws
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env before anything reads the environment
    load_dotenv();

    let args = cli::parse();

    // Install logging before the config loader runs so its messages are kept;
    // the filter is swapped for `logging.level` once the config is known.
    let (filter, filter_handle) = reload::Layer::new(startup_filter(args.log_level.as_deref()));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = match docchat_config::load_config(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Config load failed: {e}");
            return ExitCode::FAILURE;
        }
    };
    args.apply(&mut config);

    let rust_log = std::env::var("RUST_LOG").ok();
    if let Some(filter) = configured_filter(
        args.log_level.as_deref(),
        rust_log.as_deref(),
        &config.logging.level,
    ) {
        if let Err(e) = filter_handle.reload(filter) {
            tracing::warn!("Failed to apply logging.level: {e}");
        }
    }

    if args.print_config {
        println!("{}", config_to_json(&config));
        return ExitCode::SUCCESS;
    }

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: DocchatConfig) -> Result<(), DocchatError> {
    tracing::info!("docchat v{} starting...", env!("CARGO_PKG_VERSION"));

    let api_key = docchat_config::resolve_api_key(&config.provider)?;
    let client: Arc<dyn AiClient> = Arc::new(GeminiClient::new(gemini_config(&config, api_key)));
    tracing::info!(model = %config.provider.model, "Gemini client ready");

    let limits = IntakeLimits::from_config(&config.upload);
    let ctx = Arc::new(ServerContext {
        store: SessionStore::new(session_settings(&config)),
        client,
        limits,
        hello_timeout: Duration::from_secs(config.server.hello_timeout_secs),
    });

    let addr = config.server.addr();
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("docchat listening on ws://{}", addr);

    // Spawn stale session reaper.
    let reaper = ctx.clone();
    let ttl = Duration::from_secs(config.server.session_ttl_secs);
    let interval = Duration::from_secs(config.server.reap_interval_secs);
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(interval).await;
            let reaped = reaper.store.reap_stale(ttl, reaper.client.as_ref()).await;
            let count = reaper.store.count().await;
            tracing::debug!(sessions = count, reaped, "Reaper tick");
        }
    });

    let ws_config = websocket_config(&limits);
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    // Accept loop.
    loop {
        tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok((stream, peer)) => {
                    let ctx = ctx.clone();
                    tokio::spawn(async move {
                        match accept_async_with_config(stream, Some(ws_config)).await {
                            Ok(ws) => handle_connection(ws, peer, ctx).await,
                            Err(e) => {
                                tracing::warn!(peer = %peer, error = %e, "WS handshake failed");
                            }
                        }
                    });
                }
                Err(e) => {
                    tracing::warn!(error = %e, "TCP accept error");
                }
            },
            _ = &mut shutdown => {
                tracing::info!("Shutdown requested");
                break;
            }
        }
    }

    // Delete remote files of every session still in the store.
    let released = ctx.store.drain(ctx.client.as_ref()).await;
    tracing::info!(sessions = released, "Shutdown complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dotenv_parsing() {
        let parsed = parse_dotenv(
            "# comment\n\nGOOGLE_API_KEY=\"abc\"\nexport MODEL='m'\n  SPACED = v \nnoequals\n=x\n",
        );
        assert_eq!(
            parsed,
            [("GOOGLE_API_KEY", "abc"), ("MODEL", "m"), ("SPACED", "v")]
        );
    }

    #[test]
    fn session_settings_follow_config() {
        let mut config = DocchatConfig::default();
        config.chat.replay_history = false;
        config.upload.delete_toast_ms = 250;
        config.upload.staging_dir = Some("/var/tmp/docchat".into());

        let settings = session_settings(&config);
        assert_eq!(settings.seed_question, "What is the title of the document(s)?");
        assert_eq!(settings.directive, config.chat.directive);
        assert!(!settings.replay_history);
        assert_eq!(settings.delete_toast, Duration::from_millis(250));
        assert_eq!(settings.upload_toast, Duration::from_secs(2));
        assert_eq!(
            settings.staging_dir.as_deref(),
            Some(std::path::Path::new("/var/tmp/docchat"))
        );
    }

    #[test]
    fn gemini_config_follows_config() {
        let mut config = DocchatConfig::default();
        config.provider.model = "gemini-1.5-pro".into();
        config.provider.request_timeout_secs = 30;
        config.generation.top_k = 40;

        let gemini = gemini_config(&config, "key".into());
        assert_eq!(gemini.api_key, "key");
        assert_eq!(gemini.model, "gemini-1.5-pro");
        assert_eq!(gemini.api_base, config.provider.api_base);
        assert_eq!(gemini.upload_base, config.provider.upload_base);
        assert_eq!(gemini.top_k, 40);
        assert_eq!(gemini.max_output_tokens, 8192);
        assert_eq!(gemini.request_timeout, Duration::from_secs(30));
        assert_eq!(gemini.activation_poll, Duration::from_millis(1000));
        assert_eq!(gemini.activation_max_polls, 30);
    }

    #[test]
    fn configured_level_applies_only_without_overrides() {
        assert!(configured_filter(None, None, "docchat=debug").is_some());
        assert!(configured_filter(None, Some(""), "docchat=debug").is_some());
        assert!(configured_filter(Some("warn"), None, "docchat=debug").is_none());
        assert!(configured_filter(None, Some("docchat_ai=trace"), "docchat=debug").is_none());
    }

    #[test]
    fn websocket_limits_fit_a_full_upload() {
        let limits = IntakeLimits::from_config(&DocchatConfig::default().upload);
        let ws = websocket_config(&limits);
        assert_eq!(ws.max_message_size, Some(limits.max_message_bytes()));
        assert!(limits.max_message_bytes() > 10 * 50 * 1024 * 1024);
    }
}
