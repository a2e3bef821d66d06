mod noninteractive;
mod output;
mod repl;

use anyhow::Result;
use clap::Parser;
use edupeak_chat::ChatService;
use edupeak_core::config::{AppConfig, StorageBackend, Strategy};
use edupeak_storage::{ChatSessionStore, StorageKeys, StoreEvent};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "edupeak", version, about = "Cortex-AI learning assistant for the terminal")]
struct Cli {
    /// Non-interactive mode: send one message and print the reply
    #[arg(short, long)]
    prompt: Option<String>,

    /// Working directory
    #[arg(short = 'c', long = "cwd")]
    working_dir: Option<PathBuf>,

    /// Output format for non-interactive mode
    #[arg(short = 'f', long, default_value = "text")]
    output_format: OutputFormat,

    /// Select a session on start (id or unique id prefix)
    #[arg(long)]
    session: Option<String>,

    /// Reply strategy: auto, remote or mock (overrides config)
    #[arg(long)]
    strategy: Option<Strategy>,

    /// Session storage: memory, file or sqlite (overrides config)
    #[arg(long)]
    storage: Option<StorageBackend>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[derive(Debug, Clone, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

pub struct App {
    pub chat: ChatService,
    pub config: AppConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = edupeak_core::config::load_config(cli.working_dir.clone())
        .map_err(|e| anyhow::anyhow!("{e}"))?;
    if let Some(strategy) = cli.strategy {
        config.responder.strategy = strategy;
    }
    if let Some(backend) = cli.storage {
        config.storage.backend = backend;
    }
    config.debug |= cli.debug;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(config.log_filter()))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
    tracing::debug!(
        working_dir = %config.working_dir.display(),
        backend = ?config.storage.backend,
        strategy = ?config.responder.strategy,
        "configuration loaded"
    );

    let mut app = build_app(config).await?;

    if let Some(prefix) = cli.session {
        let id = app
            .chat
            .store()
            .find_by_prefix(&prefix)
            .map(|s| s.id().to_string())
            .ok_or_else(|| anyhow::anyhow!("No session matches '{prefix}'"))?;
        app.chat.store_mut().select_session(&id).await;
    }

    if let Some(prompt) = cli.prompt {
        noninteractive::run(app, prompt, cli.output_format).await
    } else {
        repl::run(app).await
    }
}

async fn build_app(config: AppConfig) -> Result<App> {
    let kv = edupeak_storage::open_backend(&config)
        .await
        .map_err(|e| anyhow::anyhow!("{e}"))?;
    let store = ChatSessionStore::open(kv, StorageKeys::from_config(&config.storage)).await;
    spawn_event_logger(&store);

    let responder = edupeak_providers::create_responder(&config.responder)
        .map_err(|e| anyhow::anyhow!("{e}"))?;

    Ok(App {
        chat: ChatService::new(store, responder),
        config,
    })
}

/// Mirrors store notifications into the debug log.
fn spawn_event_logger(store: &ChatSessionStore) {
    let mut rx = store.subscribe();
    tokio::spawn(async move {
        use tokio::sync::broadcast::error::RecvError;
        loop {
            match rx.recv().await {
                Ok(StoreEvent::SessionCreated { id }) => tracing::debug!(%id, "session created"),
                Ok(StoreEvent::SessionSelected { id }) => tracing::debug!(%id, "session selected"),
                Ok(StoreEvent::SessionDeleted { id, current }) => {
                    tracing::debug!(%id, ?current, "session deleted")
                }
                Ok(StoreEvent::SessionRenamed { id, title }) => {
                    tracing::debug!(%id, %title, "session renamed")
                }
                Ok(StoreEvent::MessageAppended {
                    session_id,
                    message_id,
                }) => tracing::debug!(session = %session_id, message = %message_id, "message appended"),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "event logger lagged")
                }
                Err(RecvError::Closed) => break,
            }
        }
    });
}
