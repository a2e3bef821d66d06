mod image;
mod mock;
mod remote;


pub use image::describe_image;
pub use mock::{mock_reply, MockResponder, DEFAULT_REPLY};
pub use remote::{RemoteApi, RemoteResponder, PERSONA_ACK, PERSONA_INSTRUCTION};

use edupeak_core::config::{ResponderConfig, Strategy};
use edupeak_core::error::ProviderError;
use edupeak_core::responder::Responder;
use std::sync::Arc;
use std::time::Duration;

/// Picks the reply strategy. `Auto` goes remote whenever a chat proxy
/// endpoint or a usable Gemini key is configured, otherwise mock.
pub fn create_responder(config: &ResponderConfig) -> Result<Arc<dyn Responder>, ProviderError> {
    let responder: Arc<dyn Responder> = match config.strategy {
        Strategy::Mock => Arc::new(mock_from_config(config)),
        Strategy::Remote => Arc::new(remote_from_config(config).ok_or_else(|| {
            ProviderError::MissingApiKey(
                "GEMINI_API_KEY not set and no chat endpoint configured. \
                 Set one via env var or config file."
                    .into(),
            )
        })?),
        Strategy::Auto => match remote_from_config(config) {
            Some(remote) => Arc::new(remote),
            None => Arc::new(mock_from_config(config)),
        },
    };

    tracing::info!(strategy = ?config.strategy, responder = responder.name(), "reply strategy selected");
    Ok(responder)
}

fn mock_from_config(config: &ResponderConfig) -> MockResponder {
    MockResponder::new(Duration::from_millis(config.mock_delay_ms))
}

fn remote_from_config(config: &ResponderConfig) -> Option<RemoteResponder> {
    if let Some(endpoint) = config.usable_endpoint() {
        return Some(RemoteResponder::chat_proxy(endpoint));
    }
    config
        .usable_api_key()
        .map(|key| RemoteResponder::gemini(config.base_url.clone(), key, config.model.clone()))
}
