use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::ConfigError;

/// Google Generative Language API base URL
const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Value shipped in the portal's `.env.local` template; never a real key.
pub const PLACEHOLDER_API_KEY: &str = "YOUR_API_KEY_HERE";

pub const DEFAULT_SESSIONS_KEY: &str = "edupeak.cortex.sessions";
pub const DEFAULT_CURRENT_KEY: &str = "edupeak.cortex.current";

/// Which reply strategy to use
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Remote when an endpoint or API key is available, otherwise mock
    #[default]
    Auto,
    Remote,
    Mock,
}

impl std::str::FromStr for Strategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "remote" => Ok(Self::Remote),
            "mock" => Ok(Self::Mock),
            other => Err(ConfigError::Invalid(format!("unknown strategy '{other}'"))),
        }
    }
}

/// Persistence backend for the session store
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    /// Nothing survives the process
    Memory,
    /// One JSON file per key under the data directory
    #[default]
    File,
    /// SQLite database under the data directory
    Sqlite,
}

impl std::str::FromStr for StorageBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "file" => Ok(Self::File),
            "sqlite" => Ok(Self::Sqlite),
            other => Err(ConfigError::Invalid(format!(
                "unknown storage backend '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_working_dir")]
    pub working_dir: PathBuf,

    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub responder: ResponderConfig,

    #[serde(default)]
    pub debug: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            working_dir: default_working_dir(),
            data_dir: default_data_dir(),
            storage: StorageConfig::default(),
            responder: ResponderConfig::default(),
            debug: false,
        }
    }
}

fn default_working_dir() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

fn default_data_dir() -> String {
    ".edupeak".into()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,

    /// Key holding the serialized session array
    #[serde(default = "default_sessions_key")]
    pub sessions_key: String,

    /// Key holding the current session id
    #[serde(default = "default_current_key")]
    pub current_key: String,
}

fn default_sessions_key() -> String {
    DEFAULT_SESSIONS_KEY.into()
}

fn default_current_key() -> String {
    DEFAULT_CURRENT_KEY.into()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            sessions_key: default_sessions_key(),
            current_key: default_current_key(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponderConfig {
    #[serde(default)]
    pub strategy: Strategy,

    /// Chat proxy endpoint (`POST {"message"}` -> `{"response"}`). Takes
    /// precedence over the Gemini key when both are set.
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Gemini API key
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_model")]
    pub model: String,

    /// Cosmetic pause before a mock reply is shown
    #[serde(default = "default_mock_delay_ms")]
    pub mock_delay_ms: u64,
}

fn default_base_url() -> String {
    DEFAULT_GEMINI_BASE_URL.into()
}

fn default_model() -> String {
    "gemini-pro".into()
}

fn default_mock_delay_ms() -> u64 {
    1_200
}

impl Default for ResponderConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::default(),
            endpoint: None,
            api_key: None,
            base_url: default_base_url(),
            model: default_model(),
            mock_delay_ms: default_mock_delay_ms(),
        }
    }
}

impl ResponderConfig {
    /// The Gemini key, unless it is absent, blank or the template placeholder.
    pub fn usable_api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| is_usable_key(k))
    }

    pub fn usable_endpoint(&self) -> Option<&str> {
        self.endpoint
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
    }

    pub fn has_remote(&self) -> bool {
        self.usable_endpoint().is_some() || self.usable_api_key().is_some()
    }
}

fn is_usable_key(key: &str) -> bool {
    !key.is_empty() && key != PLACEHOLDER_API_KEY
}

pub fn load_config(working_dir: Option<PathBuf>) -> Result<AppConfig, ConfigError> {
    let wd = working_dir.unwrap_or_else(|| std::env::current_dir().unwrap_or_default());

    let mut config = AppConfig {
        working_dir: wd.clone(),
        ..Default::default()
    };

    // Global config
    if let Some(config_dir) = dirs::config_dir() {
        let global_path = config_dir.join("edupeak").join("config.json");
        if global_path.exists() {
            tracing::debug!(path = %global_path.display(), "loading global config");
            merge_config(&mut config, read_config_file(&global_path)?);
        }
    }

    // Project config
    let local_path = wd.join("edupeak.json");
    if local_path.exists() {
        tracing::debug!(path = %local_path.display(), "loading project config");
        merge_config(&mut config, read_config_file(&local_path)?);
    }

    apply_env(&mut config, |name| std::env::var(name).ok())?;

    Ok(config)
}

fn read_config_file(path: &std::path::Path) -> Result<AppConfig, ConfigError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::File(format!("{}: {e}", path.display())))?;
    serde_json::from_str(&content)
        .map_err(|e| ConfigError::Invalid(format!("{}: {e}", path.display())))
}

fn merge_config(base: &mut AppConfig, overlay: AppConfig) {
    if overlay.data_dir != default_data_dir() {
        base.data_dir = overlay.data_dir;
    }
    if overlay.storage.backend != StorageBackend::default() {
        base.storage.backend = overlay.storage.backend;
    }
    if overlay.storage.sessions_key != default_sessions_key() {
        base.storage.sessions_key = overlay.storage.sessions_key;
    }
    if overlay.storage.current_key != default_current_key() {
        base.storage.current_key = overlay.storage.current_key;
    }
    if overlay.responder.strategy != Strategy::default() {
        base.responder.strategy = overlay.responder.strategy;
    }
    if overlay.responder.endpoint.is_some() {
        base.responder.endpoint = overlay.responder.endpoint;
    }
    if overlay.responder.api_key.is_some() {
        base.responder.api_key = overlay.responder.api_key;
    }
    if overlay.responder.base_url != default_base_url() {
        base.responder.base_url = overlay.responder.base_url;
    }
    if overlay.responder.model != default_model() {
        base.responder.model = overlay.responder.model;
    }
    if overlay.responder.mock_delay_ms != default_mock_delay_ms() {
        base.responder.mock_delay_ms = overlay.responder.mock_delay_ms;
    }
    if overlay.debug {
        base.debug = true;
    }
}

/// Environment overrides. `lookup` is injected so tests never touch the
/// process environment.
fn apply_env<F>(config: &mut AppConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

    if config.responder.usable_api_key().is_none() {
        if let Some(key) = non_empty("GEMINI_API_KEY").filter(|k| is_usable_key(k.trim())) {
            config.responder.api_key = Some(key);
        }
    }

    if let Some(endpoint) = non_empty("EDUPEAK_CHAT_ENDPOINT") {
        config.responder.endpoint = Some(endpoint);
    }

    if let Some(backend) = non_empty("EDUPEAK_STORAGE") {
        config.storage.backend = backend.parse()?;
    }

    Ok(())
}

impl AppConfig {
    pub fn data_path(&self) -> PathBuf {
        self.working_dir.join(&self.data_dir)
    }

    /// `EnvFilter` directive for the log subscriber.
    pub fn log_filter(&self) -> &'static str {
        if self.debug {
            "debug"
        } else {
            "warn"
        }
    }
}
