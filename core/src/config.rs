use std::collections::BTreeMap;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use chatrelay_stream::ConversationState;
use dirs::home_dir;
use serde::Deserialize;
use tracing::info;

use crate::error::RelayErr;
use crate::error::Result;

pub const CONFIG_TOML_FILE: &str = "config.toml";
pub const DEFAULT_BASE_URL: &str = "https://chatgpt.com";
pub const DEFAULT_MODEL: &str = "auto";
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 60_000;
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

const CHATRELAY_HOME_ENV_VAR: &str = "CHATRELAY_HOME";

/// Base config deserialized from `config.toml`.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ConfigToml {
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub request_timeout_ms: Option<u64>,

    /// Bearer token of the browser session.
    pub user_token: Option<String>,
    pub cookie: Option<String>,
    pub user_agent: Option<String>,

    /// Extra request headers. Applied after the built-in ones, so they win.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,

    /// Written back after every turn that reported both identifiers.
    pub conversation_id: Option<String>,
    pub parent_message_id: Option<String>,
}

/// Optional overrides for user configuration (e.g., from CLI flags).
#[derive(Default, Debug, Clone)]
pub struct ConfigOverrides {
    pub config_path: Option<PathBuf>,
    pub model: Option<String>,
    pub base_url: Option<String>,
}

/// Application configuration loaded from disk and merged with overrides.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub base_url: String,
    pub model: String,
    pub request_timeout: Duration,
    pub user_token: Option<String>,
    pub cookie: Option<String>,
    pub user_agent: String,
    pub headers: BTreeMap<String, String>,

    /// Continuation state from the previous turn.
    pub conversation: ConversationState,

    /// File the config was read from; conversation state is persisted here.
    pub config_path: PathBuf,
}

impl Config {
    /// Read `config.toml` (from `overrides.config_path` or the chatrelay
    /// home) and apply `overrides` on top. A missing file yields defaults.
    pub fn load_with_overrides(overrides: ConfigOverrides) -> Result<Self> {
        let config_path = match &overrides.config_path {
            Some(path) => path.clone(),
            None => find_chatrelay_home()?.join(CONFIG_TOML_FILE),
        };
        let cfg = load_config_as_toml(&config_path)?;
        Ok(Self::load_from_base_config_with_overrides(
            cfg,
            overrides,
            config_path,
        ))
    }

    pub fn load_from_base_config_with_overrides(
        cfg: ConfigToml,
        overrides: ConfigOverrides,
        config_path: PathBuf,
    ) -> Self {
        let ConfigOverrides {
            config_path: _,
            model,
            base_url,
        } = overrides;

        let base_url = base_url
            .or(cfg.base_url)
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let base_url = base_url.trim_end_matches('/').to_string();

        Self {
            base_url,
            model: model
                .or(cfg.model)
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            request_timeout: Duration::from_millis(
                cfg.request_timeout_ms.unwrap_or(DEFAULT_REQUEST_TIMEOUT_MS),
            ),
            user_token: non_empty(cfg.user_token),
            cookie: non_empty(cfg.cookie),
            user_agent: non_empty(cfg.user_agent)
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            headers: cfg.headers,
            conversation: ConversationState {
                conversation_id: non_empty(cfg.conversation_id),
                assistant_message_id: non_empty(cfg.parent_message_id),
            },
            config_path,
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

/// Parse `path` as [`ConfigToml`]. A missing file is not an error.
pub fn load_config_as_toml(path: &Path) -> Result<ConfigToml> {
    match std::fs::read_to_string(path) {
        Ok(contents) => Ok(toml::from_str(&contents)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            info!("{} not found, using defaults", path.display());
            Ok(ConfigToml::default())
        }
        Err(e) => Err(e.into()),
    }
}

/// Returns the chatrelay home directory: `$CHATRELAY_HOME` when set and
/// non-empty, otherwise `~/.chatrelay`. Does not verify that it exists.
pub fn find_chatrelay_home() -> Result<PathBuf> {
    resolve_home(std::env::var(CHATRELAY_HOME_ENV_VAR).ok(), home_dir())
}

fn resolve_home(env_value: Option<String>, home: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(val) = env_value.filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(val));
    }
    let mut p = home.ok_or(RelayErr::MissingHome)?;
    p.push(".chatrelay");
    Ok(p)
}
