use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

/// Application-level constants
pub const APP_NAME: &str = "Riskscope";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8000";
pub const DEFAULT_MODELS_DIR: &str = "models";
pub const DEFAULT_NARRATOR_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
pub const DEFAULT_NARRATOR_MODEL: &str = "llama3-70b-8192";
pub const DEFAULT_NARRATOR_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_NARRATOR_TIMEOUT_SECS: u64 = 30;

/// Log filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "riskscope=info,riskscope_lib=info,tower_http=info"
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?} ({reason})")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Settings for the chat-completions narrator.
#[derive(Debug, Clone, PartialEq)]
pub struct NarratorConfig {
    /// `None` disables narration.
    pub api_key: Option<String>,
    pub url: String,
    pub model: String,
    pub temperature: f32,
    pub timeout_secs: u64,
}

/// Process configuration, read once at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    pub bind_addr: SocketAddr,
    pub models_dir: PathBuf,
    /// Single origin allowed by CORS. No CORS layer when unset.
    pub client_url: Option<String>,
    pub narrator: NarratorConfig,
}

impl ServiceConfig {
    /// Read configuration from the process environment.
    ///
    /// # Errors
    /// Fails on an unparseable bind address or timeout.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary key lookup.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bind_raw = get("RISKSCOPE_BIND").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidValue {
                key: "RISKSCOPE_BIND",
                value: bind_raw.clone(),
                reason: e.to_string(),
            })?;

        let timeout_secs = match get("RISKSCOPE_NARRATOR_TIMEOUT_SECS") {
            Some(raw) => match raw.parse::<u64>() {
                Ok(0) => {
                    return Err(ConfigError::InvalidValue {
                        key: "RISKSCOPE_NARRATOR_TIMEOUT_SECS",
                        value: raw,
                        reason: "timeout must be at least 1 second".into(),
                    })
                }
                Ok(secs) => secs,
                Err(e) => {
                    return Err(ConfigError::InvalidValue {
                        key: "RISKSCOPE_NARRATOR_TIMEOUT_SECS",
                        value: raw,
                        reason: e.to_string(),
                    })
                }
            },
            None => DEFAULT_NARRATOR_TIMEOUT_SECS,
        };

        Ok(Self {
            bind_addr,
            models_dir: get("RISKSCOPE_MODELS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_MODELS_DIR)),
            client_url: get("CLIENT_URL"),
            narrator: NarratorConfig {
                api_key: get("GROQ_API_KEY"),
                url: get("RISKSCOPE_NARRATOR_URL")
                    .unwrap_or_else(|| DEFAULT_NARRATOR_URL.to_string()),
                model: get("RISKSCOPE_NARRATOR_MODEL")
                    .unwrap_or_else(|| DEFAULT_NARRATOR_MODEL.to_string()),
                temperature: DEFAULT_NARRATOR_TEMPERATURE,
                timeout_secs,
            },
        })
    }
}
