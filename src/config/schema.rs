use crate::error::ConfigError;
use crate::media::ScratchConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 100 MiB: the largest declared body the relay will accept.
pub const DEFAULT_MAX_CONTENT_LENGTH: u64 = 100 * 1024 * 1024;
/// Characters of text relayed before truncation.
pub const DEFAULT_MAX_TEXT_CHARS: usize = 65_536;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Workspace directory - computed from home, not serialized
    #[serde(skip)]
    pub workspace_dir: PathBuf,
    /// Path to config.toml - computed from home, not serialized
    #[serde(skip)]
    pub config_path: PathBuf,

    /// `trace`, `debug`, `info`, `warn` or `error`
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub fetch: FetchConfig,

    #[serde(default)]
    pub relay: RelayConfig,

    #[serde(default)]
    pub scratch: ScratchConfig,

    #[serde(default)]
    pub gateway: GatewayConfig,

    #[serde(default)]
    pub whatsapp: Option<WhatsAppConfig>,
}

fn default_log_level() -> String {
    "info".into()
}

impl Default for Config {
    fn default() -> Self {
        let home = directories::UserDirs::new()
            .map_or_else(|| PathBuf::from("."), |u| u.home_dir().to_path_buf());
        let linkrelay_dir = home.join(".linkrelay");

        Self {
            workspace_dir: linkrelay_dir.join("workspace"),
            config_path: linkrelay_dir.join("config.toml"),
            log_level: default_log_level(),
            fetch: FetchConfig::default(),
            relay: RelayConfig::default(),
            scratch: ScratchConfig::default(),
            gateway: GatewayConfig::default(),
            whatsapp: None,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fetch.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "fetch.timeout_secs must be greater than 0".into(),
            ));
        }
        if self.fetch.max_content_length == 0 {
            return Err(ConfigError::Validation(
                "fetch.max_content_length must be greater than 0".into(),
            ));
        }
        if self.relay.max_text_chars == 0 {
            return Err(ConfigError::Validation(
                "relay.max_text_chars must be greater than 0".into(),
            ));
        }
        if self.scratch.sweep_interval_secs == 0 {
            return Err(ConfigError::Validation(
                "scratch.sweep_interval_secs must be greater than 0".into(),
            ));
        }
        if self.log_level.parse::<tracing::Level>().is_err() {
            return Err(ConfigError::Validation(format!(
                "unknown log_level '{}'",
                self.log_level
            )));
        }
        if let Some(wa) = &self.whatsapp
            && (wa.access_token.trim().is_empty() || wa.phone_number_id.trim().is_empty())
        {
            return Err(ConfigError::Validation(
                "whatsapp.access_token and whatsapp.phone_number_id are required".into(),
            ));
        }
        Ok(())
    }

    /// Scratch directory, falling back to `<workspace>/scratch`.
    pub fn scratch_dir(&self) -> PathBuf {
        self.scratch
            .dir
            .as_deref()
            .map_or_else(|| self.workspace_dir.join("scratch"), PathBuf::from)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Per-strategy timeout (default: 10)
    #[serde(default = "default_fetch_timeout_secs")]
    pub timeout_secs: u64,
    /// Largest body accepted, in bytes (default: 100 MiB)
    #[serde(default = "default_max_content_length")]
    pub max_content_length: u64,
    /// User agent for the standard strategy
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_fetch_timeout_secs() -> u64 {
    10
}

fn default_max_content_length() -> u64 {
    DEFAULT_MAX_CONTENT_LENGTH
}

fn default_user_agent() -> String {
    concat!("linkrelay/", env!("CARGO_PKG_VERSION")).into()
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_fetch_timeout_secs(),
            max_content_length: default_max_content_length(),
            user_agent: default_user_agent(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    #[serde(default = "default_max_text_chars")]
    pub max_text_chars: usize,
}

fn default_max_text_chars() -> usize {
    DEFAULT_MAX_TEXT_CHARS
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            max_text_chars: default_max_text_chars(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Gateway port (default: 3000)
    #[serde(default = "default_gateway_port")]
    pub port: u16,
    /// Gateway host (default: 127.0.0.1)
    #[serde(default = "default_gateway_host")]
    pub host: String,
    /// Allow binding to a non-loopback address (default: false)
    #[serde(default)]
    pub allow_public_bind: bool,
}

fn default_gateway_port() -> u16 {
    3000
}

fn default_gateway_host() -> String {
    "127.0.0.1".into()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_gateway_port(),
            host: default_gateway_host(),
            allow_public_bind: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhatsAppConfig {
    /// Access token from Meta Business Suite
    pub access_token: String,
    /// Phone number ID from Meta Business API
    pub phone_number_id: String,
    /// Webhook verify token (you define this, Meta sends it back for verification)
    pub verify_token: String,
    /// App secret for webhook signature verification (X-Hub-Signature-256)
    #[serde(default)]
    pub app_secret: Option<String>,
    /// E.164 numbers allowed to trigger fetches, or "*"
    #[serde(default = "default_allowed_numbers")]
    pub allowed_numbers: Vec<String>,
    /// Graph API base URL
    #[serde(default = "default_api_base")]
    pub api_base: String,
}

fn default_allowed_numbers() -> Vec<String> {
    vec!["*".into()]
}

fn default_api_base() -> String {
    "https://graph.facebook.com/v18.0".into()
}
