//! Configuration, loaded from `config.toml` with environment overrides.
//!
//! Resolution order for the config file: `--config` flag → `TGVAULT_CONFIG`
//! env → `~/.tgvault/config.toml`. Telegram credentials can always be
//! overridden through `TELEGRAM_API_ID`, `TELEGRAM_API_HASH`,
//! `TELEGRAM_PHONE` and `TELEGRAM_SESSION`, so a config file is optional.

use crate::client::GatewayClient;
use crate::filters::FilterKind;
use crate::namers::NamerKind;
use anyhow::{Context, Result};
use directories::UserDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level tgvault configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path the config was loaded from - computed, not serialized.
    #[serde(skip)]
    pub config_path: Option<PathBuf>,

    /// Telegram account credentials (`[telegram]`).
    #[serde(default)]
    pub telegram: TelegramSection,

    /// Download behavior (`[download]`).
    #[serde(default)]
    pub download: DownloadSection,

    /// Base URL of the local MTProto gateway the archiver talks to.
    #[serde(default = "default_gateway_url")]
    pub gateway_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_path: None,
            telegram: TelegramSection::default(),
            download: DownloadSection::default(),
            gateway_url: default_gateway_url(),
        }
    }
}

/// Credentials for the personal-account session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramSection {
    /// API ID from <https://my.telegram.org/apps>.
    #[serde(default)]
    pub api_id: i64,
    /// API hash from <https://my.telegram.org/apps>.
    #[serde(default)]
    pub api_hash: String,
    /// Phone number with country code, e.g. `+1234567890`.
    #[serde(default)]
    pub phone_number: String,
    /// Name for the gateway session file.
    #[serde(default = "default_session_name")]
    pub session_name: String,
}

impl Default for TelegramSection {
    fn default() -> Self {
        Self {
            api_id: 0,
            api_hash: String::new(),
            phone_number: String::new(),
            session_name: default_session_name(),
        }
    }
}

/// What to download and where.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadSection {
    /// Root directory for downloaded media. One subdirectory per channel.
    #[serde(default = "default_download_path")]
    pub path: PathBuf,
    /// Acknowledge processed messages as read. Default: `true`.
    #[serde(default = "default_true")]
    pub mark_as_read: bool,
    /// Abort the session after the first channel reporting an error.
    #[serde(default)]
    pub fail_fast: bool,
    /// Which media to download: `all`, `images` or `videos`.
    #[serde(default)]
    pub filter: FilterKind,
    /// Filename strategy: `timestamp` or `channel-prefix`.
    #[serde(default)]
    pub namer: NamerKind,
    /// Where to write the session summary. Defaults to
    /// `download_summary.txt` under the download path.
    #[serde(default)]
    pub summary_file: Option<PathBuf>,
}

impl Default for DownloadSection {
    fn default() -> Self {
        Self {
            path: default_download_path(),
            mark_as_read: true,
            fail_fast: false,
            filter: FilterKind::default(),
            namer: NamerKind::default(),
            summary_file: None,
        }
    }
}

fn default_gateway_url() -> String {
    GatewayClient::DEFAULT_BASE_URL.to_string()
}

fn default_session_name() -> String {
    "telegram_session".to_string()
}

fn default_download_path() -> PathBuf {
    PathBuf::from("telegram_downloads")
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration. `explicit_path` wins over the `TGVAULT_CONFIG` env
    /// var, which wins over `~/.tgvault/config.toml`. A missing file yields
    /// defaults; credentials are then expected from the environment.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let path = explicit_path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var("TGVAULT_CONFIG").ok().map(PathBuf::from))
            .or_else(default_config_path);

        let mut config = match &path {
            Some(p) if p.exists() => {
                let raw = std::fs::read_to_string(p)
                    .with_context(|| format!("failed to read config from {}", p.display()))?;
                let mut parsed: Config = toml::from_str(&raw)
                    .with_context(|| format!("invalid config file {}", p.display()))?;
                parsed.config_path = Some(p.clone());
                parsed
            }
            _ => Config::default(),
        };

        config.apply_env_overrides();
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Some(api_id) = read_env("TELEGRAM_API_ID").and_then(|v| v.parse().ok()) {
            self.telegram.api_id = api_id;
        }
        if let Some(api_hash) = read_env("TELEGRAM_API_HASH") {
            self.telegram.api_hash = api_hash;
        }
        if let Some(phone) = read_env("TELEGRAM_PHONE") {
            self.telegram.phone_number = phone;
        }
        if let Some(session) = read_env("TELEGRAM_SESSION") {
            self.telegram.session_name = session;
        }
        if let Some(path) = read_env("TELEGRAM_DOWNLOAD_PATH") {
            self.download.path = PathBuf::from(path);
        }
    }

    /// Validate the configuration, returning every problem found rather than
    /// stopping at the first.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.telegram.api_id == 0 {
            errors.push("TELEGRAM_API_ID is required and must be non-zero".to_string());
        }
        if self.telegram.api_hash.is_empty() {
            errors.push("TELEGRAM_API_HASH is required".to_string());
        }
        if self.telegram.phone_number.is_empty() {
            errors.push("TELEGRAM_PHONE is required".to_string());
        } else if !self.telegram.phone_number.starts_with('+') {
            errors.push(
                "TELEGRAM_PHONE must include country code (e.g. +1234567890)".to_string(),
            );
        }
        if self.telegram.session_name.is_empty() {
            errors.push("session_name cannot be empty".to_string());
        }
        if self.gateway_url.is_empty() {
            errors.push("gateway_url cannot be empty".to_string());
        }

        errors
    }

    /// Where the session summary should be written.
    pub fn summary_path(&self) -> PathBuf {
        self.download
            .summary_file
            .clone()
            .unwrap_or_else(|| self.download.path.join("download_summary.txt"))
    }
}

fn default_config_path() -> Option<PathBuf> {
    UserDirs::new().map(|dirs| dirs.home_dir().join(".tgvault").join("config.toml"))
}

fn read_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}
