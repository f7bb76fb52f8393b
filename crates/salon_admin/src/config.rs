use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use admin_logging::{admin_info, admin_warn, LogDestination};
use anyhow::{Context, Result};
use salon_engine::{write_atomic, ClientSettings};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_FILENAME: &str = "salon_admin.ron";
pub const TOKEN_ENV: &str = "SALON_ADMIN_TOKEN";

/// Settings read from the RON config file. Every field is optional in the
/// file; missing ones take the defaults below.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    pub base_url: String,
    pub token: Option<String>,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    /// Upper bound for a whole load, all pages included.
    pub load_timeout_secs: u64,
    pub max_bytes: u64,
    pub log_file: Option<PathBuf>,
    /// When false and `log_file` is set, logs go to the file only.
    pub log_to_terminal: bool,
    pub verbose: bool,
}

impl Default for AdminConfig {
    fn default() -> Self {
        let client = ClientSettings::default();
        Self {
            base_url: client.base_url,
            token: None,
            connect_timeout_secs: client.connect_timeout.as_secs(),
            request_timeout_secs: client.request_timeout.as_secs(),
            load_timeout_secs: 300,
            max_bytes: client.max_bytes,
            log_file: None,
            log_to_terminal: true,
            verbose: false,
        }
    }
}

impl AdminConfig {
    pub fn client_settings(&self) -> ClientSettings {
        ClientSettings {
            base_url: self.base_url.clone(),
            auth_token: self.token.clone(),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            max_bytes: self.max_bytes,
        }
    }

    pub fn log_destination(&self) -> LogDestination {
        match (&self.log_file, self.log_to_terminal) {
            (Some(path), true) => LogDestination::Both(path.clone()),
            (Some(path), false) => LogDestination::File(path.clone()),
            (None, _) => LogDestination::Terminal,
        }
    }

    pub fn load_timeout(&self) -> Duration {
        Duration::from_secs(self.load_timeout_secs)
    }

    /// Replaces the token with `token` when it is set and non-empty.
    pub fn with_token_override(mut self, token: Option<String>) -> Self {
        if let Some(token) = token.filter(|t| !t.trim().is_empty()) {
            self.token = Some(token.trim().to_string());
        }
        self
    }
}

/// Reads the config at `path`. A missing file yields the defaults; a file
/// that exists but does not parse is an error.
pub fn load_config(path: &Path) -> Result<AdminConfig> {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            admin_warn!("No config at {:?}; using defaults", path);
            return Ok(AdminConfig::default());
        }
        Err(err) => {
            return Err(err).with_context(|| format!("failed to read config {}", path.display()))
        }
    };

    let config: AdminConfig = ron::from_str(&content)
        .with_context(|| format!("failed to parse config {}", path.display()))?;
    admin_info!("Loaded config from {:?}", path);
    Ok(config)
}

/// Writes `config` as pretty RON to `path`, replacing any existing file.
pub fn save_config(path: &Path, config: &AdminConfig) -> Result<PathBuf> {
    let pretty = ron::ser::PrettyConfig::new();
    let content =
        ron::ser::to_string_pretty(config, pretty).context("failed to serialize config")?;

    let written = write_atomic(path, content.as_bytes())
        .with_context(|| format!("failed to write config {}", path.display()))?;
    Ok(written)
}
