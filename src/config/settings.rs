//! Configuration settings structure
//!
//! Defines the main settings structure and loading logic for the checker.
//! Everything the checker needs at runtime lives here and is handed to
//! constructors explicitly; nothing is created on import.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Sender id Telegram uses for login codes and other service notifications
pub const SERVICE_NOTIFICATIONS_ID: i64 = 777000;

/// Main configuration settings for the checker
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// File locations
    pub paths: PathSettings,
    /// Session migration configuration
    pub migration: MigrationSettings,
    /// SpamBot conversation configuration
    pub probe: ProbeSettings,
    /// Proxy ordering configuration
    pub proxy: ProxySettings,
    /// Logging configuration
    pub logging: LoggingSettings,
}

/// Filesystem locations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathSettings {
    /// Proxy list, one `host:port:username:password` per line
    pub proxies_file: PathBuf,
    /// Directory receiving the freshly created sessions
    pub new_session_dir: PathBuf,
}

/// Login code relay configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MigrationSettings {
    /// How long to wait for the login code on the old session, in seconds
    pub code_timeout_secs: u64,
    /// Sender whose messages carry login codes
    pub service_sender_id: i64,
    /// Suffix appended to the account name for the new session file
    pub new_session_suffix: String,
}

/// SpamBot conversation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeSettings {
    /// Username of the anti-spam bot
    pub bot_username: String,
    /// Message that starts the conversation
    pub command: String,
    /// How long to wait for the reply, in seconds
    pub timeout_secs: u64,
    /// Reply fragments meaning "no restrictions" (matched case-insensitively)
    pub clear_phrases: Vec<String>,
}

/// Proxy ordering configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxySettings {
    /// Fixed seed for reproducible proxy order; random when absent
    pub shuffle_seed: Option<u64>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log level
    pub level: String,
    /// Enable verbose logging
    pub verbose: bool,
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            proxies_file: PathBuf::from("proxies.txt"),
            new_session_dir: PathBuf::from("files/new_sessions"),
        }
    }
}

impl Default for MigrationSettings {
    fn default() -> Self {
        Self {
            code_timeout_secs: 120,
            service_sender_id: SERVICE_NOTIFICATIONS_ID,
            new_session_suffix: "_new".to_string(),
        }
    }
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            bot_username: "SpamBot".to_string(),
            command: "/start".to_string(),
            timeout_secs: 10,
            clear_phrases: vec![
                "good news, no limits are currently applied to your account".to_string(),
            ],
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            verbose: false,
        }
    }
}

impl MigrationSettings {
    /// Login code wait as a [`Duration`]
    pub fn code_timeout(&self) -> Duration {
        Duration::from_secs(self.code_timeout_secs)
    }
}

impl ProbeSettings {
    /// Reply wait as a [`Duration`]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Settings {
    /// Load settings from a TOML file; missing keys keep their defaults
    pub fn from_file(path: &Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let settings: Settings = toml::from_str(&content)?;
        Ok(settings)
    }

    /// Override fields from `SPAMCHECK_*` environment variables
    pub fn merge_with_env(mut self) -> crate::Result<Self> {
        if let Ok(path) = std::env::var("SPAMCHECK_PROXIES_FILE") {
            self.paths.proxies_file = PathBuf::from(path);
        }

        if let Ok(dir) = std::env::var("SPAMCHECK_SESSION_DIR") {
            self.paths.new_session_dir = PathBuf::from(dir);
        }

        if let Ok(secs) = std::env::var("SPAMCHECK_CODE_TIMEOUT") {
            self.migration.code_timeout_secs = secs
                .parse()
                .map_err(|e| crate::Error::Config(format!("Invalid code timeout: {}", e)))?;
        }

        if let Ok(secs) = std::env::var("SPAMCHECK_PROBE_TIMEOUT") {
            self.probe.timeout_secs = secs
                .parse()
                .map_err(|e| crate::Error::Config(format!("Invalid probe timeout: {}", e)))?;
        }

        if let Ok(seed) = std::env::var("SPAMCHECK_PROXY_SEED") {
            self.proxy.shuffle_seed = Some(
                seed.parse()
                    .map_err(|e| crate::Error::Config(format!("Invalid proxy seed: {}", e)))?,
            );
        }

        if let Ok(level) = std::env::var("SPAMCHECK_LOG_LEVEL") {
            self.logging.level = level;
        }

        Ok(self)
    }

    /// Reject settings the checker cannot run with
    pub fn validate(&self) -> crate::Result<()> {
        if self.migration.code_timeout_secs == 0 {
            return Err(crate::Error::config("code_timeout_secs must be positive"));
        }
        if self.probe.timeout_secs == 0 {
            return Err(crate::Error::config("probe timeout_secs must be positive"));
        }
        if self.probe.bot_username.trim().is_empty() {
            return Err(crate::Error::config("probe bot_username is empty"));
        }
        if self.probe.command.trim().is_empty() {
            return Err(crate::Error::config("probe command is empty"));
        }
        if self.probe.clear_phrases.is_empty()
            || self.probe.clear_phrases.iter().any(|p| p.trim().is_empty())
        {
            return Err(crate::Error::config(
                "probe clear_phrases must contain non-empty fragments",
            ));
        }
        match self.logging.level.to_ascii_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
            other => Err(crate::Error::config(format!("Unknown log level: {}", other))),
        }
    }
}
