//! Application configuration structures.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Backend connection settings
    #[serde(default)]
    pub backend: BackendConfig,

    /// Local cache location
    #[serde(default)]
    pub storage: StorageConfig,

    /// Schedule normalization rules
    #[serde(default)]
    pub schedule: ScheduleConfig,

    /// Notification cache settings
    #[serde(default)]
    pub notifications: NotificationConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.backend.base_url.trim().is_empty() {
            return Err(AppError::validation("backend.base_url is empty"));
        }
        self.backend.url()?;
        if self.backend.user_agent.trim().is_empty() {
            return Err(AppError::validation("backend.user_agent is empty"));
        }
        if self.backend.timeout_secs == 0 {
            return Err(AppError::validation("backend.timeout_secs must be > 0"));
        }
        if self.schedule.class_hour_marker.trim().is_empty() {
            return Err(AppError::validation(
                "schedule.class_hour_marker is empty",
            ));
        }
        if self.notifications.retention_days == 0 {
            return Err(AppError::validation(
                "notifications.retention_days must be > 0",
            ));
        }
        Ok(())
    }
}

/// HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL every endpoint path is joined onto
    #[serde(default = "defaults::base_url")]
    pub base_url: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,
}

impl BackendConfig {
    /// Parse the base URL.
    pub fn url(&self) -> Result<Url> {
        Ok(Url::parse(self.base_url.trim())?)
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::base_url(),
            timeout_secs: defaults::timeout(),
            user_agent: defaults::user_agent(),
        }
    }
}

/// Local cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding one file per cached key
    #[serde(default = "defaults::storage_dir")]
    pub dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: defaults::storage_dir(),
        }
    }
}

/// Couple normalization rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Cabinet value that marks a class hour slot
    #[serde(default = "defaults::class_hour_marker")]
    pub class_hour_marker: String,

    /// Title forced onto class hour slots
    #[serde(default = "defaults::class_hour_label")]
    pub class_hour_label: String,

    /// Raw slot label the backend uses for class hour
    #[serde(default = "defaults::class_hour_token")]
    pub class_hour_token: String,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            class_hour_marker: defaults::class_hour_marker(),
            class_hour_label: defaults::class_hour_label(),
            class_hour_token: defaults::class_hour_token(),
        }
    }
}

/// Notification cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// Cached notifications older than this are dropped on read
    #[serde(default = "defaults::retention_days")]
    pub retention_days: u32,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            retention_days: defaults::retention_days(),
        }
    }
}

mod defaults {
    use std::path::PathBuf;

    // Backend defaults
    pub fn base_url() -> String {
        "http://localhost:8080".into()
    }
    pub fn timeout() -> u64 {
        10
    }
    pub fn user_agent() -> String {
        concat!("schedule-client/", env!("CARGO_PKG_VERSION")).into()
    }

    // Storage defaults
    pub fn storage_dir() -> PathBuf {
        PathBuf::from("storage")
    }

    // Schedule defaults
    pub fn class_hour_marker() -> String {
        "К".into()
    }
    pub fn class_hour_label() -> String {
        "Классный час".into()
    }
    pub fn class_hour_token() -> String {
        "кл.час".into()
    }

    // Notification defaults
    pub fn retention_days() -> u32 {
        7
    }
}
