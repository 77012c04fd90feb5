//! Application configuration (`config.toml`).
//!
//! The file is created with defaults on first load. Every key is optional;
//! missing keys take their default value.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::storage::AtomicFile;
use kindred_core::Result;

fn default_api_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_recent_chats_url() -> String {
    "http://localhost:5050/recent-chats".to_string()
}

fn default_recent_limit() -> usize {
    5
}

fn default_request_timeout_secs() -> u64 {
    60
}

fn default_startup_timeout_secs() -> u64 {
    30
}

fn default_health_poll_interval_ms() -> u64 {
    500
}

/// One local process the chat backend depends on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceSpec {
    /// Name used in logs
    pub name: String,
    /// Executable to spawn
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_dir: Option<PathBuf>,
}

/// Root configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Base URL of the inference API (`/ask`, `/reset`, `/health`)
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Recent chats endpoint of the network source
    #[serde(default = "default_recent_chats_url")]
    pub recent_chats_url: String,
    #[serde(default = "default_recent_limit")]
    pub recent_limit: usize,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_startup_timeout_secs")]
    pub startup_timeout_secs: u64,
    #[serde(default = "default_health_poll_interval_ms")]
    pub health_poll_interval_ms: u64,
    /// Overrides the platform data directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    #[serde(default)]
    pub services: Vec<ServiceSpec>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            recent_chats_url: default_recent_chats_url(),
            recent_limit: default_recent_limit(),
            request_timeout_secs: default_request_timeout_secs(),
            startup_timeout_secs: default_startup_timeout_secs(),
            health_poll_interval_ms: default_health_poll_interval_ms(),
            data_dir: None,
            services: Vec::new(),
        }
    }
}

impl AppConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn startup_timeout(&self) -> Duration {
        Duration::from_secs(self.startup_timeout_secs)
    }

    pub fn health_poll_interval(&self) -> Duration {
        Duration::from_millis(self.health_poll_interval_ms)
    }
}

/// Loads `config.toml`, creating it with defaults when missing.
#[derive(Debug, Clone)]
pub struct ConfigService {
    file: AtomicFile<AppConfig>,
}

impl ConfigService {
    pub fn new(path: PathBuf) -> Self {
        Self {
            file: AtomicFile::toml(path),
        }
    }

    pub fn path(&self) -> &std::path::Path {
        self.file.path()
    }

    /// Returns the stored configuration.
    pub fn load(&self) -> Result<AppConfig> {
        match self.file.load()? {
            Some(config) => Ok(config),
            None => {
                let config = AppConfig::default();
                self.file.save(&config)?;
                tracing::info!(
                    "[Config] Created default configuration at {}",
                    self.file.path().display()
                );
                Ok(config)
            }
        }
    }

    pub fn save(&self, config: &AppConfig) -> Result<()> {
        self.file.save(config)?;
        Ok(())
    }
}
