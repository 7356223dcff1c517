use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::item::{Item, default_fixture};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

fn default_latency_ms() -> u64 {
    1000
}

fn default_fetch_timeout_ms() -> Option<u64> {
    Some(10_000)
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct WidgetConfig {
    /// Artificial delay of the simulated remote.
    pub latency_ms: u64,
    /// Per-attempt fetch timeout; `None` waits forever.
    pub fetch_timeout_ms: Option<u64>,
    /// Real JSON endpoint to load from instead of the simulated remote.
    pub remote_url: Option<String>,
    pub fixture: Vec<Item>,
    /// Forces the simulated remote to fail with this message.
    pub fail_with: Option<String>,
    pub debug_logging: bool,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            latency_ms: default_latency_ms(),
            fetch_timeout_ms: default_fetch_timeout_ms(),
            remote_url: None,
            fixture: default_fixture(),
            fail_with: None,
            debug_logging: false,
        }
    }
}

impl WidgetConfig {
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("ticklist")
            .join("config.json")
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Loads `path`, falling back to defaults when it is missing or invalid.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Ignoring config at {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn fetch_timeout(&self) -> Option<Duration> {
        self.fetch_timeout_ms.map(Duration::from_millis)
    }
}
