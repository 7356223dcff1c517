use std::time::Duration;

use super::{LoadError, RemoteSource};
use crate::config::WidgetConfig;
use crate::core::item::{Item, default_fixture};

/// Simulated remote: waits out a fixed latency, then returns its fixture.
#[derive(Debug, Clone)]
pub struct FixtureSource {
    latency: Duration,
    items: Vec<Item>,
    fail_with: Option<String>,
}

impl Default for FixtureSource {
    fn default() -> Self {
        Self::new(Duration::from_millis(1000), default_fixture())
    }
}

impl FixtureSource {
    pub fn new(latency: Duration, items: Vec<Item>) -> Self {
        Self {
            latency,
            items,
            fail_with: None,
        }
    }

    pub fn from_config(config: &WidgetConfig) -> Self {
        Self {
            latency: Duration::from_millis(config.latency_ms),
            items: config.fixture.clone(),
            fail_with: config.fail_with.clone(),
        }
    }

    /// Makes every load fail with `message` after the latency elapses.
    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.fail_with = Some(message.into());
        self
    }
}

impl RemoteSource for FixtureSource {
    async fn load_items(&self) -> Result<Vec<Item>, LoadError> {
        tokio::time::sleep(self.latency).await;
        match &self.fail_with {
            Some(message) => Err(LoadError::Remote(message.clone())),
            None => Ok(self.items.clone()),
        }
    }
}
