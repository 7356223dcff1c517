pub mod coordinator;
pub mod fixture;
pub mod http;

#[cfg(test)]
pub(crate) mod scripted;

use std::collections::HashSet;
use std::future::Future;
use std::time::Duration;

use crate::config::WidgetConfig;
use crate::core::item::Item;
use fixture::FixtureSource;
use http::HttpSource;

/// Load status shown to the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Loaded,
    Failed(String),
}

impl LoadState {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed(message) => Some(message.as_str()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    #[error("{0}")]
    Remote(String),
    #[error("timed out after {}ms", .0.as_millis())]
    TimedOut(Duration),
    #[error("request failed: {0}")]
    Http(String),
    #[error("unexpected response: {0}")]
    Decode(String),
    #[error("remote returned duplicate item id {0}")]
    DuplicateId(u64),
}

/// How a load attempt ended. Cancellation is its own outcome, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Loaded(Vec<Item>),
    Failed(LoadError),
    Cancelled,
}

/// A remote that can hand back the full item list.
pub trait RemoteSource: Send + Sync + 'static {
    fn load_items(&self) -> impl Future<Output = Result<Vec<Item>, LoadError>> + Send;
}

/// Rejects payloads that would break id uniqueness in the list.
pub fn check_unique_ids(items: &[Item]) -> Result<(), LoadError> {
    let mut seen = HashSet::with_capacity(items.len());
    for item in items {
        if !seen.insert(item.id) {
            return Err(LoadError::DuplicateId(item.id));
        }
    }
    Ok(())
}

/// The remote picked from configuration.
pub enum Source {
    Fixture(FixtureSource),
    Http(HttpSource),
}

impl Source {
    pub fn from_config(config: &WidgetConfig) -> Result<Self, LoadError> {
        match &config.remote_url {
            Some(url) => {
                log::info!("Using remote item source at {}", url);
                Ok(Self::Http(HttpSource::new(url)?))
            }
            None => {
                log::info!(
                    "Using simulated item source ({} items, {}ms latency)",
                    config.fixture.len(),
                    config.latency_ms
                );
                Ok(Self::Fixture(FixtureSource::from_config(config)))
            }
        }
    }
}

impl RemoteSource for Source {
    async fn load_items(&self) -> Result<Vec<Item>, LoadError> {
        match self {
            Self::Fixture(source) => source.load_items().await,
            Self::Http(source) => source.load_items().await,
        }
    }
}
