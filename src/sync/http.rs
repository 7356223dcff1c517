use reqwest::{Client, StatusCode};

use super::{LoadError, RemoteSource};
use crate::core::item::Item;

/// Loads items from a JSON endpoint returning `[{"id", "text", "completed"}]`.
pub struct HttpSource {
    url: String,
    http: Client,
}

impl HttpSource {
    pub fn new(url: &str) -> Result<Self, LoadError> {
        let http = Client::builder()
            .build()
            .map_err(|e| LoadError::Http(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            url: url.to_string(),
            http,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl RemoteSource for HttpSource {
    async fn load_items(&self) -> Result<Vec<Item>, LoadError> {
        let resp = self
            .http
            .get(&self.url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| LoadError::Http(e.to_string()))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| LoadError::Http(format!("Failed to read response: {}", e)))?;

        check_status(&self.url, status)?;
        parse_items(&body)
    }
}

/// Maps a non-2xx response to a user-visible remote error.
pub fn check_status(url: &str, status: StatusCode) -> Result<(), LoadError> {
    if status.is_success() {
        Ok(())
    } else {
        Err(LoadError::Remote(format!("{} returned {}", url, status)))
    }
}

pub fn parse_items(body: &str) -> Result<Vec<Item>, LoadError> {
    serde_json::from_str(body).map_err(|e| LoadError::Decode(e.to_string()))
}
