//! Dataset and boundary retrieval from local files or HTTP.

use anyhow::Context;
use log::info;
use std::time::Duration;
use wsa_sync::session::{FetchFuture, SourceFetcher};

/// True for `http://` and `https://` locations.
pub fn is_remote(location: &str) -> bool {
    let lower = location.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Reads local paths from disk and remote locations over HTTP.
#[derive(Clone)]
pub struct SourceClient {
    client: reqwest::Client,
}

impl SourceClient {
    pub fn new() -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()?;
        Ok(Self { client })
    }
}

impl SourceFetcher for SourceClient {
    fn fetch(&self, location: String) -> FetchFuture {
        let client = self.client.clone();
        Box::pin(async move {
            if !is_remote(&location) {
                return tokio::fs::read(&location)
                    .await
                    .with_context(|| format!("Failed to read {}", location));
            }
            info!("Fetching {}", location);
            let response = client.get(&location).send().await?;
            if !response.status().is_success() {
                anyhow::bail!("Bad response for {}: {}", location, response.status());
            }
            let body = response.bytes().await?;
            Ok(body.to_vec())
        })
    }
}
