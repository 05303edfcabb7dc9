// HTTP adapter over reqwest
use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use super::Fetcher;
use crate::config::LoaderSettings;
use crate::error::{LoaderError, Result};

#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(settings: &LoaderSettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(settings.request_timeout())
            .user_agent(settings.user_agent.clone())
            .build()
            .map_err(|e| LoaderError::Config(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self::with_client(client))
    }

    pub fn with_client(client: Client) -> Self {
        HttpFetcher { client }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| LoaderError::Network {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        debug!(url = %url, status = status.as_u16(), "GET");
        if !status.is_success() {
            return Err(LoaderError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|source| LoaderError::Network {
            url: url.to_string(),
            source,
        })
    }
}
