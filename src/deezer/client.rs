use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, info};

use super::interface::TrackSearchInterface;
use super::types::parse_response;
use crate::config::DeezerConfig;
use crate::error::{LookupFailure, Result};

pub const SEARCH_ENDPOINT: &str = "/search";

/// Client for the public Deezer search API
#[derive(Debug, Clone)]
pub struct DeezerClient {
    client: Client,
    base_url: String,
}

impl DeezerClient {
    pub fn new(config: &DeezerConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn search_url(&self) -> String {
        format!("{}{}", self.base_url, SEARCH_ENDPOINT)
    }

    /// Search for `phrase` and return the first result's identifier
    pub async fn search_track(&self, phrase: &str) -> std::result::Result<String, LookupFailure> {
        let url = self.search_url();
        info!("Calling {} for getting track id {}", url, phrase);

        let transport = |e: reqwest::Error| LookupFailure::Transport {
            url: url.clone(),
            reason: e.to_string(),
        };

        let response = self
            .client
            .get(&url)
            .query(&[("q", phrase)])
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        if status.as_u16() >= 400 {
            let body = response.text().await.unwrap_or_default();
            return Err(LookupFailure::HttpStatus {
                url: url.clone(),
                status: status.as_u16(),
                body,
            });
        }

        let body = response.bytes().await.map_err(transport)?;
        debug!("Parsing response ({} bytes)", body.len());
        let json: Value = serde_json::from_slice(&body)
            .map_err(|e| LookupFailure::InvalidBody(e.to_string()))?;

        parse_response(&json)
    }
}

#[async_trait]
impl TrackSearchInterface for DeezerClient {
    async fn find_track(&self, phrase: &str) -> std::result::Result<String, LookupFailure> {
        self.search_track(phrase).await
    }
}
