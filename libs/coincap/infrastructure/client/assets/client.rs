//! Assets client for CoinCap

use super::types::{AssetPage, AssetsResponse};
use crate::domain::{offset_for, Asset};
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum AssetsApiError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("API error ({status}): {body}")]
    ApiError { status: u16, body: String },

    #[error("Deserialization failed: {0}")]
    DeserializeFailed(String),
}

pub type Result<T> = std::result::Result<T, AssetsApiError>;

/// Full request URL for one page of assets
pub fn assets_url(base_url: &str, limit: usize, offset: usize) -> String {
    format!(
        "{}/v2/assets?limit={}&offset={}",
        base_url.trim_end_matches('/'),
        limit,
        offset
    )
}

/// Client for the CoinCap assets listing
pub struct AssetsClient {
    base_url: String,
    api_key: Option<String>,
    client: Client,
}

impl AssetsClient {
    /// Create a client against `base_url` (e.g. `https://api.coincap.io`)
    ///
    /// # Arguments
    /// * `api_key` - Sent as a bearer token when present
    /// * `timeout` - Whole-request timeout
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout.min(Duration::from_secs(10)))
            .pool_idle_timeout(Duration::from_secs(30))
            .pool_max_idle_per_host(2)
            .build()?;

        Ok(Self {
            base_url: base_url.into(),
            api_key,
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch `limit` assets starting at `offset`
    pub async fn fetch_assets(&self, limit: usize, offset: usize) -> Result<Vec<Asset>> {
        let url = assets_url(&self.base_url, limit, offset);
        debug!("[Assets API] GET {}", url);

        let mut request = self.client.get(&url);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();

        if status == 429 {
            warn!("[Assets API] Rate limit exceeded");
            return Err(AssetsApiError::RateLimitExceeded);
        }

        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AssetsApiError::ApiError {
                status: status.as_u16(),
                body,
            });
        }

        let body: AssetsResponse = response
            .json()
            .await
            .map_err(|e| AssetsApiError::DeserializeFailed(e.to_string()))?;

        debug!("[Assets API] Fetched {} assets at offset {}", body.data.len(), offset);
        Ok(body.data)
    }

    /// Fetch page `page` of `page_size` assets
    ///
    /// The offset sent is `page * page_size`.
    pub async fn fetch_page(&self, page_size: usize, page: usize) -> Result<AssetPage> {
        let assets = self
            .fetch_assets(page_size, offset_for(page, page_size))
            .await?;
        Ok(AssetPage { page, assets })
    }
}
