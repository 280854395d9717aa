//! Market data over plain HTTP/JSON

use crate::error::UpstreamError;
use crate::models::observation::Observation;
use crate::services::market_data::MarketDataProvider;
use async_trait::async_trait;
use reqwest::Url;
use std::time::Duration;
use tracing::debug;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Fetches `GET {base_url}/observations/{ticker}`, expecting an
/// [`Observation`] JSON body.
///
/// Whatever sits behind the URL (a cache, a proxy in front of a vendor API)
/// is responsible for producing that shape; credentials stay on that side.
pub struct HttpMarketDataProvider {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpMarketDataProvider {
    pub fn new(base_url: &str) -> Result<Self, UpstreamError> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Self::with_client(base_url, client)
    }

    pub fn with_client(base_url: &str, client: reqwest::Client) -> Result<Self, UpstreamError> {
        let invalid = |reason: &str| UpstreamError::InvalidUrl {
            url: base_url.to_string(),
            reason: reason.to_string(),
        };
        let base_url = Url::parse(base_url.trim()).map_err(|e| invalid(&e.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(invalid("not a base URL"));
        }
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `{base_url}/observations/{ticker}`, with `ticker` escaped as a single
    /// path segment.
    pub fn observation_url(&self, ticker: &str) -> Result<Url, UpstreamError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| UpstreamError::InvalidUrl {
                url: self.base_url.to_string(),
                reason: "not a base URL".to_string(),
            })?
            .pop_if_empty()
            .extend(["observations", ticker]);
        Ok(url)
    }
}

#[async_trait]
impl MarketDataProvider for HttpMarketDataProvider {
    async fn latest_observation(&self, ticker: &str) -> Result<Observation, UpstreamError> {
        let url = self.observation_url(ticker)?;
        debug!(ticker = %ticker, url = %url, "Fetching observation");

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(UpstreamError::NoData(ticker.to_string()));
        }
        if !status.is_success() {
            return Err(UpstreamError::Status {
                ticker: ticker.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        let observation: Observation =
            serde_json::from_slice(&body).map_err(|e| UpstreamError::Decode {
                ticker: ticker.to_string(),
                reason: e.to_string(),
            })?;

        if observation.ticker != ticker {
            return Err(UpstreamError::Decode {
                ticker: ticker.to_string(),
                reason: format!("response is for '{}'", observation.ticker),
            });
        }
        Ok(observation)
    }
}
