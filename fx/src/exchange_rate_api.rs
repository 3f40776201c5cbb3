//! Client for the exchangerate-api.com v6 HTTP API.
//!
//! Two resources are consumed:
//! - `{base}/{key}/pair/{from}/{to}` returning a single `conversion_rate`
//! - `{base}/{key}/latest/{from}` returning a `conversion_rates` table
//!
//! The API key is part of the request path, so URLs are never logged. Each
//! path part is pushed as its own escaped segment, and codes that are not
//! plain ASCII letters and digits are rejected before any request is sent.

use async_trait::async_trait;
use ratewise_common::{constants, Currency, CurrencyPair};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::error::{FxError, FxResult};
use crate::provider::RateSource;

/// Default API base URL.
pub const DEFAULT_BASE_URL: &str = "https://v6.exchangerate-api.com/v6";

const SUCCESS: &str = "success";

/// Pair-conversion response body.
#[derive(Debug, Deserialize)]
struct PairResponse {
    #[serde(default)]
    result: String,
    #[serde(rename = "error-type")]
    error_type: Option<String>,
    conversion_rate: Option<f64>,
}

/// Latest-rates response body.
#[derive(Debug, Deserialize)]
struct LatestResponse {
    #[serde(default)]
    result: String,
    #[serde(rename = "error-type")]
    error_type: Option<String>,
    #[serde(default)]
    conversion_rates: HashMap<String, f64>,
}

/// Configuration for the upstream client.
#[derive(Debug, Clone)]
pub struct ExchangeRateApiConfig {
    /// API base URL, without trailing slash.
    pub base_url: String,
    /// API key embedded in every request path.
    pub api_key: String,
    /// Per-request timeout.
    pub request_timeout: Duration,
}

impl ExchangeRateApiConfig {
    /// Create a configuration for the public endpoint.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            request_timeout: constants::request_timeout()
                .to_std()
                .unwrap_or(Duration::from_secs(10)),
        }
    }

    /// Point the client at a different base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

/// HTTP client for the rate provider.
pub struct ExchangeRateApi {
    client: Client,
    config: ExchangeRateApiConfig,
}

impl ExchangeRateApi {
    /// Create a new client.
    pub fn new(config: ExchangeRateApiConfig) -> Self {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { client, config }
    }

    /// Build the pair and latest-rates sources, in resolution order.
    pub fn into_sources(self) -> Vec<Arc<dyn RateSource>> {
        let api = Arc::new(self);
        vec![
            Arc::new(PairLookup::new(api.clone())),
            Arc::new(LatestRatesLookup::new(api)),
        ]
    }

    /// Query the pair-conversion resource.
    pub async fn pair_rate(&self, pair: &CurrencyPair) -> FxResult<f64> {
        FxError::check_pair(pair)?;
        let url = self.endpoint(
            PairLookup::NAME,
            &["pair", pair.base.code(), pair.quote.code()],
        )?;
        let body: PairResponse = self.get_json(PairLookup::NAME, url).await?;

        if body.result != SUCCESS {
            return Err(unsuccessful(PairLookup::NAME, body.result, body.error_type));
        }

        let rate = body
            .conversion_rate
            .ok_or_else(|| FxError::MissingRate(pair.clone()))?;
        FxError::check_rate(pair, rate)
    }

    /// Query the latest-rates table for `base`.
    pub async fn latest_rates(&self, base: &Currency) -> FxResult<HashMap<String, f64>> {
        if !base.is_alphanumeric() {
            return Err(FxError::InvalidCurrency(base.clone()));
        }
        let url = self.endpoint(LatestRatesLookup::NAME, &["latest", base.code()])?;
        let body: LatestResponse = self.get_json(LatestRatesLookup::NAME, url).await?;

        if body.result != SUCCESS {
            return Err(unsuccessful(
                LatestRatesLookup::NAME,
                body.result,
                body.error_type,
            ));
        }

        Ok(body.conversion_rates)
    }

    /// `{base}/{key}/{parts..}`, with the key and each part escaped.
    fn endpoint(&self, source_name: &str, parts: &[&str]) -> FxResult<Url> {
        let invalid = |message: String| FxError::InvalidUrl {
            source_name: source_name.to_string(),
            message,
        };

        let mut url = Url::parse(&self.config.base_url).map_err(|e| invalid(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| invalid("base URL cannot carry a path".to_string()))?
            .pop_if_empty()
            .push(&self.config.api_key)
            .extend(parts);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, source_name: &str, url: Url) -> FxResult<T> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FxError::Transport {
                source_name: source_name.to_string(),
                message: e.without_url().to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FxError::UnexpectedStatus {
                source_name: source_name.to_string(),
                status: status.as_u16(),
            });
        }

        response.json::<T>().await.map_err(|e| FxError::Decode {
            source_name: source_name.to_string(),
            message: e.without_url().to_string(),
        })
    }
}

fn unsuccessful(source_name: &str, result: String, error_type: Option<String>) -> FxError {
    let result = match error_type {
        Some(kind) => format!("{} ({})", result, kind),
        None => result,
    };
    FxError::Unsuccessful {
        source_name: source_name.to_string(),
        result,
    }
}

/// Primary tier: direct pair query.
pub struct PairLookup {
    api: Arc<ExchangeRateApi>,
}

impl PairLookup {
    pub const NAME: &'static str = "pair";

    pub fn new(api: Arc<ExchangeRateApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl RateSource for PairLookup {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn fetch(&self, pair: &CurrencyPair) -> FxResult<f64> {
        self.api.pair_rate(pair).await
    }
}

/// Secondary tier: full latest-rates table anchored at the base currency.
pub struct LatestRatesLookup {
    api: Arc<ExchangeRateApi>,
}

impl LatestRatesLookup {
    pub const NAME: &'static str = "latest";

    pub fn new(api: Arc<ExchangeRateApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl RateSource for LatestRatesLookup {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn fetch(&self, pair: &CurrencyPair) -> FxResult<f64> {
        let rates = self.api.latest_rates(&pair.base).await?;
        debug!(pair = %pair, table_size = rates.len(), "Got latest rates table");

        let rate = rates
            .get(pair.quote.code())
            .copied()
            .ok_or_else(|| FxError::MissingRate(pair.clone()))?;
        FxError::check_rate(pair, rate)
    }
}
