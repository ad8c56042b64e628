//! Binance futures REST client
//!
//! One observation is assembled from two public endpoints: the premium index
//! (mark price + last funding rate) and the open interest snapshot.

use super::{FeedError, MarketDataSource, Observation};
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;
use std::time::Duration;

/// Binance futures REST base URL
pub const BINANCE_FUTURES_URL: &str = "https://fapi.binance.com";

/// Configuration for the Binance client
#[derive(Debug, Clone)]
pub struct BinanceConfig {
    /// Base URL for the futures REST API
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
    /// API key for the X-MBX-APIKEY header; empty for public endpoints
    pub api_key: String,
}

impl Default for BinanceConfig {
    fn default() -> Self {
        Self {
            base_url: BINANCE_FUTURES_URL.to_string(),
            timeout: Duration::from_secs(10),
            api_key: String::new(),
        }
    }
}

/// Client for the Binance futures REST API
pub struct BinanceClient {
    config: BinanceConfig,
    client: Client,
}

/// Premium index response (mark price and funding rate)
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PremiumIndexResponse {
    #[allow(dead_code)]
    symbol: String,
    mark_price: String,
    last_funding_rate: String,
    /// Server time in epoch milliseconds
    time: i64,
}

/// Open interest response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OpenInterestResponse {
    #[allow(dead_code)]
    symbol: String,
    open_interest: String,
    #[allow(dead_code)]
    time: i64,
}

impl BinanceClient {
    /// Create a new client with default configuration
    pub fn new() -> Self {
        Self::with_config(BinanceConfig::default())
    }

    /// Create a new client with custom configuration
    pub fn with_config(config: BinanceConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    /// Create a client from the application config
    pub fn from_config(config: &crate::config::BinanceConfig) -> Self {
        Self::with_config(BinanceConfig {
            base_url: config.base_url.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
            api_key: config.api_key.clone(),
        })
    }

    /// Issue a GET against an endpoint with a symbol query
    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        endpoint: &'static str,
        symbol: &str,
    ) -> Result<T, FeedError> {
        let url = format!("{}{}", self.config.base_url, endpoint);

        let mut request = self.client.get(&url).query(&[("symbol", symbol)]);
        if !self.config.api_key.is_empty() {
            request = request.header("X-MBX-APIKEY", &self.config.api_key);
        }

        let response = request.send().await?;

        if !response.status().is_success() {
            return Err(FeedError::Status {
                endpoint,
                status: response.status(),
            });
        }

        Ok(response.json::<T>().await?)
    }
}

impl Default for BinanceClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MarketDataSource for BinanceClient {
    async fn fetch_observation(&self, symbol: &str) -> Result<Observation, FeedError> {
        tracing::debug!(symbol, "Fetching premium index and open interest");

        let premium: PremiumIndexResponse = self.get("/fapi/v1/premiumIndex", symbol).await?;
        let oi: OpenInterestResponse = self.get("/fapi/v1/openInterest", symbol).await?;

        build_observation(symbol, &premium, &oi)
    }
}

/// Assemble an observation from the two raw responses
///
/// Rejects malformed numeric fields instead of defaulting them: a zeroed
/// funding rate or open interest would silently disarm the trigger.
fn build_observation(
    symbol: &str,
    premium: &PremiumIndexResponse,
    oi: &OpenInterestResponse,
) -> Result<Observation, FeedError> {
    let price = parse_decimal("markPrice", &premium.mark_price)?;
    let funding_rate = parse_decimal("lastFundingRate", &premium.last_funding_rate)?;
    let open_interest = parse_decimal("openInterest", &oi.open_interest)?;
    let timestamp = parse_timestamp_millis("time", premium.time)?;

    Ok(Observation {
        symbol: symbol.to_string(),
        price,
        funding_rate,
        open_interest,
        timestamp,
    })
}

/// Parse a decimal field delivered as a JSON string
fn parse_decimal(field: &'static str, value: &str) -> Result<Decimal, FeedError> {
    Decimal::from_str(value).map_err(|_| FeedError::Decode {
        field,
        value: value.to_string(),
    })
}

/// Parse an epoch-milliseconds timestamp field
fn parse_timestamp_millis(field: &'static str, value: i64) -> Result<DateTime<Utc>, FeedError> {
    Utc.timestamp_millis_opt(value)
        .single()
        .ok_or_else(|| FeedError::Decode {
            field,
            value: value.to_string(),
        })
}
