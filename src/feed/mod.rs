//! Market data module
//!
//! Polls mark price, funding rate, and open interest from Binance futures

mod binance;
mod types;

pub use binance::{BinanceClient, BinanceConfig};
pub use types::{FeedError, Observation};

use async_trait::async_trait;

/// Trait for market data source implementations
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Fetch the current observation for a symbol
    async fn fetch_observation(&self, symbol: &str) -> Result<Observation, FeedError>;
}
