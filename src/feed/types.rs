//! Market data types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single market observation for one symbol
///
/// Numeric fields are exact decimals: the engine compares them against small
/// thresholds (e.g. 0.001) that must not suffer binary-float representation
/// error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Observation {
    /// Trading symbol (e.g., "BTCUSDT")
    pub symbol: String,
    /// Exchange mark price at `timestamp`
    pub price: Decimal,
    /// Signed funding rate (fractional, 0.0005 = 0.05%)
    pub funding_rate: Decimal,
    /// Total open contracts
    pub open_interest: Decimal,
    /// Exchange timestamp of the sample
    pub timestamp: DateTime<Utc>,
}

/// Market data retrieval errors
#[derive(Debug, Error)]
pub enum FeedError {
    /// Upstream unreachable or request failed mid-flight
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    /// Upstream answered with a non-success status
    #[error("{endpoint} returned status {status}")]
    Status {
        endpoint: &'static str,
        status: reqwest::StatusCode,
    },
    /// A response field could not be decoded
    #[error("malformed {field} in response: {value:?}")]
    Decode { field: &'static str, value: String },
}
