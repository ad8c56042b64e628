//! Surge detection types

use crate::feed::Observation;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A fired short-squeeze alert
///
/// Carries the triggering observation's fields plus the engine's view of the
/// open-interest surge at evaluation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SqueezeAlert {
    /// Unique alert identifier
    pub id: Uuid,
    /// Trading symbol
    pub symbol: String,
    /// Mark price of the triggering observation
    pub price: Decimal,
    /// Funding rate of the triggering observation (signed)
    pub funding_rate: Decimal,
    /// Open interest of the triggering observation
    pub current_open_interest: Decimal,
    /// Mean open interest over the newest sub-window
    pub recent_avg_oi: Decimal,
    /// Mean open interest over the full rolling window
    pub baseline_avg_oi: Decimal,
    /// `recent_avg_oi / baseline_avg_oi`; only computed for a positive baseline
    pub surge_ratio: Decimal,
    /// Time of evaluation (not the observation's own timestamp)
    pub timestamp: DateTime<Utc>,
}

impl SqueezeAlert {
    /// Create an alert from the triggering observation and the computed averages
    pub fn new(
        observation: &Observation,
        recent_avg_oi: Decimal,
        baseline_avg_oi: Decimal,
        surge_ratio: Decimal,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            symbol: observation.symbol.clone(),
            price: observation.price,
            funding_rate: observation.funding_rate,
            current_open_interest: observation.open_interest,
            recent_avg_oi,
            baseline_avg_oi,
            surge_ratio,
            timestamp: Utc::now(),
        }
    }
}
