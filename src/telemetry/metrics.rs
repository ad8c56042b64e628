//! Prometheus metrics

use std::time::Duration;

/// Latency metric types
#[derive(Debug, Clone, Copy)]
pub enum LatencyMetric {
    /// Market data fetch latency (both endpoints)
    MarketDataFetch,
    /// Alert delivery latency
    AlertDelivery,
}

/// Counter metric types
#[derive(Debug, Clone, Copy)]
pub enum CounterMetric {
    /// Observations successfully fetched and processed
    ObservationsIngested,
    /// Failed market data fetches
    FetchFailures,
    /// Squeeze alerts fired by the engine
    AlertsFired,
    /// Alert deliveries that failed
    DeliveryFailures,
}

/// Record a latency measurement
pub fn record_latency(metric: LatencyMetric, duration: Duration) {
    let metric_name = match metric {
        LatencyMetric::MarketDataFetch => "squeezewatch_market_data_fetch_latency_ms",
        LatencyMetric::AlertDelivery => "squeezewatch_alert_delivery_latency_ms",
    };

    metrics::histogram!(metric_name).record(duration.as_millis() as f64);
}

/// Increment a counter
pub fn increment(metric: CounterMetric) {
    let metric_name = match metric {
        CounterMetric::ObservationsIngested => "squeezewatch_observations_ingested_total",
        CounterMetric::FetchFailures => "squeezewatch_fetch_failures_total",
        CounterMetric::AlertsFired => "squeezewatch_alerts_fired_total",
        CounterMetric::DeliveryFailures => "squeezewatch_delivery_failures_total",
    };

    metrics::counter!(metric_name).increment(1);
}
