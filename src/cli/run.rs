//! Run command implementation
//!
//! The polling driver: once per tick, fetch an observation per symbol,
//! append it to the capture log, hand it to the engine, and deliver any
//! resulting alert. One symbol failing never aborts the rest of the cycle.

use crate::config::Config;
use crate::feed::{BinanceClient, MarketDataSource};
use crate::notify::{AlertSink, TelegramNotifier};
use crate::storage::ObservationRecorder;
use crate::surge::SurgeDetector;
use crate::telemetry::{self, CounterMetric, LatencyMetric};
use clap::Args;
use std::time::{Duration, Instant};

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl RunArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let source = BinanceClient::from_config(&config.binance);
        let detector = SurgeDetector::from_config(&config.strategy);
        let notifier = TelegramNotifier::from_config(&config.telegram);
        let recorder = config
            .storage
            .capture_enabled
            .then(|| ObservationRecorder::from_config(&config.storage));

        if !notifier.is_configured() {
            tracing::warn!("Telegram is not configured; alerts will only be logged");
        }

        // First tick fires immediately, so one cycle runs at startup
        let mut ticker = tokio::time::interval(Duration::from_secs(config.app.interval_secs));

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    run_cycle(
                        &config.strategy.symbols,
                        &source,
                        recorder.as_ref(),
                        &detector,
                        &notifier,
                    )
                    .await;
                }
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Received interrupt signal, shutting down");
                    break;
                }
            }
        }

        Ok(())
    }
}

/// Run one monitoring cycle over all symbols
async fn run_cycle(
    symbols: &[String],
    source: &dyn MarketDataSource,
    recorder: Option<&ObservationRecorder>,
    detector: &SurgeDetector,
    sink: &dyn AlertSink,
) {
    tracing::debug!(symbols = symbols.len(), "Running monitoring cycle");

    for symbol in symbols {
        let started = Instant::now();
        let observation = match source.fetch_observation(symbol).await {
            Ok(observation) => observation,
            Err(e) => {
                telemetry::increment(CounterMetric::FetchFailures);
                tracing::warn!(symbol = %symbol, error = %e, "Failed to fetch market data");
                continue;
            }
        };
        telemetry::record_latency(LatencyMetric::MarketDataFetch, started.elapsed());
        telemetry::increment(CounterMetric::ObservationsIngested);

        // Capture is best-effort and never blocks alerting
        if let Some(recorder) = recorder {
            if let Err(e) = recorder.record(observation.clone()).await {
                tracing::warn!(symbol = %symbol, error = %e, "Failed to record observation");
            }
        }

        if let Some(alert) = detector.process(&observation) {
            telemetry::increment(CounterMetric::AlertsFired);

            let delivery_started = Instant::now();
            match sink.send_alert(&alert).await {
                Ok(()) => {
                    telemetry::record_latency(
                        LatencyMetric::AlertDelivery,
                        delivery_started.elapsed(),
                    );
                    tracing::info!(symbol = %symbol, alert_id = %alert.id, "Alert delivered");
                }
                Err(e) => {
                    telemetry::increment(CounterMetric::DeliveryFailures);
                    tracing::warn!(symbol = %symbol, error = %e, "Failed to deliver alert");
                }
            }
        }
    }
}
