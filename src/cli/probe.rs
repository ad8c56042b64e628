//! Probe command implementation
//!
//! One-shot connectivity check: fetch every configured symbol once and print
//! the raw observation. Does not touch the engine.

use crate::config::Config;
use crate::feed::{BinanceClient, MarketDataSource};
use clap::Args;

#[derive(Args, Debug)]
pub struct ProbeArgs {
    /// Probe a single symbol instead of the configured list
    #[arg(short, long)]
    pub symbol: Option<String>,
}

impl ProbeArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let client = BinanceClient::from_config(&config.binance);

        let symbols: Vec<String> = match &self.symbol {
            Some(symbol) => vec![symbol.clone()],
            None => config.strategy.symbols.clone(),
        };

        for symbol in &symbols {
            match client.fetch_observation(symbol).await {
                Ok(observation) => {
                    println!(
                        "{}: price={} funding_rate={} open_interest={} ts={}",
                        observation.symbol,
                        observation.price,
                        observation.funding_rate,
                        observation.open_interest,
                        observation.timestamp.format("%Y-%m-%d %H:%M:%S"),
                    );
                }
                Err(e) => {
                    println!("{}: error: {}", symbol, e);
                }
            }
        }

        Ok(())
    }
}
