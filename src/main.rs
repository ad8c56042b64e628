use clap::Parser;
use squeeze_watch::cli::{Cli, Commands};
use squeeze_watch::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(&cli.config).unwrap_or_else(|e| {
        eprintln!("Warning: Could not load config from {}: {}", cli.config, e);
        eprintln!("Using default configuration");
        toml::from_str(include_str!("../config.toml.example")).expect("Invalid default config")
    });

    // Initialize telemetry
    let _guard = squeeze_watch::telemetry::init_telemetry(&config.telemetry)?;

    match cli.command {
        Commands::Run(args) => {
            tracing::info!(
                symbols = config.strategy.symbols.len(),
                interval_secs = config.app.interval_secs,
                "Starting short-squeeze monitor"
            );
            args.execute(&config).await?;
        }
        Commands::Probe(args) => {
            tracing::info!("Probing market data endpoints");
            args.execute(&config).await?;
        }
        Commands::Status => {
            println!("squeeze-watch status");
            println!("  Symbols: {}", config.strategy.symbols.join(", "));
            println!("  Status: Not running");
        }
        Commands::Config => {
            println!("Current configuration:");
            println!("  Interval: {}s", config.app.interval_secs);
            println!("  Symbols: {}", config.strategy.symbols.join(", "));
            println!(
                "  Strategy: |funding| >= {}, OI surge > {}x ({}-sample window, {}-sample tail)",
                config.strategy.funding_rate_threshold,
                config.strategy.oi_surge_ratio,
                config.strategy.average_window,
                config.strategy.recent_window
            );
            println!(
                "  Telegram: {}",
                if config.telegram.is_configured() {
                    "configured"
                } else {
                    "disabled"
                }
            );
        }
    }

    Ok(())
}
