//! End-to-end integration tests

use rust_decimal_macros::dec;
use squeeze_watch::config::Config;
use squeeze_watch::feed::Observation;
use squeeze_watch::surge::SurgeDetector;

fn observation(symbol: &str, oi: rust_decimal::Decimal, fr: rust_decimal::Decimal) -> Observation {
    Observation {
        symbol: symbol.to_string(),
        price: dec!(10000),
        funding_rate: fr,
        open_interest: oi,
        timestamp: chrono::Utc::now(),
    }
}

#[test]
fn test_example_config_loads() {
    // The embedded fallback config must stay deserializable
    let config: Config = toml::from_str(include_str!("../config.toml.example")).unwrap();
    assert_eq!(config.strategy.symbols, vec!["BTCUSDT", "ETHUSDT"]);
    assert_eq!(config.strategy.funding_rate_threshold, dec!(0.001));
    assert_eq!(config.strategy.oi_surge_ratio, dec!(2.0));
    assert_eq!(config.app.interval_secs, 60);
}

#[test]
fn test_detector_from_config_end_to_end() {
    let toml = r#"
        [strategy]
        symbols = ["BTCUSDT"]
        funding_rate_threshold = 0.001
        oi_surge_ratio = 2.0
    "#;
    let config: Config = toml::from_str(toml).unwrap();
    let detector = SurgeDetector::from_config(&config.strategy);

    for _ in 0..7 {
        assert!(detector
            .process(&observation("BTCUSDT", dec!(1000), dec!(0.0001)))
            .is_none());
    }
    // Funding gate still closed
    assert!(detector
        .process(&observation("BTCUSDT", dec!(2500), dec!(0.0001)))
        .is_none());
    // Gate open but history short of ten samples
    assert!(detector
        .process(&observation("BTCUSDT", dec!(2600), dec!(-0.0015)))
        .is_none());
    // Full window, ratio ~1.76 below the 2.0 bar
    assert!(detector
        .process(&observation("BTCUSDT", dec!(2700), dec!(-0.0015)))
        .is_none());

    let alert = detector
        .process(&observation("BTCUSDT", dec!(15000), dec!(-0.002)))
        .expect("surge should fire");
    assert!(alert.surge_ratio > dec!(2.0));
    assert_eq!(alert.baseline_avg_oi, dec!(2880));
}
