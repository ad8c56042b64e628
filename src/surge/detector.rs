//! Sliding-window surge detection engine
//!
//! Two-stage trigger, evaluated on every new observation: the funding-rate
//! magnitude gate first (cheap, rules out the common case), then the
//! open-interest acceleration gate over the rolling window.

use rust_decimal::Decimal;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use super::types::SqueezeAlert;
use crate::feed::Observation;

/// Configuration for surge detection
#[derive(Debug, Clone)]
pub struct SurgeConfig {
    /// Minimum absolute funding rate to arm the trigger
    pub funding_rate_threshold: Decimal,

    /// Minimum recent-to-baseline open interest ratio to fire (strict)
    pub oi_surge_ratio: Decimal,

    /// Rolling history length per symbol (baseline window, default 10)
    pub average_window: usize,

    /// Newest sub-window used for the surge numerator (default 3)
    pub recent_window: usize,
}

impl Default for SurgeConfig {
    fn default() -> Self {
        Self {
            funding_rate_threshold: Decimal::new(1, 3), // 0.001 = 0.1%
            oi_surge_ratio: Decimal::new(2, 0),         // 2.0x
            average_window: 10,
            recent_window: 3,
        }
    }
}

/// Surge detector over per-symbol rolling observation windows
///
/// Owns all per-symbol history exclusively; one lock guards the whole map
/// for the duration of a `process` call, which serializes evaluations
/// system-wide. Per-call cost is bounded arithmetic over at most
/// `average_window` entries.
pub struct SurgeDetector {
    config: SurgeConfig,

    /// symbol -> rolling window of recent observations, oldest first
    history: Mutex<HashMap<String, VecDeque<Observation>>>,
}

impl SurgeDetector {
    /// Create a new detector with the given configuration
    ///
    /// The funding-rate threshold is normalized to its absolute value, and
    /// the recent window is clamped into `1..=average_window`.
    pub fn new(mut config: SurgeConfig) -> Self {
        config.funding_rate_threshold = config.funding_rate_threshold.abs();
        config.average_window = config.average_window.max(1);
        config.recent_window = config.recent_window.clamp(1, config.average_window);

        Self {
            config,
            history: Mutex::new(HashMap::new()),
        }
    }

    /// Create a detector with default configuration
    pub fn with_defaults() -> Self {
        Self::new(SurgeConfig::default())
    }

    /// Create a detector from the application config
    pub fn from_config(config: &crate::config::StrategyConfig) -> Self {
        Self::new(SurgeConfig {
            funding_rate_threshold: config.funding_rate_threshold,
            oi_surge_ratio: config.oi_surge_ratio,
            average_window: config.average_window,
            recent_window: config.recent_window,
        })
    }

    /// Evaluate one observation, returning an alert if the squeeze condition
    /// has just become true
    ///
    /// Returns `None` during warm-up (fewer than `average_window` samples for
    /// the symbol), when either gate fails, or when the baseline average is
    /// zero. The same condition recurring on consecutive calls re-fires every
    /// time it holds. Same-symbol observations are expected in arrival order;
    /// the history is never re-sorted.
    pub fn process(&self, observation: &Observation) -> Option<SqueezeAlert> {
        let mut history = self.history.lock().expect("history lock poisoned");

        let records = history.entry(observation.symbol.clone()).or_default();
        records.push_back(observation.clone());
        while records.len() > self.config.average_window {
            records.pop_front();
        }

        // Warm-up: not enough samples to form a baseline yet
        if records.len() < self.config.average_window {
            return None;
        }

        // Gate A: funding-rate magnitude
        if observation.funding_rate.abs() < self.config.funding_rate_threshold {
            return None;
        }

        // Gate B: open-interest acceleration. The recent tail also weights
        // the baseline divisor (overlapping windows, intentional).
        let tail_start = records.len() - self.config.recent_window;
        let recent_avg_oi = mean_open_interest(records.iter().skip(tail_start));
        let baseline_avg_oi = mean_open_interest(records.iter());

        if baseline_avg_oi.is_zero() {
            return None;
        }

        let surge_ratio = recent_avg_oi / baseline_avg_oi;
        if surge_ratio > self.config.oi_surge_ratio {
            tracing::info!(
                symbol = %observation.symbol,
                funding_rate = %observation.funding_rate,
                surge_ratio = %surge_ratio.round_dp(2),
                "Short squeeze alert triggered"
            );
            return Some(SqueezeAlert::new(
                observation,
                recent_avg_oi,
                baseline_avg_oi,
                surge_ratio,
            ));
        }

        None
    }

    /// Number of observations currently held for a symbol
    pub fn history_len(&self, symbol: &str) -> usize {
        self.history
            .lock()
            .expect("history lock poisoned")
            .get(symbol)
            .map_or(0, VecDeque::len)
    }

    /// Number of symbols with any history
    pub fn tracked_symbols(&self) -> usize {
        self.history.lock().expect("history lock poisoned").len()
    }
}

/// Arithmetic mean of open interest over an iterator of observations
///
/// Caller guarantees a non-empty iterator.
fn mean_open_interest<'a>(records: impl ExactSizeIterator<Item = &'a Observation>) -> Decimal {
    let count = Decimal::from(records.len());
    let sum: Decimal = records.map(|r| r.open_interest).sum();
    sum / count
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    fn observation(symbol: &str, open_interest: Decimal, funding_rate: Decimal) -> Observation {
        Observation {
            symbol: symbol.to_string(),
            price: dec!(10000),
            funding_rate,
            open_interest,
            timestamp: Utc::now(),
        }
    }

    fn create_detector() -> SurgeDetector {
        SurgeDetector::new(SurgeConfig {
            funding_rate_threshold: dec!(0.001),
            oi_surge_ratio: dec!(2.0),
            ..Default::default()
        })
    }

    #[test]
    fn test_warm_up_returns_no_alert() {
        let detector = create_detector();

        // Extreme values everywhere - still no alert before 10 samples
        for i in 0..9 {
            let oi = dec!(1000) * Decimal::from(i + 1);
            let result = detector.process(&observation("BTCUSDT", oi, dec!(-0.05)));
            assert!(result.is_none(), "no alert expected during warm-up");
        }
    }

    #[test]
    fn test_capacity_invariant() {
        let detector = create_detector();

        for i in 0..25 {
            detector.process(&observation("BTCUSDT", Decimal::from(i), dec!(0.0001)));
            assert!(detector.history_len("BTCUSDT") <= 10);
        }
        assert_eq!(detector.history_len("BTCUSDT"), 10);
    }

    #[test]
    fn test_funding_gate_blocks_regardless_of_oi() {
        let detector = create_detector();

        for _ in 0..9 {
            detector.process(&observation("BTCUSDT", dec!(1000), dec!(0.0001)));
        }
        // Massive OI spike but funding rate below threshold
        let result = detector.process(&observation("BTCUSDT", dec!(500000), dec!(0.0009)));
        assert!(result.is_none());
    }

    #[test]
    fn test_funding_gate_boundary_passes() {
        // |funding| exactly at the threshold arms the trigger (strict < gate)
        let detector = create_detector();

        for _ in 0..9 {
            detector.process(&observation("BTCUSDT", dec!(100), dec!(0.0001)));
        }
        let alert = detector
            .process(&observation("BTCUSDT", dec!(100000), dec!(0.001)))
            .expect("boundary funding rate should pass the gate");
        assert!(alert.surge_ratio > dec!(2));
    }

    #[test]
    fn test_negative_funding_rate_passes_gate() {
        let detector = create_detector();

        for _ in 0..9 {
            detector.process(&observation("BTCUSDT", dec!(100), dec!(0.0001)));
        }
        let result = detector.process(&observation("BTCUSDT", dec!(100000), dec!(-0.0015)));
        assert!(result.is_some());
    }

    #[test]
    fn test_threshold_normalized_to_absolute() {
        let detector = SurgeDetector::new(SurgeConfig {
            funding_rate_threshold: dec!(-0.001),
            ..Default::default()
        });

        for _ in 0..9 {
            detector.process(&observation("BTCUSDT", dec!(100), dec!(0.0001)));
        }
        let result = detector.process(&observation("BTCUSDT", dec!(100000), dec!(0.0015)));
        assert!(result.is_some());
    }

    #[test]
    fn test_zero_baseline_no_alert() {
        let detector = create_detector();

        for _ in 0..10 {
            let result = detector.process(&observation("BTCUSDT", dec!(0), dec!(-0.05)));
            assert!(result.is_none(), "zero baseline must never fire or panic");
        }
    }

    #[test]
    fn test_ratio_at_threshold_does_not_fire() {
        // Constant OI gives a surge ratio of exactly 1.0
        let detector = SurgeDetector::new(SurgeConfig {
            oi_surge_ratio: dec!(1.0),
            ..Default::default()
        });

        for _ in 0..10 {
            let result = detector.process(&observation("BTCUSDT", dec!(1000), dec!(-0.05)));
            assert!(result.is_none(), "ratio equal to threshold must not fire");
        }
    }

    #[test]
    fn test_fires_after_oi_buildup_with_extreme_funding() {
        let detector = create_detector();
        let symbol = "BTCUSDT";

        // 7 quiet samples to accumulate history
        for _ in 0..7 {
            let result = detector.process(&observation(symbol, dec!(1000), dec!(0.0001)));
            assert!(result.is_none());
        }

        // 8th: OI jumps but funding rate is still below the threshold
        let result = detector.process(&observation(symbol, dec!(2500), dec!(0.0001)));
        assert!(result.is_none());

        // 9th: funding rate now extreme, but only 9 samples so far
        let result = detector.process(&observation(symbol, dec!(2600), dec!(-0.0015)));
        assert!(result.is_none());

        // 10th: window full; recent avg = (2500+2600+2700)/3 = 2600,
        // baseline avg = (7*1000 + 2500+2600+2700)/10 = 1480,
        // ratio = 1.7567... < 2.0 -> no alert
        let result = detector.process(&observation(symbol, dec!(2700), dec!(-0.0015)));
        assert!(result.is_none());

        // 11th: a huge sample evicts the oldest 1000.
        // recent avg = (2600+2700+15000)/3, baseline avg = 28800/10 = 2880.
        let alert = detector
            .process(&observation(symbol, dec!(15000), dec!(-0.002)))
            .expect("expected alert for huge surge");

        assert_eq!(alert.symbol, symbol);
        assert_eq!(alert.current_open_interest, dec!(15000));
        assert_eq!(alert.funding_rate, dec!(-0.002));
        assert_eq!(alert.recent_avg_oi, dec!(20300) / dec!(3));
        assert_eq!(alert.baseline_avg_oi, dec!(2880));
        assert_eq!(alert.surge_ratio, dec!(20300) / dec!(3) / dec!(2880));
        assert!(alert.surge_ratio > dec!(2.0));
    }

    #[test]
    fn test_refires_while_condition_holds() {
        // No debouncing: the same condition on consecutive calls fires again
        let detector = create_detector();

        for _ in 0..9 {
            detector.process(&observation("BTCUSDT", dec!(100), dec!(0.0001)));
        }
        assert!(detector
            .process(&observation("BTCUSDT", dec!(100000), dec!(-0.002)))
            .is_some());
        assert!(detector
            .process(&observation("BTCUSDT", dec!(100000), dec!(-0.002)))
            .is_some());
    }

    #[test]
    fn test_per_symbol_independence() {
        let interleaved = create_detector();
        let isolated = create_detector();

        let btc: Vec<Decimal> = (0..12)
            .map(|i| if i < 9 { dec!(1000) } else { dec!(50000) })
            .collect();
        let eth: Vec<Decimal> = (0..12).map(|_| dec!(2000)).collect();

        let mut interleaved_results = Vec::new();
        for i in 0..12 {
            interleaved_results.push(
                interleaved
                    .process(&observation("BTCUSDT", btc[i], dec!(-0.002)))
                    .is_some(),
            );
            interleaved_results.push(
                interleaved
                    .process(&observation("ETHUSDT", eth[i], dec!(-0.002)))
                    .is_some(),
            );
        }

        let mut isolated_results = Vec::new();
        for i in 0..12 {
            isolated_results.push(
                isolated
                    .process(&observation("BTCUSDT", btc[i], dec!(-0.002)))
                    .is_some(),
            );
        }
        for i in 0..12 {
            isolated_results.push(
                isolated
                    .process(&observation("ETHUSDT", eth[i], dec!(-0.002)))
                    .is_some(),
            );
        }

        // Same per-symbol outcomes regardless of interleaving
        let interleaved_btc: Vec<bool> = interleaved_results.iter().step_by(2).copied().collect();
        let interleaved_eth: Vec<bool> = interleaved_results
            .iter()
            .skip(1)
            .step_by(2)
            .copied()
            .collect();
        assert_eq!(interleaved_btc, &isolated_results[..12]);
        assert_eq!(interleaved_eth, &isolated_results[12..]);
        assert_eq!(interleaved.tracked_symbols(), 2);
    }

    #[test]
    fn test_recent_window_clamped() {
        // A recent window larger than the full history degrades to ratio 1.0
        let detector = SurgeDetector::new(SurgeConfig {
            average_window: 5,
            recent_window: 50,
            ..Default::default()
        });

        for _ in 0..5 {
            let result = detector.process(&observation("BTCUSDT", dec!(1000), dec!(-0.05)));
            assert!(result.is_none());
        }
    }

    #[test]
    fn test_concurrent_process() {
        let detector = Arc::new(create_detector());

        let handles: Vec<_> = (0..4)
            .map(|worker| {
                let detector = Arc::clone(&detector);
                std::thread::spawn(move || {
                    let symbol = if worker % 2 == 0 { "BTCUSDT" } else { "ETHUSDT" };
                    for i in 0..100 {
                        detector.process(&observation(symbol, Decimal::from(i), dec!(0.0001)));
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(detector.history_len("BTCUSDT"), 10);
        assert_eq!(detector.history_len("ETHUSDT"), 10);
    }

    #[test]
    fn test_mean_open_interest_exact() {
        let records: Vec<Observation> = [dec!(0.1), dec!(0.2), dec!(0.3)]
            .iter()
            .map(|oi| observation("BTCUSDT", *oi, dec!(0)))
            .collect();

        // Exact decimal mean, no binary-float drift
        assert_eq!(mean_open_interest(records.iter()), dec!(0.2));
    }
}
