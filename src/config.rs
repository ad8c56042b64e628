//! Configuration types for squeeze-watch

use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub app: AppConfig,
    #[serde(default)]
    pub binance: BinanceConfig,
    pub strategy: StrategyConfig,
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Scheduler configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Seconds between monitoring cycles
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
}

fn default_interval_secs() -> u64 {
    60
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
        }
    }
}

/// Binance futures API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BinanceConfig {
    /// REST base URL
    #[serde(default = "default_binance_url")]
    pub base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// API key for the X-MBX-APIKEY header; the polled endpoints are public
    /// so this may stay empty
    #[serde(default)]
    pub api_key: String,
}

fn default_binance_url() -> String {
    "https://fapi.binance.com".to_string()
}
fn default_timeout_secs() -> u64 {
    10
}

impl Default for BinanceConfig {
    fn default() -> Self {
        Self {
            base_url: default_binance_url(),
            timeout_secs: default_timeout_secs(),
            api_key: String::new(),
        }
    }
}

/// Surge detection strategy configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StrategyConfig {
    /// Symbols to monitor (e.g., ["BTCUSDT", "ETHUSDT"])
    pub symbols: Vec<String>,

    /// Minimum absolute funding rate to arm the trigger (fractional, 0.001 = 0.1%)
    #[serde(default = "default_funding_rate_threshold")]
    pub funding_rate_threshold: Decimal,

    /// Minimum recent-to-baseline open interest ratio to fire
    #[serde(default = "default_oi_surge_ratio")]
    pub oi_surge_ratio: Decimal,

    /// Rolling history length per symbol (baseline window)
    #[serde(default = "default_average_window")]
    pub average_window: usize,

    /// Newest sub-window used for the surge numerator
    #[serde(default = "default_recent_window")]
    pub recent_window: usize,
}

fn default_funding_rate_threshold() -> Decimal {
    Decimal::new(1, 3) // 0.001 = 0.1%
}
fn default_oi_surge_ratio() -> Decimal {
    Decimal::new(2, 0) // 2.0x
}
fn default_average_window() -> usize {
    10
}
fn default_recent_window() -> usize {
    3
}

/// Telegram alert delivery configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TelegramConfig {
    /// Bot token; empty disables delivery
    #[serde(default)]
    pub bot_token: String,

    /// Target chat identifier
    #[serde(default)]
    pub chat_id: String,
}

impl TelegramConfig {
    /// Whether alert delivery is configured
    pub fn is_configured(&self) -> bool {
        !self.bot_token.is_empty() && !self.chat_id.is_empty()
    }
}

/// Observation capture configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Enable observation capture
    #[serde(default = "default_true")]
    pub capture_enabled: bool,

    /// Output directory for Parquet files
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// File rotation interval in seconds
    #[serde(default = "default_rotation_interval_secs")]
    pub rotation_interval_secs: u64,

    /// Buffered observations before a flush
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,

    /// Maximum seconds between flushes
    #[serde(default = "default_flush_interval_secs")]
    pub flush_interval_secs: u64,
}

fn default_true() -> bool {
    true
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("./data")
}
fn default_rotation_interval_secs() -> u64 {
    3600
}
fn default_buffer_size() -> usize {
    1000
}
fn default_flush_interval_secs() -> u64 {
    60
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            capture_enabled: true,
            output_dir: default_output_dir(),
            rotation_interval_secs: default_rotation_interval_secs(),
            buffer_size: default_buffer_size(),
            flush_interval_secs: default_flush_interval_secs(),
        }
    }
}

/// Telemetry configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    /// Prometheus exporter port
    #[serde(default = "default_metrics_port")]
    pub metrics_port: u16,

    /// Log level when RUST_LOG is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log output format
    #[serde(default)]
    pub log_format: LogFormat,
}

fn default_metrics_port() -> u16 {
    9090
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            metrics_port: default_metrics_port(),
            log_level: default_log_level(),
            log_format: LogFormat::default(),
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable format
    #[default]
    Pretty,
    /// JSON format for log aggregation
    Json,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}
