//! Telegram alert notifier
//!
//! Delivers alerts through the Bot API `sendMessage` endpoint. An
//! unconfigured notifier (empty token or chat id) silently accepts alerts,
//! so the monitor runs without Telegram credentials.

use super::AlertSink;
use crate::surge::SqueezeAlert;
use async_trait::async_trait;
use reqwest::Client;
use rust_decimal_macros::dec;
use std::time::Duration;

/// Telegram Bot API base URL
pub const TELEGRAM_API_URL: &str = "https://api.telegram.org";

/// Configuration for the Telegram notifier
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    /// Bot token; empty disables delivery
    pub bot_token: String,
    /// Target chat identifier
    pub chat_id: String,
    /// Base URL for the Bot API
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            chat_id: String::new(),
            base_url: TELEGRAM_API_URL.to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

/// Telegram notifier over the Bot API
pub struct TelegramNotifier {
    config: TelegramConfig,
    client: Client,
}

impl TelegramNotifier {
    /// Create a notifier for a bot token and chat id
    pub fn new(bot_token: impl Into<String>, chat_id: impl Into<String>) -> Self {
        Self::with_config(TelegramConfig {
            bot_token: bot_token.into(),
            chat_id: chat_id.into(),
            ..Default::default()
        })
    }

    /// Create a notifier with custom configuration
    pub fn with_config(config: TelegramConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    /// Create a notifier from the application config
    pub fn from_config(config: &crate::config::TelegramConfig) -> Self {
        Self::new(config.bot_token.clone(), config.chat_id.clone())
    }

    /// Whether delivery is configured
    pub fn is_configured(&self) -> bool {
        !self.config.bot_token.is_empty() && !self.config.chat_id.is_empty()
    }

    /// Render an alert as a Telegram Markdown message
    fn format_alert(alert: &SqueezeAlert) -> String {
        format!(
            "🚨 *Short squeeze alert* 🚨\n\n\
             *Symbol:* {}\n\
             *Price:* {}\n\
             *Funding rate:* {}%\n\
             *OI surge:* {}x\n\
             _(recent avg OI: {}, baseline avg OI: {})_\n\
             *Time:* {}\n\n\
             ⚠️ _Mind liquidity risk and set stops_",
            alert.symbol,
            alert.price.round_dp(4).normalize(),
            (alert.funding_rate * dec!(100)).round_dp(4).normalize(),
            alert.surge_ratio.round_dp(2),
            alert.recent_avg_oi.round_dp(2).normalize(),
            alert.baseline_avg_oi.round_dp(2).normalize(),
            alert.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
        )
    }
}

#[async_trait]
impl AlertSink for TelegramNotifier {
    async fn send_alert(&self, alert: &SqueezeAlert) -> anyhow::Result<()> {
        if !self.is_configured() {
            tracing::debug!(symbol = %alert.symbol, "Telegram not configured, skipping alert");
            return Ok(());
        }

        let url = format!(
            "{}/bot{}/sendMessage",
            self.config.base_url, self.config.bot_token
        );

        let payload = serde_json::json!({
            "chat_id": self.config.chat_id,
            "text": Self::format_alert(alert),
            "parse_mode": "Markdown",
        });

        let response = self.client.post(&url).json(&payload).send().await?;

        if !response.status().is_success() {
            anyhow::bail!("telegram api error, status: {}", response.status());
        }

        Ok(())
    }
}
