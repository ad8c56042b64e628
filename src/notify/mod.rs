//! Alert delivery module
//!
//! Sends fired squeeze alerts to the operator via Telegram

mod telegram;

pub use telegram::{TelegramConfig, TelegramNotifier};

use crate::surge::SqueezeAlert;
use async_trait::async_trait;

/// Trait for alert sink implementations
#[async_trait]
pub trait AlertSink: Send + Sync {
    /// Deliver an alert; failure is logged by the driver and never affects
    /// engine state
    async fn send_alert(&self, alert: &SqueezeAlert) -> anyhow::Result<()>;
}
