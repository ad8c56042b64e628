//! Surge detection module
//!
//! Maintains a bounded rolling history of observations per symbol and fires
//! a short-squeeze alert when an extreme funding rate coincides with a sharp
//! open-interest surge over the recent baseline.

mod detector;
mod types;

pub use detector::{SurgeConfig, SurgeDetector};
pub use types::SqueezeAlert;
