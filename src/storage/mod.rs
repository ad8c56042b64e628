//! Observation capture module
//!
//! Best-effort append-only log of fetched observations to Parquet files.
//! Capture failures never block alerting.

mod parquet;
mod recorder;

pub use parquet::{observation_schema, ParquetReader, ParquetWriter};
pub use recorder::{ObservationRecorder, RecorderConfig, RecorderStats};
