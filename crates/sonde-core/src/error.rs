//! Error types shared across the core crate.

use thiserror::Error;

/// Fatal run configuration problems. Reported before any filtering happens.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("observer latitude {0} is outside [-90, 90]")]
    LatitudeOutOfRange(f64),
    #[error("observer longitude {0} is outside [-180, 180]")]
    LongitudeOutOfRange(f64),
    #[error("observer {field} must be a finite number")]
    NonFinite { field: &'static str },
    #[error("unparsable time bound '{0}'")]
    InvalidTime(String),
    #[error("time window start {start} is after end {end}")]
    InvertedWindow { start: String, end: String },
    #[error("time window half-width must be non-negative, got {0} s")]
    NegativeWindow(f64),
    #[error("time window half-width {0} s reaches past the representable date range")]
    WindowOutOfRange(f64),
    #[error("minimum elevation {0} is outside [-90, 90]")]
    InvalidThreshold(f64),
}

/// Data-quality problems with a single summary file. The record is skipped.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("failed to read summary file: {0}")]
    Io(#[from] std::io::Error),
    #[error("corrupt summary JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("slot '{slot}' is missing field '{field}'")]
    MissingField { slot: String, field: &'static str },
    #[error("slot '{slot}' has non-finite {field}")]
    NonFinite { slot: String, field: &'static str },
    #[error("slot '{slot}' has unparsable timestamp '{value}'")]
    BadTimestamp { slot: String, value: String },
    #[error("summary array has {0} entries, expected 3")]
    BadSlotCount(usize),
    #[error("slot '{slot}' is given more than once (again as '{key}')")]
    DuplicateSlot { slot: String, key: String },
    #[error("summary document must be an object or an array")]
    BadLayout,
    #[error("record has no usable snapshots")]
    Empty,
}

/// Problems converting a telemetry export into a flight track.
#[derive(Debug, Error)]
pub enum TrackError {
    #[error("failed to read telemetry file: {0}")]
    Io(#[from] std::io::Error),
    #[error("corrupt telemetry JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("telemetry entry at {0} has unparsable timestamp")]
    BadTimestamp(String),
    #[error("telemetry contains no entries")]
    Empty,
}
