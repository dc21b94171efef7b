//! Error types shared by every component.

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid parameter combination, caught at construction.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// A numeric telemetry query fell outside the observed time range.
    #[error("query time {query} for column `{column}` is outside the telemetry range [{min}, {max}]")]
    OutOfRange {
        column: String,
        query: f64,
        min: f64,
        max: f64,
    },

    /// The telemetry table could not be used to build interpolants.
    #[error("invalid telemetry: {0}")]
    Telemetry(#[from] TelemetryError),

    /// Frames reached the sequential tracker out of timestamp order.
    #[error("frame timestamp {current} is earlier than the previous frame at {previous}")]
    FrameOrder { previous: f64, current: f64 },

    /// A frame timestamp was NaN or infinite.
    #[error("frame timestamp {0} is not finite")]
    NonFiniteTimestamp(f64),

    /// The external proposal source failed.
    #[error("detector failed: {0}")]
    Detector(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Configuration file could not be read.
    #[error("failed to read configuration file {path}: {source}")]
    ConfigIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Configuration file is not valid TOML for the expected schema.
    #[error("failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Output could not be rendered or written as JSON.
    #[error("failed to write JSON output: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("`{name}` must lie strictly between 0 and 1, got {value}")]
    ThresholdOutOfBounds { name: &'static str, value: f32 },

    #[error("`{name}` must be finite and non-negative, got {value}")]
    NegativeDuration { name: &'static str, value: f64 },

    #[error("padding {padding} is too large for clip length {clip_length} (need clip_length > 2 * padding)")]
    ClipLengthTooShort { clip_length: f64, padding: f64 },

    #[error("frame size {width}x{height} must be non-zero")]
    EmptyFrame { width: u32, height: u32 },

    #[error("`max_distance` must be finite and positive, got {0}")]
    InvalidDistanceGate(f32),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TelemetryError {
    #[error("telemetry series has no samples")]
    Empty,

    #[error("time column contains a non-finite value at row {row}")]
    NonFiniteTime { row: usize },

    #[error("time column decreases at row {row} ({previous} -> {current})")]
    NonMonotonicTime {
        row: usize,
        previous: f64,
        current: f64,
    },

    #[error("column `{column}` has {got} values, expected {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        got: usize,
    },

    #[error("column `{0}` is defined twice")]
    DuplicateColumn(String),

    #[error("anchor time must be finite, got {0}")]
    InvalidAnchor(f64),
}
