//! Telemetry time-series alignment onto the detection timeline.

mod aligner;
mod interpolator;
mod series;

pub use aligner::{AlignedRow, AlignerConfig, Anchor, TelemetryAligner};
pub use interpolator::{AlignedValue, Interpolator, LinearInterpolator, NearestInterpolator};
pub use series::{ColumnData, TelemetrySeries};
