//! Resampling of a telemetry log onto the detection timeline.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result, TelemetryError};
use crate::telemetry::interpolator::{AlignedValue, Interpolator};
use crate::telemetry::series::TelemetrySeries;

/// Offset relating the telemetry clock to the media clock.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Anchor {
    /// Telemetry time that corresponds to media time 0
    Explicit(f64),
    /// Assume the log and the media start together
    #[default]
    MinTelemetryTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignerConfig {
    pub anchor: Anchor,
    /// Prepended to every output column name
    pub column_prefix: String,
}

impl Default for AlignerConfig {
    fn default() -> Self {
        Self {
            anchor: Anchor::MinTelemetryTime,
            column_prefix: "uav_".to_string(),
        }
    }
}

/// Telemetry values for one query timestamp, in column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignedRow {
    pub timestamp: f64,
    pub values: Vec<(String, AlignedValue)>,
}

impl AlignedRow {
    pub fn get(&self, column: &str) -> Option<&AlignedValue> {
        self.values.iter().find(|(n, _)| n == column).map(|(_, v)| v)
    }
}

/// Maps an independent telemetry stream onto arbitrary media timestamps.
///
/// Each column is interpolated on its own: numeric columns linearly (strictly within
/// the observed range), categorical columns by nearest sample.
#[derive(Debug, Clone)]
pub struct TelemetryAligner {
    anchor: f64,
    range: (f64, f64),
    columns: Vec<(String, Interpolator)>,
}

impl TelemetryAligner {
    pub fn new(series: &TelemetrySeries, config: &AlignerConfig) -> Result<Self> {
        let anchor = match config.anchor {
            Anchor::Explicit(t) if !t.is_finite() => {
                return Err(TelemetryError::InvalidAnchor(t).into());
            }
            Anchor::Explicit(t) => t,
            Anchor::MinTelemetryTime => series.min_time(),
        };

        let rebased: Vec<f64> = series.time().iter().map(|t| t - anchor).collect();
        let range = (rebased[0], rebased[rebased.len() - 1]);
        let columns = series
            .columns()
            .iter()
            .map(|(name, data)| {
                let name = format!("{}{}", config.column_prefix, name);
                (name, Interpolator::from_column(rebased.clone(), data))
            })
            .collect::<Vec<_>>();

        debug!(
            "telemetry aligner: {} columns, anchor {anchor}, rebased range [{}, {}]",
            columns.len(),
            range.0,
            range.1
        );

        Ok(Self {
            anchor,
            range,
            columns,
        })
    }

    pub fn anchor(&self) -> f64 {
        self.anchor
    }

    /// Rebased time range covered by the log.
    pub fn time_range(&self) -> (f64, f64) {
        self.range
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(n, _)| n.as_str())
    }

    /// Align every column at one media timestamp.
    pub fn align_at(&self, timestamp: f64) -> Result<AlignedRow> {
        let values = self
            .columns
            .iter()
            .map(|(name, interp)| Ok((name.clone(), interp.interpolate(name, timestamp)?)))
            .collect::<Result<Vec<_>>>()?;
        Ok(AlignedRow { timestamp, values })
    }

    /// Align at every query; the first out-of-range numeric query fails the batch.
    pub fn align(&self, timestamps: &[f64]) -> Result<Vec<AlignedRow>> {
        timestamps.iter().map(|&t| self.align_at(t)).collect()
    }

    /// Align at every query, skipping queries outside the numeric range.
    pub fn align_lenient(&self, timestamps: &[f64]) -> Vec<AlignedRow> {
        timestamps
            .iter()
            .filter_map(|&t| match self.align_at(t) {
                Ok(row) => Some(row),
                Err(Error::OutOfRange { column, .. }) => {
                    warn!("skipping telemetry alignment at {t}: outside range of `{column}`");
                    None
                }
                Err(e) => {
                    warn!("skipping telemetry alignment at {t}: {e}");
                    None
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(anchor: Anchor) -> AlignerConfig {
        AlignerConfig {
            anchor,
            column_prefix: String::new(),
        }
    }

    fn series() -> TelemetrySeries {
        TelemetrySeries::new(vec![1000.0, 1010.0, 1020.0])
            .unwrap()
            .with_numeric("alt", vec![0.0, 100.0, 200.0])
            .unwrap()
            .with_categorical("mode", vec!["a", "a", "b"])
            .unwrap()
    }

    #[test]
    fn test_default_anchor_is_min_time() {
        let aligner = TelemetryAligner::new(&series(), &config(Anchor::MinTelemetryTime)).unwrap();
        assert_eq!(aligner.anchor(), 1000.0);
        assert_eq!(aligner.time_range(), (0.0, 20.0));

        let row = aligner.align_at(5.0).unwrap();
        assert_eq!(row.get("alt"), Some(&AlignedValue::Numeric(50.0)));
        assert_eq!(row.get("mode").and_then(AlignedValue::as_str), Some("a"));

        let row = aligner.align_at(14.0).unwrap();
        assert_eq!(row.get("mode").and_then(AlignedValue::as_str), Some("a"));
    }

    #[test]
    fn test_explicit_anchor() {
        let aligner = TelemetryAligner::new(&series(), &config(Anchor::Explicit(995.0))).unwrap();
        assert_eq!(aligner.time_range(), (5.0, 25.0));
        assert_eq!(aligner.align_at(10.0).unwrap().get("alt"), Some(&AlignedValue::Numeric(50.0)));
        assert!(aligner.align_at(0.0).is_err());

        let err = TelemetryAligner::new(&series(), &config(Anchor::Explicit(f64::NAN))).unwrap_err();
        assert!(matches!(err, Error::Telemetry(TelemetryError::InvalidAnchor(_))));
    }

    #[test]
    fn test_strict_and_lenient_batches() {
        let aligner = TelemetryAligner::new(&series(), &config(Anchor::MinTelemetryTime)).unwrap();
        let queries = [0.0, 30.0, 20.0];

        assert!(matches!(
            aligner.align(&queries),
            Err(Error::OutOfRange { query, .. }) if query == 30.0
        ));

        let rows = aligner.align_lenient(&queries);
        assert_eq!(rows.iter().map(|r| r.timestamp).collect::<Vec<_>>(), vec![0.0, 20.0]);
    }

    #[test]
    fn test_categorical_only_never_fails() {
        let series = TelemetrySeries::new(vec![0.0, 1.0])
            .unwrap()
            .with_categorical("mode", vec!["up", "down"])
            .unwrap();
        let aligner = TelemetryAligner::new(&series, &config(Anchor::MinTelemetryTime)).unwrap();
        let rows = aligner.align(&[-5.0, 50.0]).unwrap();
        assert_eq!(rows[0].get("mode").and_then(AlignedValue::as_str), Some("up"));
        assert_eq!(rows[1].get("mode").and_then(AlignedValue::as_str), Some("down"));
    }

    #[test]
    fn test_column_prefix() {
        let aligner = TelemetryAligner::new(&series(), &AlignerConfig::default()).unwrap();
        let names: Vec<&str> = aligner.column_names().collect();
        assert_eq!(names, vec!["uav_alt", "uav_mode"]);
    }
}
