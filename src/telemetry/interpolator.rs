//! Per-column interpolants over a rebased telemetry time axis.

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::telemetry::series::ColumnData;

/// A telemetry value resampled onto a query timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AlignedValue {
    Numeric(f64),
    Categorical(String),
}

impl AlignedValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AlignedValue::Numeric(v) => Some(*v),
            AlignedValue::Categorical(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AlignedValue::Numeric(_) => None,
            AlignedValue::Categorical(s) => Some(s),
        }
    }
}

/// Piecewise-linear interpolation. Queries outside the sampled range have no value.
#[derive(Debug, Clone)]
pub struct LinearInterpolator {
    times: Vec<f64>,
    values: Array1<f64>,
}

impl LinearInterpolator {
    /// `times` must be non-empty, non-decreasing and the same length as `values`.
    pub fn new(times: Vec<f64>, values: Array1<f64>) -> Self {
        debug_assert!(!times.is_empty() && times.len() == values.len());
        Self { times, values }
    }

    pub fn range(&self) -> (f64, f64) {
        (self.times[0], self.times[self.times.len() - 1])
    }

    pub fn at(&self, t: f64) -> Option<f64> {
        let (min, max) = self.range();
        if !(t >= min && t <= max) {
            return None;
        }
        let times = &self.times;
        // first sample strictly after t
        let upper = times.partition_point(|&x| x <= t);
        if upper == times.len() {
            return Some(self.values[upper - 1]);
        }
        let lower = upper - 1;
        let (t0, t1) = (times[lower], times[upper]);
        let (y0, y1) = (self.values[lower], self.values[upper]);
        Some(y0 + (t - t0) * (y1 - y0) / (t1 - t0))
    }
}

/// Nearest-sample lookup. Equidistant queries take the earlier sample; queries outside
/// the sampled range clamp to the boundary sample.
#[derive(Debug, Clone)]
pub struct NearestInterpolator {
    times: Vec<f64>,
    values: Vec<String>,
}

impl NearestInterpolator {
    pub fn new(times: Vec<f64>, values: Vec<String>) -> Self {
        debug_assert!(!times.is_empty() && times.len() == values.len());
        Self { times, values }
    }

    pub fn nearest_index(&self, t: f64) -> usize {
        let n = self.times.len();
        // first sample at or after t
        let next = self.times.partition_point(|&x| x < t);
        if next == 0 {
            return 0;
        }
        if next == n {
            return n - 1;
        }
        let prev = next - 1;
        if self.times[next] - t < t - self.times[prev] {
            next
        } else {
            prev
        }
    }

    pub fn at(&self, t: f64) -> &str {
        &self.values[self.nearest_index(t)]
    }
}

/// Column interpolant, chosen once from the column's type.
#[derive(Debug, Clone)]
pub enum Interpolator {
    Numeric(LinearInterpolator),
    Nearest(NearestInterpolator),
}

impl Interpolator {
    pub fn from_column(times: Vec<f64>, data: &ColumnData) -> Self {
        match data {
            ColumnData::Numeric(values) => {
                Interpolator::Numeric(LinearInterpolator::new(times, values.clone()))
            }
            ColumnData::Categorical(values) => {
                Interpolator::Nearest(NearestInterpolator::new(times, values.clone()))
            }
        }
    }

    /// Resample at `t`. Only numeric columns can fail, with [`Error::OutOfRange`].
    pub fn interpolate(&self, column: &str, t: f64) -> Result<AlignedValue> {
        match self {
            Interpolator::Numeric(lin) => {
                lin.at(t).map(AlignedValue::Numeric).ok_or_else(|| {
                    let (min, max) = lin.range();
                    Error::OutOfRange {
                        column: column.to_string(),
                        query: t,
                        min,
                        max,
                    }
                })
            }
            Interpolator::Nearest(nearest) => {
                Ok(AlignedValue::Categorical(nearest.at(t).to_string()))
            }
        }
    }
}
