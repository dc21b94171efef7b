use ndarray::Array1;

use crate::error::{Result, TelemetryError};

/// One telemetry data column.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Numeric(Array1<f64>),
    Categorical(Vec<String>),
}

impl ColumnData {
    /// Classify a raw text column: numeric when every cell parses as `f64`,
    /// categorical otherwise.
    pub fn infer(cells: Vec<String>) -> Self {
        let parsed: Option<Vec<f64>> = cells.iter().map(|c| c.trim().parse().ok()).collect();
        match parsed {
            Some(values) if !cells.is_empty() => ColumnData::Numeric(Array1::from(values)),
            _ => ColumnData::Categorical(cells),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ColumnData::Numeric(v) => v.len(),
            ColumnData::Categorical(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnData::Numeric(_))
    }
}

/// A telemetry log: a monotonic time column plus named data columns.
///
/// Time is in the log's own clock. Rows are assumed to be in time order; equal
/// consecutive times are allowed.
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetrySeries {
    time: Array1<f64>,
    columns: Vec<(String, ColumnData)>,
}

impl TelemetrySeries {
    pub fn new(time: Vec<f64>) -> Result<Self> {
        if time.is_empty() {
            return Err(TelemetryError::Empty.into());
        }
        if let Some(row) = time.iter().position(|t| !t.is_finite()) {
            return Err(TelemetryError::NonFiniteTime { row }.into());
        }
        if let Some(row) = time.windows(2).position(|w| w[1] < w[0]) {
            return Err(TelemetryError::NonMonotonicTime {
                row: row + 1,
                previous: time[row],
                current: time[row + 1],
            }
            .into());
        }
        Ok(Self {
            time: Array1::from(time),
            columns: Vec::new(),
        })
    }

    pub fn with_column(mut self, name: impl Into<String>, data: ColumnData) -> Result<Self> {
        let name = name.into();
        if data.len() != self.time.len() {
            return Err(TelemetryError::LengthMismatch {
                column: name,
                expected: self.time.len(),
                got: data.len(),
            }
            .into());
        }
        if self.columns.iter().any(|(n, _)| *n == name) {
            return Err(TelemetryError::DuplicateColumn(name).into());
        }
        self.columns.push((name, data));
        Ok(self)
    }

    pub fn with_numeric(self, name: impl Into<String>, values: Vec<f64>) -> Result<Self> {
        self.with_column(name, ColumnData::Numeric(Array1::from(values)))
    }

    pub fn with_categorical<S: Into<String>>(
        self,
        name: impl Into<String>,
        values: Vec<S>,
    ) -> Result<Self> {
        let values = values.into_iter().map(Into::into).collect();
        self.with_column(name, ColumnData::Categorical(values))
    }

    pub fn with_inferred(self, name: impl Into<String>, cells: Vec<String>) -> Result<Self> {
        self.with_column(name, ColumnData::infer(cells))
    }

    pub fn time(&self) -> &Array1<f64> {
        &self.time
    }

    pub fn columns(&self) -> &[(String, ColumnData)] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&ColumnData> {
        self.columns.iter().find(|(n, _)| n == name).map(|(_, d)| d)
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Earliest time, the default anchor.
    pub fn min_time(&self) -> f64 {
        self.time[0]
    }
}
