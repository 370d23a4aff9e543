//! Time series data handling for forecasting

use crate::error::{ForecastError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[cfg(feature = "polars")]
pub mod frame;
pub mod frequency;
pub mod ingest;
pub mod table;

pub use frequency::Frequency;
pub use ingest::{DataSource, IngestReport, Ingestor, SymbolProvider};
pub use table::RawTable;

/// An ordered, validated sequence of timestamped observations.
///
/// Timestamps are strictly increasing and every value is finite. A series
/// never changes after construction; transformations return new series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTimeSeries")]
pub struct TimeSeries {
    timestamps: Vec<DateTime<Utc>>,
    values: Vec<f64>,
    frequency: Option<Frequency>,
}

/// Unvalidated wire form of [`TimeSeries`]
#[derive(Deserialize)]
struct RawTimeSeries {
    timestamps: Vec<DateTime<Utc>>,
    values: Vec<f64>,
    #[serde(default)]
    frequency: Option<Frequency>,
}

impl TryFrom<RawTimeSeries> for TimeSeries {
    type Error = ForecastError;

    fn try_from(raw: RawTimeSeries) -> Result<Self> {
        Ok(TimeSeries::new(raw.timestamps, raw.values)?.with_frequency(raw.frequency))
    }
}

impl TimeSeries {
    /// Create a new series from parallel timestamp and value vectors
    pub fn new(timestamps: Vec<DateTime<Utc>>, values: Vec<f64>) -> Result<Self> {
        if timestamps.len() != values.len() {
            return Err(ForecastError::DataError(format!(
                "Timestamps length ({}) doesn't match values length ({})",
                timestamps.len(),
                values.len()
            )));
        }

        if let Some(i) = values.iter().position(|v| !v.is_finite()) {
            return Err(ForecastError::DataError(format!(
                "Value at position {} is not finite: {}",
                i, values[i]
            )));
        }

        if let Some(i) = timestamps.windows(2).position(|w| w[1] <= w[0]) {
            return Err(ForecastError::DataError(format!(
                "Timestamps must be strictly increasing: {} is followed by {}",
                timestamps[i],
                timestamps[i + 1]
            )));
        }

        Ok(Self {
            timestamps,
            values,
            frequency: None,
        })
    }

    /// Create a regularly spaced series starting at `start`
    pub fn from_values(start: DateTime<Utc>, frequency: Frequency, values: Vec<f64>) -> Result<Self> {
        let mut timestamps = Vec::with_capacity(values.len());
        let mut current = start;
        for _ in 0..values.len() {
            timestamps.push(current);
            current = frequency.next(current);
        }

        Ok(Self::new(timestamps, values)?.with_frequency(Some(frequency)))
    }

    /// Attach (or clear) the implied sampling frequency
    pub fn with_frequency(mut self, frequency: Option<Frequency>) -> Self {
        self.frequency = frequency;
        self
    }

    pub fn timestamps(&self) -> &[DateTime<Utc>] {
        &self.timestamps
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// The implied sampling frequency, when known
    pub fn frequency(&self) -> Option<Frequency> {
        self.frequency
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn first_timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamps.first().copied()
    }

    pub fn last_timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamps.last().copied()
    }

    /// Split into a prefix of `n` observations and the remaining suffix
    pub fn split_at(&self, n: usize) -> Result<(TimeSeries, TimeSeries)> {
        if n > self.len() {
            return Err(ForecastError::ValidationError(format!(
                "Cannot split a series of length {} at {}",
                self.len(),
                n
            )));
        }

        Ok((self.slice(0, n), self.slice(n, self.len())))
    }

    /// Observations in `start..end`, keeping the frequency
    pub(crate) fn slice(&self, start: usize, end: usize) -> TimeSeries {
        TimeSeries {
            timestamps: self.timestamps[start..end].to_vec(),
            values: self.values[start..end].to_vec(),
            frequency: self.frequency,
        }
    }
}
