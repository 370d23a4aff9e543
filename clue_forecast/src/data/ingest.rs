//! Normalising raw sources into a validated time series

use crate::config::{DateRange, IngestConfig};
use crate::data::{RawTable, TimeSeries};
use crate::error::{ForecastError, Result};
use crate::utils::parse_timestamp;
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// Where the raw observations come from
#[derive(Debug, Clone)]
pub enum DataSource {
    /// A CSV file with a header row
    Csv(PathBuf),
    /// An already loaded table
    Table(RawTable),
    /// A ticker symbol, resolved through the ingestor's [`SymbolProvider`]
    Symbol { symbol: String },
    /// A polars data frame
    #[cfg(feature = "polars")]
    Frame(polars::prelude::DataFrame),
}

impl DataSource {
    pub fn csv<P: Into<PathBuf>>(path: P) -> Self {
        DataSource::Csv(path.into())
    }

    pub fn symbol<S: Into<String>>(symbol: S) -> Self {
        DataSource::Symbol {
            symbol: symbol.into(),
        }
    }
}

/// Resolves a ticker symbol into a raw table of observations.
///
/// Implementations own any network or cache access; the ingestor only
/// sees the resulting table.
pub trait SymbolProvider: Send + Sync {
    fn fetch(&self, symbol: &str, range: Option<&DateRange>) -> Result<RawTable>;
}

/// What happened to the raw rows during ingestion
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    /// Rows present in the source
    pub rows_read: usize,
    /// Rows dropped for an empty, non-numeric or non-finite value
    pub dropped_invalid_values: usize,
    /// Rows whose timestamp repeated an earlier row and replaced it
    pub duplicates_replaced: usize,
    /// Rows outside the configured date range
    pub outside_range: usize,
}

/// Turns a [`DataSource`] into a [`TimeSeries`]
pub struct Ingestor {
    config: IngestConfig,
    provider: Option<Box<dyn SymbolProvider>>,
}

impl fmt::Debug for Ingestor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ingestor")
            .field("config", &self.config)
            .field("provider", &self.provider.as_ref().map(|_| "SymbolProvider"))
            .finish()
    }
}

impl Default for Ingestor {
    fn default() -> Self {
        Self::new(IngestConfig::default())
    }
}

impl Ingestor {
    pub fn new(config: IngestConfig) -> Self {
        Self {
            config,
            provider: None,
        }
    }

    /// Use `provider` to resolve [`DataSource::Symbol`] sources
    pub fn with_provider(mut self, provider: Box<dyn SymbolProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn config(&self) -> &IngestConfig {
        &self.config
    }

    /// Load `source` into a sorted, de-duplicated series of finite values
    pub fn ingest(&self, source: &DataSource) -> Result<TimeSeries> {
        self.ingest_with_report(source).map(|(series, _)| series)
    }

    /// Like [`Ingestor::ingest`], also reporting dropped and replaced rows
    pub fn ingest_with_report(&self, source: &DataSource) -> Result<(TimeSeries, IngestReport)> {
        let table = match source {
            DataSource::Csv(path) => {
                debug!("Reading CSV source {}", path.display());
                RawTable::from_csv(path)?
            }
            DataSource::Table(table) => table.clone(),
            DataSource::Symbol { symbol } => {
                let provider = self.provider.as_ref().ok_or_else(|| {
                    ForecastError::DataError(format!(
                        "No symbol provider configured to resolve '{}'",
                        symbol
                    ))
                })?;
                provider.fetch(symbol, self.config.date_range.as_ref())?
            }
            #[cfg(feature = "polars")]
            DataSource::Frame(df) => crate::data::frame::table_from_frame(df)?,
        };

        self.ingest_table(&table)
    }

    /// Parse and clean an in-memory table
    pub fn ingest_table(&self, table: &RawTable) -> Result<(TimeSeries, IngestReport)> {
        if table.is_empty() {
            return Err(ForecastError::DataError("Data source is empty".to_string()));
        }

        let value_idx = table.column_index(&self.config.value_column).ok_or_else(|| {
            ForecastError::DataError(format!(
                "Column '{}' not found; available columns: {}",
                self.config.value_column,
                table.headers().join(", ")
            ))
        })?;
        let time_idx = self.time_column_index(table, value_idx)?;

        let mut report = IngestReport {
            rows_read: table.len(),
            ..IngestReport::default()
        };
        let mut observations: BTreeMap<DateTime<Utc>, f64> = BTreeMap::new();

        for (row_no, row) in table.rows().iter().enumerate() {
            let raw_ts = &row[time_idx];
            let ts = parse_timestamp(raw_ts).ok_or_else(|| {
                ForecastError::DataError(format!(
                    "Unparseable timestamp '{}' in row {}",
                    raw_ts,
                    row_no + 1
                ))
            })?;

            if let Some(range) = &self.config.date_range {
                if !range.contains(ts.date_naive()) {
                    report.outside_range += 1;
                    continue;
                }
            }

            let value = match parse_value(&row[value_idx]) {
                Some(v) => v,
                None => {
                    report.dropped_invalid_values += 1;
                    continue;
                }
            };

            if observations.insert(ts, value).is_some() {
                report.duplicates_replaced += 1;
            }
        }

        if report.dropped_invalid_values > 0 {
            warn!(
                "Dropped {} row(s) with missing or non-finite '{}' values",
                report.dropped_invalid_values, self.config.value_column
            );
        }
        if report.duplicates_replaced > 0 {
            warn!(
                "Replaced {} duplicate timestamp(s), keeping the last value",
                report.duplicates_replaced
            );
        }

        if observations.len() < self.config.min_observations {
            return Err(ForecastError::DataError(format!(
                "Need at least {} observations after cleaning, have {}",
                self.config.min_observations,
                observations.len()
            )));
        }

        let (timestamps, values): (Vec<_>, Vec<_>) = observations.into_iter().unzip();
        let series = TimeSeries::new(timestamps, values)?;
        info!(
            "Ingested {} observations of '{}' ({} rows read)",
            series.len(),
            self.config.value_column,
            report.rows_read
        );

        Ok((series, report))
    }

    fn time_column_index(&self, table: &RawTable, value_idx: usize) -> Result<usize> {
        if let Some(name) = &self.config.time_column {
            return table.column_index(name).ok_or_else(|| {
                ForecastError::DataError(format!("Time column '{}' not found", name))
            });
        }

        let by_name = table.headers().iter().enumerate().position(|(i, h)| {
            let lower = h.to_lowercase();
            i != value_idx && (lower.contains("date") || lower.contains("time"))
        });
        if let Some(idx) = by_name {
            return Ok(idx);
        }

        // Fall back to the first column when its first cell looks like a timestamp
        if value_idx != 0 {
            let first_cell = table.column(0).find(|c| !c.trim().is_empty());
            if first_cell.and_then(parse_timestamp).is_some() {
                return Ok(0);
            }
        }

        Err(ForecastError::DataError(
            "Could not detect a time column".to_string(),
        ))
    }
}

fn parse_value(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}
