//! Exploratory summary of an ingested series

use crate::data::TimeSeries;
use crate::error::{ForecastError, Result};
use chrono::{DateTime, Utc};
use clue_stats::{mean, median, pct_change, rolling_mean, sample_std};
use serde::Serialize;
use std::fmt;

/// Window of the rolling mean shown alongside the price history
pub const DEFAULT_ROLLING_WINDOW: usize = 20;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BasicStats {
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub n_observations: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    /// Sample standard deviation; absent for a single observation
    pub std: Option<f64>,
}

/// Statistics of simple period-over-period returns
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReturnsStats {
    pub mean_daily_return: f64,
    /// Sample standard deviation of returns; absent for a single return
    pub volatility: Option<f64>,
    pub min_return: f64,
    pub max_return: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdaSummary {
    pub basic_stats: BasicStats,
    /// Observations missing from the source
    pub missing_values: usize,
    /// Absent when there are fewer than two observations
    pub returns_stats: Option<ReturnsStats>,
    /// Rolling mean aligned with the series
    pub rolling_mean: Vec<Option<f64>>,
}

/// Summarise `series`; `missing` is the number of observations the loader
/// dropped or filled
pub fn eda_summary(series: &TimeSeries, missing: usize) -> Result<EdaSummary> {
    let (start_date, end_date) = match (series.first_timestamp(), series.last_timestamp()) {
        (Some(start), Some(end)) => (start, end),
        _ => {
            return Err(ForecastError::DataError(
                "Cannot summarise an empty series".to_string(),
            ))
        }
    };

    let values = series.values();
    let basic_stats = BasicStats {
        start_date,
        end_date,
        n_observations: values.len(),
        min: values.iter().copied().fold(f64::INFINITY, f64::min),
        max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        mean: mean(values)?,
        median: median(values)?,
        std: sample_std(values).ok(),
    };

    let returns = pct_change(values);
    let returns_stats = if returns.is_empty() {
        None
    } else {
        Some(ReturnsStats {
            mean_daily_return: mean(&returns)?,
            volatility: sample_std(&returns).ok(),
            min_return: returns.iter().copied().fold(f64::INFINITY, f64::min),
            max_return: returns.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        })
    };

    Ok(EdaSummary {
        basic_stats,
        missing_values: missing,
        returns_stats,
        rolling_mean: rolling_mean(values, DEFAULT_ROLLING_WINDOW)?,
    })
}

fn fmt_optional(value: Option<f64>, precision: usize) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{:.*}", precision, v))
}

impl fmt::Display for EdaSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stats = &self.basic_stats;
        writeln!(f, "DATA OVERVIEW")?;
        writeln!(f, "Start Date   : {}", stats.start_date.format("%Y-%m-%d %H:%M:%S"))?;
        writeln!(f, "End Date     : {}", stats.end_date.format("%Y-%m-%d %H:%M:%S"))?;
        writeln!(f, "Observations : {}", stats.n_observations)?;
        writeln!(f, "Missing      : {}", self.missing_values)?;
        writeln!(f)?;
        writeln!(f, "PRICE STATISTICS")?;
        writeln!(f, "Min  : {:.2}", stats.min)?;
        writeln!(f, "Max  : {:.2}", stats.max)?;
        writeln!(f, "Mean : {:.2}", stats.mean)?;
        writeln!(f, "Std  : {}", fmt_optional(stats.std, 2))?;
        writeln!(f)?;
        writeln!(f, "RETURNS")?;
        let returns = self.returns_stats.as_ref();
        writeln!(
            f,
            "Mean Daily Return : {}",
            fmt_optional(returns.map(|r| r.mean_daily_return), 4)
        )?;
        writeln!(
            f,
            "Volatility        : {}",
            fmt_optional(returns.and_then(|r| r.volatility), 4)
        )
    }
}
