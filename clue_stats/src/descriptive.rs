//! Descriptive statistics over plain `f64` slices
//!
//! Contains the summary measures used by exploratory analysis and model fitting:
//! - Mean, median, sample variance and standard deviation
//! - Percentage changes (simple returns)
//! - Rolling mean over a fixed window

use crate::{Result, StatsError};
use std::collections::VecDeque;

/// Arithmetic mean of the values
pub fn mean(values: &[f64]) -> Result<f64> {
    if values.is_empty() {
        return Err(StatsError::InsufficientData(
            "Cannot take the mean of an empty slice".to_string(),
        ));
    }

    Ok(values.iter().sum::<f64>() / values.len() as f64)
}

/// Median of the values
pub fn median(values: &[f64]) -> Result<f64> {
    if values.is_empty() {
        return Err(StatsError::InsufficientData(
            "Cannot take the median of an empty slice".to_string(),
        ));
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Ok((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Ok(sorted[mid])
    }
}

/// Sample variance (n - 1 denominator)
pub fn sample_variance(values: &[f64]) -> Result<f64> {
    if values.len() < 2 {
        return Err(StatsError::InsufficientData(format!(
            "Sample variance needs at least 2 values, have {}",
            values.len()
        )));
    }

    let mean = mean(values)?;
    let sum_sq: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();

    Ok(sum_sq / (values.len() - 1) as f64)
}

/// Sample standard deviation (n - 1 denominator)
pub fn sample_std(values: &[f64]) -> Result<f64> {
    sample_variance(values).map(f64::sqrt)
}

/// Percentage change between consecutive values.
///
/// Pairs whose base value is zero are skipped, so the output may be shorter
/// than `values.len() - 1`.
pub fn pct_change(values: &[f64]) -> Vec<f64> {
    values
        .windows(2)
        .filter(|w| w[0] != 0.0)
        .map(|w| w[1] / w[0] - 1.0)
        .collect()
}

/// Simple moving average over a sliding window
#[derive(Debug, Clone)]
pub struct SimpleMovingAverage {
    period: usize,
    values: VecDeque<f64>,
    sum: f64,
}

impl SimpleMovingAverage {
    /// Create a new moving average with the specified period
    pub fn new(period: usize) -> Result<Self> {
        if period == 0 {
            return Err(StatsError::InvalidInput(
                "Period must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            period,
            values: VecDeque::with_capacity(period),
            sum: 0.0,
        })
    }

    /// Push a new value into the window
    pub fn update(&mut self, value: f64) {
        self.values.push_back(value);
        self.sum += value;

        if self.values.len() > self.period {
            if let Some(old_value) = self.values.pop_front() {
                self.sum -= old_value;
            }
        }
    }

    /// Current average, once the window is full
    pub fn value(&self) -> Option<f64> {
        if self.values.len() < self.period {
            return None;
        }

        Some(self.sum / self.period as f64)
    }
}

/// Rolling mean aligned with the input.
///
/// The first `window - 1` entries are `None`, matching the usual
/// "not enough history yet" convention.
pub fn rolling_mean(values: &[f64], window: usize) -> Result<Vec<Option<f64>>> {
    let mut sma = SimpleMovingAverage::new(window)?;

    Ok(values
        .iter()
        .map(|&v| {
            sma.update(v);
            sma.value()
        })
        .collect())
}
