//! Cleaning an ingested series before modelling
//!
//! The preprocessor restores a uniform time step when the series has an
//! implied frequency, filling internal gaps without ever extrapolating past
//! the first or last observation. Differencing is left to the order search;
//! this module only reports which differencing orders the data can support.

use crate::config::PreprocessConfig;
use crate::data::{Frequency, TimeSeries};
use crate::error::Result;
use crate::models::arima::MIN_DIFFERENCED_LEN;
use crate::models::ModelFamily;
use chrono::{DateTime, Utc};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const SECONDS_PER_DAY: i64 = 86_400;

/// How internal gaps are filled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FillMethod {
    /// Repeat the last observed value
    #[default]
    ForwardFill,
    /// Interpolate linearly between the surrounding observations
    Linear,
}

/// Outcome of [`Preprocessor::prepare_with_report`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PrepareReport {
    /// Number of observations inserted into gaps
    pub filled: usize,
    /// Frequency the series was regularised to, if any
    pub frequency: Option<Frequency>,
}

/// Derives the cleaned series used for modelling
#[derive(Debug, Clone, Default)]
pub struct Preprocessor {
    config: PreprocessConfig,
}

impl Preprocessor {
    pub fn new(config: PreprocessConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PreprocessConfig {
        &self.config
    }

    /// Return the gap-filled series; the input is left untouched
    pub fn prepare(&self, series: &TimeSeries) -> Result<TimeSeries> {
        self.prepare_with_report(series).map(|(prepared, _)| prepared)
    }

    pub fn prepare_with_report(&self, series: &TimeSeries) -> Result<(TimeSeries, PrepareReport)> {
        let frequency = self.config.frequency.or_else(|| {
            if self.config.infer_frequency {
                infer_frequency(series.timestamps())
            } else {
                series.frequency()
            }
        });

        let frequency = match frequency {
            Some(f) => f,
            None => {
                debug!("No implied frequency; series passed through unchanged");
                return Ok((series.clone(), PrepareReport::default()));
            }
        };

        let timestamps = series.timestamps();
        let values = series.values();
        let mut out_ts = Vec::with_capacity(series.len());
        let mut out_values = Vec::with_capacity(series.len());
        let mut filled = 0;
        let mut misaligned = 0;

        for i in 0..series.len() {
            if i > 0 {
                let (prev_ts, prev_value) = (timestamps[i - 1], values[i - 1]);
                match frequency.steps_between(prev_ts, timestamps[i]) {
                    Some(steps) if steps > 1 => {
                        let mut ts = prev_ts;
                        for k in 1..steps {
                            ts = frequency.next(ts);
                            out_ts.push(ts);
                            out_values.push(self.fill_value(prev_value, values[i], k, steps));
                        }
                        filled += steps - 1;
                    }
                    Some(_) => {}
                    None => misaligned += 1,
                }
            }
            out_ts.push(timestamps[i]);
            out_values.push(values[i]);
        }

        if misaligned > 0 {
            warn!(
                "{} step(s) do not align with the {} grid and were left unfilled",
                misaligned, frequency
            );
        }
        if filled > 0 {
            debug!("Filled {} gap observation(s) at {}", filled, frequency);
        }

        let prepared = TimeSeries::new(out_ts, out_values)?.with_frequency(Some(frequency));
        Ok((
            prepared,
            PrepareReport {
                filled,
                frequency: Some(frequency),
            },
        ))
    }

    fn fill_value(&self, before: f64, after: f64, k: usize, steps: usize) -> f64 {
        match self.config.fill {
            FillMethod::ForwardFill => before,
            FillMethod::Linear => before + (after - before) * k as f64 / steps as f64,
        }
    }
}

/// Infer the implied sampling frequency of strictly increasing timestamps.
///
/// The modal step must account for at least half of all steps. A modal step
/// of one day on weekday-only data that follows the business calendar yields
/// [`Frequency::BusinessDaily`]; otherwise every step must be a whole
/// multiple of the modal step.
pub fn infer_frequency(timestamps: &[DateTime<Utc>]) -> Option<Frequency> {
    if timestamps.len() < 2 {
        return None;
    }

    let steps: Vec<i64> = timestamps
        .windows(2)
        .map(|w| (w[1] - w[0]).num_seconds())
        .collect();
    if steps.iter().any(|s| *s <= 0) {
        return None;
    }

    let mut counts: BTreeMap<i64, usize> = BTreeMap::new();
    for step in &steps {
        *counts.entry(*step).or_insert(0) += 1;
    }

    // Ascending iteration keeps the smaller step on ties
    let (mode, mode_count) = counts
        .iter()
        .fold((0, 0), |best, (&step, &count)| if count > best.1 { (step, count) } else { best });

    if mode_count * 2 < steps.len() {
        return None;
    }

    if mode == SECONDS_PER_DAY
        && timestamps
            .iter()
            .all(|ts| !crate::data::frequency::is_weekend(ts))
        && timestamps
            .windows(2)
            .all(|w| Frequency::BusinessDaily.steps_between(w[0], w[1]).is_some())
    {
        return Some(Frequency::BusinessDaily);
    }

    if steps.iter().all(|s| s % mode == 0) {
        return Some(Frequency::Fixed { seconds: mode });
    }

    None
}

/// Differencing orders the order search may try for `family`.
///
/// An order `d` is kept only when at least [`MIN_DIFFERENCED_LEN`] values
/// remain after differencing.
pub fn differencing_candidates(values: &[f64], family: &ModelFamily, max_d: usize) -> Vec<usize> {
    let orders: Vec<usize> = match family {
        ModelFamily::Arima(order) => vec![order.d],
        ModelFamily::AutoArima => (0..=max_d).collect(),
    };

    let candidates: Vec<usize> = orders
        .into_iter()
        .filter(|d| values.len() > d + MIN_DIFFERENCED_LEN)
        .collect();

    debug!("Differencing candidates {:?}", candidates);

    candidates
}
