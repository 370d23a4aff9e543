//! Multi-step forecasts with confidence intervals

use crate::error::{ForecastError, Result};
use crate::models::{ModelSpec, TrainedForecastModel};
use crate::trainer::FittedModel;
use crate::utils::future_timestamps;
use chrono::{DateTime, Utc};
use clue_stats::two_sided_z;
use serde::Serialize;

/// Forecast result containing predicted values and their intervals
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastResult {
    spec: ModelSpec,
    /// Point forecasts, one per step
    #[serde(rename = "forecast")]
    values: Vec<f64>,
    /// `(lower, upper)` bounds, one pair per step
    #[serde(rename = "confidence_intervals")]
    intervals: Vec<(f64, f64)>,
    confidence_level: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    timestamps: Option<Vec<DateTime<Utc>>>,
}

impl ForecastResult {
    /// Create a new forecast result.
    ///
    /// Fails when the lengths disagree with `horizon` or when any step has
    /// its point forecast outside its interval.
    pub fn new(
        spec: ModelSpec,
        values: Vec<f64>,
        intervals: Vec<(f64, f64)>,
        confidence_level: f64,
        horizon: usize,
    ) -> Result<Self> {
        if values.len() != horizon || intervals.len() != horizon {
            return Err(ForecastError::InferenceError(format!(
                "Expected {} forecast steps, got {} values and {} intervals",
                horizon,
                values.len(),
                intervals.len()
            )));
        }

        for (step, (value, (lower, upper))) in values.iter().zip(intervals.iter()).enumerate() {
            if !(value.is_finite() && lower.is_finite() && upper.is_finite()) {
                return Err(ForecastError::InferenceError(format!(
                    "Step {} is not finite",
                    step + 1
                )));
            }
            if !(lower <= value && value <= upper) {
                return Err(ForecastError::InferenceError(format!(
                    "Step {}: point {} lies outside [{}, {}]",
                    step + 1,
                    value,
                    lower,
                    upper
                )));
            }
        }

        Ok(Self {
            spec,
            values,
            intervals,
            confidence_level,
            timestamps: None,
        })
    }

    /// Attach the timestamps of the forecast steps
    pub fn with_timestamps(mut self, timestamps: Vec<DateTime<Utc>>) -> Result<Self> {
        if timestamps.len() != self.values.len() {
            return Err(ForecastError::InferenceError(format!(
                "Expected {} timestamps, got {}",
                self.values.len(),
                timestamps.len()
            )));
        }
        self.timestamps = Some(timestamps);
        Ok(self)
    }

    pub fn spec(&self) -> &ModelSpec {
        &self.spec
    }

    /// Get the forecasted values
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn intervals(&self) -> &[(f64, f64)] {
        &self.intervals
    }

    pub fn lower(&self) -> Vec<f64> {
        self.intervals.iter().map(|(lower, _)| *lower).collect()
    }

    pub fn upper(&self) -> Vec<f64> {
        self.intervals.iter().map(|(_, upper)| *upper).collect()
    }

    /// Interval width at every step
    pub fn widths(&self) -> Vec<f64> {
        self.intervals.iter().map(|(lower, upper)| upper - lower).collect()
    }

    pub fn horizon(&self) -> usize {
        self.values.len()
    }

    pub fn confidence_level(&self) -> f64 {
        self.confidence_level
    }

    pub fn timestamps(&self) -> Option<&[DateTime<Utc>]> {
        self.timestamps.as_deref()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

pub(crate) fn validate_request(horizon: usize, confidence_level: f64) -> Result<()> {
    if horizon == 0 {
        return Err(ForecastError::ValidationError(
            "Forecast horizon must be a positive integer".to_string(),
        ));
    }
    if !(confidence_level > 0.0 && confidence_level < 1.0) {
        return Err(ForecastError::ValidationError(format!(
            "Confidence level must be in (0, 1), got {}",
            confidence_level
        )));
    }
    Ok(())
}

/// Project `model` forward `horizon` steps with two-sided intervals at `confidence_level`
pub fn forecast(model: &FittedModel, horizon: usize, confidence_level: f64) -> Result<ForecastResult> {
    validate_request(horizon, confidence_level)?;

    let z = two_sided_z(confidence_level)?;
    let projection = model.model().forecast(horizon)?;

    let intervals: Vec<(f64, f64)> = projection
        .points
        .iter()
        .zip(projection.std_errors.iter())
        .map(|(point, se)| (point - z * se, point + z * se))
        .collect();

    let result = ForecastResult::new(
        *model.spec(),
        projection.points,
        intervals,
        confidence_level,
        horizon,
    )?;

    match (model.last_timestamp(), model.frequency()) {
        (Some(last), Some(frequency)) => {
            result.with_timestamps(future_timestamps(last, horizon, &frequency))
        }
        _ => Ok(result),
    }
}
