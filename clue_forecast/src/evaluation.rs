//! Holdout evaluation of forecast accuracy

use crate::data::TimeSeries;
use crate::error::{ForecastError, Result};
use crate::models::arima::MIN_DIFFERENCED_LEN;
use crate::models::{ModelFamily, Order, SearchBounds, TrainedForecastModel};
use crate::selection::{InformationCriterion, ModelSelector};
use crate::trainer::fit;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Default minimum series length for an evaluation
pub const DEFAULT_MIN_OBSERVATIONS: usize = 30;
/// Fewest observations a holdout may leave for training
pub const MIN_TRAINING_OBSERVATIONS: usize = MIN_DIFFERENCED_LEN + 1;

/// Forecast accuracy over a holdout window.
///
/// Errors are `forecast - actual`; MAPE is a percentage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvaluationMetrics {
    pub mae: f64,
    pub mse: f64,
    pub rmse: f64,
    pub mape: f64,
}

impl EvaluationMetrics {
    /// Metrics keyed by their conventional upper-case names
    pub fn to_map(&self) -> BTreeMap<String, f64> {
        BTreeMap::from([
            ("MAE".to_string(), self.mae),
            ("MSE".to_string(), self.mse),
            ("RMSE".to_string(), self.rmse),
            ("MAPE".to_string(), self.mape),
        ])
    }
}

impl fmt::Display for EvaluationMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "MAE : {:.4}", self.mae)?;
        writeln!(f, "MSE : {:.4}", self.mse)?;
        writeln!(f, "RMSE: {:.4}", self.rmse)?;
        write!(f, "MAPE: {:.4}%", self.mape)
    }
}

/// Compare `forecast` against `actual`.
///
/// Zero actuals are left out of MAPE only; when every actual is zero MAPE
/// is reported as 0.
pub fn compute_metrics(forecast: &[f64], actual: &[f64]) -> Result<EvaluationMetrics> {
    if forecast.len() != actual.len() {
        return Err(ForecastError::ValidationError(format!(
            "Forecast length ({}) doesn't match actual length ({})",
            forecast.len(),
            actual.len()
        )));
    }
    if forecast.is_empty() {
        return Err(ForecastError::ValidationError(
            "Cannot compute metrics over an empty holdout".to_string(),
        ));
    }

    let n = forecast.len() as f64;
    let errors: Vec<f64> = forecast.iter().zip(actual).map(|(f, a)| f - a).collect();

    let mae = errors.iter().map(|e| e.abs()).sum::<f64>() / n;
    let mse = errors.iter().map(|e| e * e).sum::<f64>() / n;
    let rmse = mse.sqrt();

    let percentage_errors: Vec<f64> = errors
        .iter()
        .zip(actual)
        .filter(|(_, a)| **a != 0.0)
        .map(|(e, a)| (e / a).abs())
        .collect();

    let mape = if percentage_errors.is_empty() {
        warn!("Every holdout actual is zero; MAPE reported as 0");
        0.0
    } else {
        if percentage_errors.len() < errors.len() {
            warn!(
                "Excluded {} zero-valued actual(s) from MAPE",
                errors.len() - percentage_errors.len()
            );
        }
        percentage_errors.iter().sum::<f64>() / percentage_errors.len() as f64 * 100.0
    };

    Ok(EvaluationMetrics { mae, mse, rmse, mape })
}

/// Size of the trailing holdout window
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HoldoutSize {
    /// A fixed number of observations
    Count(usize),
    /// A share of the series, with a floor of `min` observations
    Fraction { fraction: f64, min: usize },
}

impl Default for HoldoutSize {
    fn default() -> Self {
        HoldoutSize::Fraction {
            fraction: 0.2,
            min: 1,
        }
    }
}

impl HoldoutSize {
    /// Number of holdout observations for a series of length `len`.
    ///
    /// The holdout must be non-empty and leave at least
    /// [`MIN_TRAINING_OBSERVATIONS`] values to train on; a `min` floor that
    /// cannot be met is rejected rather than shrunk.
    pub fn resolve(&self, len: usize) -> Result<usize> {
        let size = match *self {
            HoldoutSize::Count(n) => n,
            HoldoutSize::Fraction { fraction, min } => {
                if !(fraction > 0.0 && fraction < 1.0) {
                    return Err(ForecastError::ValidationError(format!(
                        "Holdout fraction must be in (0, 1), got {}",
                        fraction
                    )));
                }
                let share = (fraction * len as f64).round() as usize;
                share.max(min)
            }
        };

        if size == 0 {
            return Err(ForecastError::ValidationError(format!(
                "Holdout is empty for a series of length {}",
                len
            )));
        }
        let remaining = len.saturating_sub(size);
        if remaining < MIN_TRAINING_OBSERVATIONS {
            return Err(ForecastError::ValidationError(format!(
                "Holdout of {} leaves {} training observations in a series of length {}, need at least {}",
                size, remaining, len, MIN_TRAINING_OBSERVATIONS
            )));
        }

        Ok(size)
    }
}

/// Outcome of a holdout evaluation: the order selected on the training
/// prefix and the errors of its forecasts over the holdout
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HoldoutEvaluation {
    pub order: Order,
    pub holdout: usize,
    pub metrics: EvaluationMetrics,
}

/// Retrains on a prefix of the series and scores forecasts of the suffix
#[derive(Debug, Clone, Copy)]
pub struct Evaluator {
    criterion: InformationCriterion,
    min_observations: usize,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new(InformationCriterion::default(), DEFAULT_MIN_OBSERVATIONS)
    }
}

impl Evaluator {
    pub fn new(criterion: InformationCriterion, min_observations: usize) -> Self {
        Self {
            criterion,
            min_observations,
        }
    }

    /// Select, fit and forecast on the training prefix, then score the holdout
    pub fn evaluate(
        &self,
        series: &TimeSeries,
        family: &ModelFamily,
        bounds: &SearchBounds,
        holdout: &HoldoutSize,
    ) -> Result<EvaluationMetrics> {
        Ok(self.evaluate_holdout(series, family, bounds, holdout)?.metrics)
    }

    /// Like [`Evaluator::evaluate`], also reporting the order the metrics
    /// were measured on
    pub fn evaluate_holdout(
        &self,
        series: &TimeSeries,
        family: &ModelFamily,
        bounds: &SearchBounds,
        holdout: &HoldoutSize,
    ) -> Result<HoldoutEvaluation> {
        if series.len() < self.min_observations {
            return Err(ForecastError::ValidationError(format!(
                "Evaluation needs at least {} observations, have {}",
                self.min_observations,
                series.len()
            )));
        }

        let holdout_len = holdout.resolve(series.len())?;
        let (train, test) = series.split_at(series.len() - holdout_len)?;

        let selection = ModelSelector::new(*bounds, self.criterion).select(&train, family)?;
        let fitted = fit(&train, &selection.spec)?;
        let projection = fitted.model().forecast(holdout_len)?;

        let metrics = compute_metrics(&projection.points, test.values())?;
        info!(
            "Holdout of {} observations with ARIMA{}: RMSE = {:.4}, MAPE = {:.2}%",
            holdout_len, selection.spec.order, metrics.rmse, metrics.mape
        );

        Ok(HoldoutEvaluation {
            order: selection.spec.order,
            holdout: holdout_len,
            metrics,
        })
    }
}

/// Evaluate with the default criterion and minimum length
pub fn evaluate(
    series: &TimeSeries,
    family: &ModelFamily,
    bounds: &SearchBounds,
    holdout: &HoldoutSize,
) -> Result<EvaluationMetrics> {
    Evaluator::default().evaluate(series, family, bounds, holdout)
}
