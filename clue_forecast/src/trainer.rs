//! Fitting a selected model specification

use crate::data::{Frequency, TimeSeries};
use crate::error::{ForecastError, Result};
use crate::models::arima::{ArimaModel, TrainedArimaModel};
use crate::models::{ForecastModel, ModelFamily, ModelSpec, TrainedForecastModel};
use crate::selection::InformationCriterion;
use chrono::{DateTime, Utc};
use log::info;

/// A model whose parameters were estimated successfully.
///
/// The only way to obtain one is [`fit`], so holding a `FittedModel` means
/// estimation converged.
#[derive(Debug, Clone)]
pub struct FittedModel {
    spec: ModelSpec,
    inner: TrainedArimaModel,
    last_timestamp: Option<DateTime<Utc>>,
    frequency: Option<Frequency>,
}

impl FittedModel {
    pub fn spec(&self) -> &ModelSpec {
        &self.spec
    }

    pub fn intercept(&self) -> Option<f64> {
        self.inner.intercept()
    }

    pub fn ar_coefficients(&self) -> &[f64] {
        self.inner.ar_coefficients()
    }

    pub fn ma_coefficients(&self) -> &[f64] {
        self.inner.ma_coefficients()
    }

    /// Residual variance
    pub fn sigma2(&self) -> f64 {
        self.inner.sigma2()
    }

    /// In-sample one-step-ahead residuals on the differenced scale
    pub fn residuals(&self) -> &[f64] {
        self.inner.residuals()
    }

    pub fn log_likelihood(&self) -> f64 {
        self.inner.log_likelihood()
    }

    /// Information criterion evaluated on this fit's own sample
    pub fn criterion(&self, criterion: InformationCriterion) -> f64 {
        criterion.score(
            self.inner.log_likelihood(),
            self.inner.n_params(),
            self.inner.n_effective(),
        )
    }

    pub fn aic(&self) -> f64 {
        self.criterion(InformationCriterion::Aic)
    }

    pub fn aicc(&self) -> f64 {
        self.criterion(InformationCriterion::Aicc)
    }

    pub fn bic(&self) -> f64 {
        self.criterion(InformationCriterion::Bic)
    }

    /// Number of observations in the training series
    pub fn n_observations(&self) -> usize {
        self.inner.history().len()
    }

    pub fn last_timestamp(&self) -> Option<DateTime<Utc>> {
        self.last_timestamp
    }

    /// Sampling frequency of the training series, when known
    pub fn frequency(&self) -> Option<Frequency> {
        self.frequency
    }

    pub(crate) fn model(&self) -> &TrainedArimaModel {
        &self.inner
    }
}

/// Estimate the parameters of `spec` on `series`
pub fn fit(series: &TimeSeries, spec: &ModelSpec) -> Result<FittedModel> {
    if let ModelFamily::Arima(order) = spec.family {
        if order != spec.order {
            return Err(ForecastError::ValidationError(format!(
                "Spec order {} contradicts the fixed family {}",
                spec.order, spec.family
            )));
        }
    }

    let inner = ArimaModel::new(spec.order).train(series.values())?;
    info!(
        "Fitted {} on {} observations (sigma2 = {:.6e})",
        inner.name(),
        series.len(),
        inner.sigma2()
    );

    Ok(FittedModel {
        spec: *spec,
        inner,
        last_timestamp: series.last_timestamp(),
        frequency: series.frequency(),
    })
}
