//! Bounded order search driven by an information criterion

use crate::data::TimeSeries;
use crate::error::{ForecastError, Result};
use crate::models::arima::ArimaModel;
use crate::models::{ForecastModel, ModelFamily, ModelSpec, Order, SearchBounds};
use crate::preprocess::differencing_candidates;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Relative margin a candidate must beat the incumbent by to replace it
const TIE_EPSILON: f64 = 1e-9;

/// Score balancing fit quality against model complexity; lower is better
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InformationCriterion {
    /// Akaike information criterion
    #[default]
    Aic,
    /// Small-sample corrected AIC
    Aicc,
    /// Bayesian information criterion
    Bic,
}

impl InformationCriterion {
    /// Score a fit with log-likelihood `log_likelihood`, `k` parameters and `n` observations
    pub fn score(&self, log_likelihood: f64, k: usize, n: usize) -> f64 {
        let k_f = k as f64;
        let n_f = n as f64;
        let aic = -2.0 * log_likelihood + 2.0 * k_f;
        match self {
            InformationCriterion::Aic => aic,
            InformationCriterion::Aicc => {
                if n > k + 1 {
                    aic + 2.0 * k_f * (k_f + 1.0) / (n_f - k_f - 1.0)
                } else {
                    f64::INFINITY
                }
            }
            InformationCriterion::Bic => -2.0 * log_likelihood + k_f * n_f.ln(),
        }
    }
}

impl fmt::Display for InformationCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InformationCriterion::Aic => write!(f, "AIC"),
            InformationCriterion::Aicc => write!(f, "AICc"),
            InformationCriterion::Bic => write!(f, "BIC"),
        }
    }
}

/// What happened to one candidate order during the search
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateOutcome {
    pub order: Order,
    /// Criterion value when the candidate fitted
    pub score: Option<f64>,
    /// Failure message when it did not
    pub error: Option<String>,
}

/// Result of an order search
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Selection {
    pub spec: ModelSpec,
    pub criterion: InformationCriterion,
    pub score: f64,
    /// Every candidate in the order it was tried
    pub candidates: Vec<CandidateOutcome>,
}

/// Exhaustive, deterministic search over [`SearchBounds`]
#[derive(Debug, Clone, Copy, Default)]
pub struct ModelSelector {
    bounds: SearchBounds,
    criterion: InformationCriterion,
}

impl ModelSelector {
    pub fn new(bounds: SearchBounds, criterion: InformationCriterion) -> Self {
        Self { bounds, criterion }
    }

    pub fn bounds(&self) -> &SearchBounds {
        &self.bounds
    }

    pub fn criterion(&self) -> InformationCriterion {
        self.criterion
    }

    /// Fit every admissible order and keep the best-scoring one.
    ///
    /// Candidates are tried in lexicographic order and a later candidate only
    /// wins by a margin larger than a relative epsilon, so near-ties resolve
    /// to the smaller order. All candidates are scored on the same number of
    /// residuals so that scores are comparable across differencing orders.
    pub fn select(&self, series: &TimeSeries, family: &ModelFamily) -> Result<Selection> {
        self.bounds.validate()?;

        let orders = self.candidate_orders(series.values(), family)?;
        let n_ref = self.reference_sample_size(series.len());

        let mut outcomes = Vec::with_capacity(orders.len());
        let mut best: Option<(Order, f64)> = None;

        for order in orders {
            match self.score_order(series.values(), order, n_ref) {
                Ok(score) => {
                    debug!("Candidate ARIMA{}: {} = {:.6}", order, self.criterion, score);
                    let improves = match best {
                        None => true,
                        Some((_, incumbent)) => {
                            score < incumbent - TIE_EPSILON * (1.0 + incumbent.abs())
                        }
                    };
                    if improves {
                        best = Some((order, score));
                    }
                    outcomes.push(CandidateOutcome {
                        order,
                        score: Some(score),
                        error: None,
                    });
                }
                Err(e) => {
                    debug!("Candidate ARIMA{} skipped: {}", order, e);
                    outcomes.push(CandidateOutcome {
                        order,
                        score: None,
                        error: Some(e.to_string()),
                    });
                }
            }
        }

        let (order, score) = best.ok_or_else(|| {
            ForecastError::ModelSelectionError(format!(
                "None of the {} candidate orders could be fitted",
                outcomes.len()
            ))
        })?;

        info!(
            "Selected ARIMA{} ({} = {:.4}, {} candidates)",
            order,
            self.criterion,
            score,
            outcomes.len()
        );

        Ok(Selection {
            spec: ModelSpec::new(*family, order),
            criterion: self.criterion,
            score,
            candidates: outcomes,
        })
    }

    fn candidate_orders(&self, values: &[f64], family: &ModelFamily) -> Result<Vec<Order>> {
        if let ModelFamily::Arima(order) = family {
            if !self.bounds.contains(order) {
                return Err(ForecastError::ValidationError(format!(
                    "Order {} lies outside the search bounds ({}, {}, {})",
                    order, self.bounds.max_p, self.bounds.max_d, self.bounds.max_q
                )));
            }
        }

        let ds = differencing_candidates(values, family, self.bounds.max_d);
        let orders: Vec<Order> = match family {
            ModelFamily::Arima(order) => vec![*order],
            ModelFamily::AutoArima => self.bounds.candidates(),
        }
        .into_iter()
        .filter(|o| ds.contains(&o.d))
        .collect();

        if orders.is_empty() {
            return Err(ForecastError::ModelSelectionError(format!(
                "Series of length {} is too short for any candidate order",
                values.len()
            )));
        }

        Ok(orders)
    }

    /// Residual count shared by every candidate in the bounds
    fn reference_sample_size(&self, len: usize) -> usize {
        len.saturating_sub(self.bounds.max_d + self.bounds.max_p.max(self.bounds.max_q))
            .max(1)
    }

    fn score_order(&self, values: &[f64], order: Order, n_ref: usize) -> Result<f64> {
        let trained = ArimaModel::new(order).train(values)?;
        let score = self.criterion.score(
            trained.log_likelihood_at(n_ref),
            trained.n_params(),
            n_ref,
        );

        if score.is_finite() {
            Ok(score)
        } else {
            Err(ForecastError::FitError(format!(
                "ARIMA{} has a non-finite {}",
                order, self.criterion
            )))
        }
    }
}

/// Select the best order for `family` within `bounds` using AIC
pub fn select_order(
    series: &TimeSeries,
    family: &ModelFamily,
    bounds: &SearchBounds,
) -> Result<ModelSpec> {
    ModelSelector::new(*bounds, InformationCriterion::default())
        .select(series, family)
        .map(|selection| selection.spec)
}
