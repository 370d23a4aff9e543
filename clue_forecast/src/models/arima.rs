//! ARIMA models for time series forecasting
//!
//! Parameters are estimated by minimising the conditional sum of squares
//! (CSS) of the one-step-ahead residuals on the differenced series. The
//! process is written in mean form,
//!
//! `w_t - mu = sum phi_i (w_{t-i} - mu) + e_t + sum theta_j e_{t-j}`,
//!
//! where `w` is the `d`-times differenced series and `mu` is only estimated
//! for `d <= 1`.

use crate::error::{ForecastError, Result};
use crate::models::{ForecastModel, ModelForecast, Order, TrainedForecastModel};
use clue_stats::{difference, integrate, nelder_mead, NelderMeadConfig};
use log::debug;
use std::f64::consts::PI;

/// Minimum number of residuals a fit must be conditioned on
pub const MIN_DIFFERENCED_LEN: usize = 3;

/// Bound on the sum of absolute AR (and, separately, MA) coefficients
const COEFFICIENT_SUM_LIMIT: f64 = 0.99;

/// Floor of the residual variance, relative to the mean square of the data
const RELATIVE_VARIANCE_FLOOR: f64 = 1e-16;

/// ARIMA model (AutoRegressive Integrated Moving Average)
#[derive(Debug, Clone)]
pub struct ArimaModel {
    /// Name of the model
    name: String,
    order: Order,
    optimizer: NelderMeadConfig,
}

/// Trained ARIMA model
#[derive(Debug, Clone)]
pub struct TrainedArimaModel {
    name: String,
    order: Order,
    /// Mean of the differenced process, when estimated
    intercept: Option<f64>,
    ar_coefficients: Vec<f64>,
    ma_coefficients: Vec<f64>,
    sigma2: f64,
    css: f64,
    /// Number of residuals the likelihood is conditioned on
    n_effective: usize,
    /// Training values on the original scale
    history: Vec<f64>,
    /// Training values after differencing
    differenced: Vec<f64>,
    /// Residuals aligned with `differenced`; presample entries are zero
    innovations: Vec<f64>,
    iterations: usize,
}

impl ArimaModel {
    /// Create a new ARIMA model
    pub fn new(order: Order) -> Self {
        Self {
            name: format!("ARIMA({},{},{})", order.p, order.d, order.q),
            order,
            optimizer: NelderMeadConfig::default(),
        }
    }

    /// Use a custom optimiser configuration
    pub fn with_optimizer(mut self, optimizer: NelderMeadConfig) -> Self {
        self.optimizer = optimizer;
        self
    }

    pub fn order(&self) -> Order {
        self.order
    }

    fn includes_intercept(&self) -> bool {
        self.order.d <= 1
    }

    /// Number of estimated mean and ARMA coefficients
    fn n_coefficients(&self) -> usize {
        self.order.p + self.order.q + usize::from(self.includes_intercept())
    }

    /// Split a flat parameter vector into `(mu, phi, theta)`
    fn unpack<'a>(&self, params: &'a [f64]) -> (f64, &'a [f64], &'a [f64]) {
        let offset = usize::from(self.includes_intercept());
        let mu = if offset == 1 { params[0] } else { 0.0 };
        let ar = &params[offset..offset + self.order.p];
        let ma = &params[offset + self.order.p..];
        (mu, ar, ma)
    }
}

impl ForecastModel for ArimaModel {
    type Trained = TrainedArimaModel;

    fn train(&self, values: &[f64]) -> Result<TrainedArimaModel> {
        let Order { p, d, q } = self.order;
        let differenced = difference(values, d);
        let start = p.max(q);

        let required = start + MIN_DIFFERENCED_LEN.max(self.n_coefficients() + 1);
        if values.len() <= d || differenced.len() < required {
            return Err(ForecastError::FitError(format!(
                "{} needs more observations than the {} provided",
                self.name,
                values.len()
            )));
        }

        let n_effective = differenced.len() - start;
        let include_intercept = self.includes_intercept();
        let sample_mean = differenced.iter().sum::<f64>() / differenced.len() as f64;

        let (params, iterations) = if p == 0 && q == 0 {
            // Closed form: the CSS minimiser is the sample mean
            let mu = if include_intercept { vec![sample_mean] } else { Vec::new() };
            (mu, 0)
        } else {
            let mut initial = Vec::with_capacity(self.n_coefficients());
            let mut bounds = Vec::with_capacity(self.n_coefficients());
            if include_intercept {
                initial.push(sample_mean);
                bounds.push((f64::NEG_INFINITY, f64::INFINITY));
            }
            for i in 0..p + q {
                let lag = if i < p { i } else { i - p };
                initial.push(0.1 / (lag + 1) as f64);
                bounds.push((-COEFFICIENT_SUM_LIMIT, COEFFICIENT_SUM_LIMIT));
            }

            let objective = |params: &[f64]| {
                let (mu, ar, ma) = self.unpack(params);
                if !within_limit(ar) || !within_limit(ma) {
                    return f64::INFINITY;
                }
                let css = conditional_sum_of_squares(&differenced, mu, ar, ma, start);
                if css.is_finite() {
                    css / n_effective as f64
                } else {
                    f64::INFINITY
                }
            };

            let result = nelder_mead(objective, &initial, Some(&bounds), &self.optimizer)
                .map_err(|e| ForecastError::FitError(format!("{}: {}", self.name, e)))?;
            if !result.converged {
                return Err(ForecastError::FitError(format!(
                    "{} did not converge after {} iterations",
                    self.name, result.iterations
                )));
            }
            (result.point, result.iterations)
        };

        if params.iter().any(|v| !v.is_finite()) {
            return Err(ForecastError::FitError(format!(
                "{} produced non-finite parameter estimates",
                self.name
            )));
        }

        let (mu, ar, ma) = self.unpack(&params);
        let innovations = residual_series(&differenced, mu, ar, ma, start);
        let css: f64 = innovations[start..].iter().map(|e| e * e).sum();
        if !css.is_finite() {
            return Err(ForecastError::FitError(format!(
                "{} produced a non-finite sum of squares",
                self.name
            )));
        }

        let mean_square = values.iter().map(|v| v * v).sum::<f64>() / values.len() as f64;
        let floor = (RELATIVE_VARIANCE_FLOOR * mean_square).max(1e-300);
        let sigma2 = (css / n_effective as f64).max(floor);

        debug!(
            "{} fitted in {} iterations: sigma2 = {:.6e}",
            self.name, iterations, sigma2
        );

        Ok(TrainedArimaModel {
            name: self.name.clone(),
            order: self.order,
            intercept: include_intercept.then_some(mu),
            ar_coefficients: ar.to_vec(),
            ma_coefficients: ma.to_vec(),
            sigma2,
            css,
            n_effective,
            history: values.to_vec(),
            differenced,
            innovations,
            iterations,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl TrainedArimaModel {
    pub fn order(&self) -> Order {
        self.order
    }

    /// Mean of the differenced process; `None` when `d >= 2`
    pub fn intercept(&self) -> Option<f64> {
        self.intercept
    }

    pub fn ar_coefficients(&self) -> &[f64] {
        &self.ar_coefficients
    }

    pub fn ma_coefficients(&self) -> &[f64] {
        &self.ma_coefficients
    }

    /// Residual variance (floored so that perfect fits stay finite)
    pub fn sigma2(&self) -> f64 {
        self.sigma2
    }

    /// Conditional sum of squared residuals
    pub fn css(&self) -> f64 {
        self.css
    }

    pub fn n_effective(&self) -> usize {
        self.n_effective
    }

    /// Estimated parameters, counting the residual variance
    pub fn n_params(&self) -> usize {
        self.ar_coefficients.len()
            + self.ma_coefficients.len()
            + usize::from(self.intercept.is_some())
            + 1
    }

    /// Gaussian conditional log-likelihood over `n` residuals at this fit's variance
    pub fn log_likelihood_at(&self, n: usize) -> f64 {
        -0.5 * n as f64 * ((2.0 * PI * self.sigma2).ln() + 1.0)
    }

    pub fn log_likelihood(&self) -> f64 {
        self.log_likelihood_at(self.n_effective)
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub fn history(&self) -> &[f64] {
        &self.history
    }

    /// MA(infinity) weights `psi_0..psi_{count-1}` of the integrated process
    pub fn psi_weights(&self, count: usize) -> Vec<f64> {
        // phi(B) (1 - B)^d written as 1 - sum a_i B^i
        let mut poly = vec![1.0];
        poly.extend(self.ar_coefficients.iter().map(|c| -c));
        for _ in 0..self.order.d {
            let mut next = vec![0.0; poly.len() + 1];
            for (i, c) in poly.iter().enumerate() {
                next[i] += c;
                next[i + 1] -= c;
            }
            poly = next;
        }
        let a: Vec<f64> = poly[1..].iter().map(|c| -c).collect();

        let mut psi = Vec::with_capacity(count);
        for j in 0..count {
            if j == 0 {
                psi.push(1.0);
                continue;
            }
            let mut value = self.ma_coefficients.get(j - 1).copied().unwrap_or(0.0);
            for (i, ai) in a.iter().enumerate().take(j) {
                value += ai * psi[j - 1 - i];
            }
            psi.push(value);
        }
        psi
    }
}

impl TrainedForecastModel for TrainedArimaModel {
    fn forecast(&self, horizon: usize) -> Result<ModelForecast> {
        if horizon == 0 {
            return Err(ForecastError::ValidationError(
                "Forecast horizon must be positive".to_string(),
            ));
        }

        let mu = self.intercept.unwrap_or(0.0);
        let m = self.differenced.len();
        let mut w = self.differenced.clone();
        w.reserve(horizon);

        for h in 0..horizon {
            let t = m + h;
            let mut value = mu;
            for (i, phi) in self.ar_coefficients.iter().enumerate() {
                value += phi * (w[t - 1 - i] - mu);
            }
            for (j, theta) in self.ma_coefficients.iter().enumerate() {
                // Future innovations have zero expectation
                if t - 1 - j < m {
                    value += theta * self.innovations[t - 1 - j];
                }
            }
            w.push(value);
        }

        let points = integrate(&w[m..], &self.history, self.order.d)?;

        let psi = self.psi_weights(horizon);
        let mut cumulative = 0.0;
        let std_errors: Vec<f64> = psi
            .iter()
            .map(|weight| {
                cumulative += weight * weight;
                (self.sigma2 * cumulative).sqrt()
            })
            .collect();

        if points.iter().chain(std_errors.iter()).any(|v| !v.is_finite()) {
            return Err(ForecastError::InferenceError(format!(
                "{} produced a non-finite forecast",
                self.name
            )));
        }

        Ok(ModelForecast { points, std_errors })
    }

    fn residuals(&self) -> &[f64] {
        let start = self.differenced.len() - self.n_effective;
        &self.innovations[start..]
    }

    fn name(&self) -> &str {
        &self.name
    }
}

fn within_limit(coefficients: &[f64]) -> bool {
    coefficients.iter().map(|c| c.abs()).sum::<f64>() < COEFFICIENT_SUM_LIMIT
}

/// One-step-ahead residuals, conditioned on zero presample innovations
fn residual_series(w: &[f64], mu: f64, ar: &[f64], ma: &[f64], start: usize) -> Vec<f64> {
    let mut e = vec![0.0; w.len()];
    for t in start..w.len() {
        let mut predicted = mu;
        for (i, phi) in ar.iter().enumerate() {
            predicted += phi * (w[t - 1 - i] - mu);
        }
        for (j, theta) in ma.iter().enumerate() {
            predicted += theta * e[t - 1 - j];
        }
        e[t] = w[t] - predicted;
    }
    e
}

fn conditional_sum_of_squares(w: &[f64], mu: f64, ar: &[f64], ma: &[f64], start: usize) -> f64 {
    residual_series(w, mu, ar, ma, start)[start..]
        .iter()
        .map(|e| e * e)
        .sum()
}
