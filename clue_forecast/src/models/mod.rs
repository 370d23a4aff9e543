//! Forecasting models and their structural orders

use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug};
use std::str::FromStr;

pub mod arima;

/// Upper limit on the differencing order a search may request
pub const MAX_DIFFERENCING: usize = 3;
/// Upper limit on the AR and MA orders a search may request
pub const MAX_ARMA_ORDER: usize = 10;

/// ARIMA structural order `(p, d, q)`.
///
/// Serialises as the array `[p, d, q]`. The derived ordering is
/// lexicographic, which is what the order search uses to break ties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "[usize; 3]", into = "[usize; 3]")]
pub struct Order {
    /// Autoregressive order
    pub p: usize,
    /// Differencing order
    pub d: usize,
    /// Moving-average order
    pub q: usize,
}

impl Order {
    pub const fn new(p: usize, d: usize, q: usize) -> Self {
        Self { p, d, q }
    }

    pub fn as_tuple(&self) -> (usize, usize, usize) {
        (self.p, self.d, self.q)
    }
}

impl From<[usize; 3]> for Order {
    fn from([p, d, q]: [usize; 3]) -> Self {
        Self { p, d, q }
    }
}

impl From<Order> for [usize; 3] {
    fn from(order: Order) -> Self {
        [order.p, order.d, order.q]
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.p, self.d, self.q)
    }
}

/// Inclusive upper bounds of the order search space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchBounds {
    pub max_p: usize,
    pub max_d: usize,
    pub max_q: usize,
}

impl Default for SearchBounds {
    fn default() -> Self {
        Self {
            max_p: 2,
            max_d: 2,
            max_q: 2,
        }
    }
}

impl SearchBounds {
    pub fn new(max_p: usize, max_d: usize, max_q: usize) -> Self {
        Self { max_p, max_d, max_q }
    }

    /// Whether every component of `order` lies within the bounds
    pub fn contains(&self, order: &Order) -> bool {
        order.p <= self.max_p && order.d <= self.max_d && order.q <= self.max_q
    }

    /// Every order within the bounds, in lexicographic order
    pub fn candidates(&self) -> Vec<Order> {
        let mut orders =
            Vec::with_capacity((self.max_p + 1) * (self.max_d + 1) * (self.max_q + 1));
        for p in 0..=self.max_p {
            for d in 0..=self.max_d {
                for q in 0..=self.max_q {
                    orders.push(Order::new(p, d, q));
                }
            }
        }
        orders
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_d > MAX_DIFFERENCING {
            return Err(ForecastError::ValidationError(format!(
                "max_d must be at most {}, got {}",
                MAX_DIFFERENCING, self.max_d
            )));
        }
        if self.max_p > MAX_ARMA_ORDER || self.max_q > MAX_ARMA_ORDER {
            return Err(ForecastError::ValidationError(format!(
                "max_p and max_q must be at most {}, got {} and {}",
                MAX_ARMA_ORDER, self.max_p, self.max_q
            )));
        }
        Ok(())
    }
}

/// The model family requested by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ModelFamily {
    /// Search the configured bounds for the best ARIMA order
    #[default]
    AutoArima,
    /// Use a fixed ARIMA order
    Arima(Order),
}

impl fmt::Display for ModelFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelFamily::AutoArima => write!(f, "AUTO_ARIMA"),
            ModelFamily::Arima(o) => write!(f, "ARIMA({},{},{})", o.p, o.d, o.q),
        }
    }
}

impl FromStr for ModelFamily {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized: String = s
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_uppercase();

        if normalized == "AUTO_ARIMA" || normalized == "AUTOARIMA" {
            return Ok(ModelFamily::AutoArima);
        }

        let invalid = || ForecastError::ValidationError(format!("Unknown model family '{}'", s));

        let inner = normalized
            .strip_prefix("ARIMA(")
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(invalid)?;
        let parts = inner
            .split(',')
            .map(|part| part.parse::<usize>())
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|_| invalid())?;

        match parts.as_slice() {
            [p, d, q] => Ok(ModelFamily::Arima(Order::new(*p, *d, *q))),
            _ => Err(invalid()),
        }
    }
}

impl TryFrom<String> for ModelFamily {
    type Error = ForecastError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<ModelFamily> for String {
    fn from(family: ModelFamily) -> Self {
        family.to_string()
    }
}

/// A model family plus the structural order chosen for it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSpec {
    pub family: ModelFamily,
    pub order: Order,
}

impl ModelSpec {
    pub fn new(family: ModelFamily, order: Order) -> Self {
        Self { family, order }
    }
}

impl fmt::Display for ModelSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.family, self.order)
    }
}

/// Point forecasts with their standard errors, on the scale of the input
#[derive(Debug, Clone, PartialEq)]
pub struct ModelForecast {
    pub points: Vec<f64>,
    pub std_errors: Vec<f64>,
}

/// Trained forecast model
pub trait TrainedForecastModel: Debug {
    /// Generate point forecasts and standard errors for future periods
    fn forecast(&self, horizon: usize) -> Result<ModelForecast>;

    /// In-sample one-step-ahead residuals
    fn residuals(&self) -> &[f64];

    /// Name of the model
    fn name(&self) -> &str;
}

/// Forecast model that can be trained on a series of values
pub trait ForecastModel: Debug + Clone {
    /// The type of trained model produced
    type Trained: TrainedForecastModel;

    /// Train the model on the given values
    fn train(&self, values: &[f64]) -> Result<Self::Trained>;

    /// Get the name of the model
    fn name(&self) -> &str;
}
