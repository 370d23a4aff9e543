//! # Clue Stats
//!
//! Numeric building blocks used by the forecasting pipeline.
//! This crate provides descriptive statistics, differencing helpers,
//! a bounded Nelder-Mead minimiser and normal quantiles.

use thiserror::Error;

pub mod descriptive;
pub mod differencing;
pub mod distribution;
pub mod optimize;

pub use descriptive::{mean, median, pct_change, rolling_mean, sample_std, sample_variance};
pub use differencing::{difference, integrate};
pub use distribution::two_sided_z;
pub use optimize::{nelder_mead, NelderMeadConfig, NelderMeadResult};

/// Errors that can occur in statistical calculations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StatsError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),
}

/// Result type for statistical operations
pub type Result<T> = std::result::Result<T, StatsError>;
