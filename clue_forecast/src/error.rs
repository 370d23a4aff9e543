//! Error types for the clue_forecast crate

use thiserror::Error;

/// Custom error types for the clue_forecast crate.
///
/// Every pipeline stage fails fast with one of these variants; none of them
/// is ever replaced by a default model or a zero-filled forecast.
#[derive(Debug, Error)]
pub enum ForecastError {
    /// Bad or insufficient input series
    #[error("Data error: {0}")]
    DataError(String),

    /// No candidate order could be fitted during the search
    #[error("Model selection error: {0}")]
    ModelSelectionError(String),

    /// The chosen order failed to fit
    #[error("Fit error: {0}")]
    FitError(String),

    /// Forecasting could not produce a usable result
    #[error("Inference error: {0}")]
    InferenceError(String),

    /// Invalid horizon, confidence level or holdout configuration
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Error from IO operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error while reading CSV input
    #[error("CSV error: {0}")]
    CsvError(String),

    /// Malformed configuration file
    #[error("Config error: {0}")]
    ConfigError(String),

    /// Error while serialising results
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Error from the numeric building blocks
    #[error("Math error: {0}")]
    StatsError(#[from] clue_stats::StatsError),

    /// Error from Polars operations
    #[cfg(feature = "polars")]
    #[error("Polars error: {0}")]
    PolarsError(String),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl From<csv::Error> for ForecastError {
    fn from(err: csv::Error) -> Self {
        ForecastError::CsvError(err.to_string())
    }
}

impl From<serde_json::Error> for ForecastError {
    fn from(err: serde_json::Error) -> Self {
        ForecastError::SerializationError(err.to_string())
    }
}

impl From<toml::de::Error> for ForecastError {
    fn from(err: toml::de::Error) -> Self {
        ForecastError::ConfigError(err.to_string())
    }
}

#[cfg(feature = "polars")]
impl From<polars::prelude::PolarsError> for ForecastError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        ForecastError::PolarsError(err.to_string())
    }
}
