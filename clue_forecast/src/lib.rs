//! # Clue Forecast
//!
//! A Rust library for forecasting financial time series with ARIMA models.
//!
//! ## Features
//!
//! - Ingestion of CSV files, in-memory tables, symbols and (with the `polars`
//!   feature) data frames into a validated time series
//! - Gap filling on an inferred sampling frequency
//! - Bounded ARIMA order search with AIC, AICc or BIC
//! - Multi-step forecasts with normal confidence intervals
//! - Holdout evaluation (MAE, MSE, RMSE, MAPE)
//! - Exploratory summaries and report payloads for external renderers
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use clue_forecast::config::PipelineConfig;
//! use clue_forecast::data::DataSource;
//! use clue_forecast::models::ModelFamily;
//! use clue_forecast::pipeline::{ModelSelection, Pipeline};
//!
//! # fn main() -> clue_forecast::error::Result<()> {
//! let pipeline = Pipeline::new(PipelineConfig::default())?;
//! let (series, _) = pipeline.load(&DataSource::csv("prices.csv"))?;
//!
//! let selection = ModelSelection::new(ModelFamily::AutoArima, 30, 0.95)?;
//! let training = pipeline.train(&series, &selection)?;
//! println!("Order {}\n{}", training.order, training.metrics);
//!
//! let forecast = pipeline.forecast(&series, &selection)?;
//! println!("{}", forecast.to_json()?);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod data;
pub mod eda;
pub mod error;
pub mod evaluation;
pub mod forecast;
pub mod models;
pub mod pipeline;
pub mod preprocess;
pub mod report;
pub mod selection;
pub mod trainer;
pub mod utils;

pub use config::PipelineConfig;
pub use data::{DataSource, Frequency, Ingestor, TimeSeries};
pub use error::{ForecastError, Result};
pub use evaluation::{compute_metrics, evaluate, EvaluationMetrics, Evaluator, HoldoutEvaluation, HoldoutSize};
pub use forecast::{forecast, ForecastResult};
pub use models::{ModelFamily, ModelSpec, Order, SearchBounds};
pub use pipeline::{ModelSelection, Pipeline, TrainingResult};
pub use preprocess::{FillMethod, Preprocessor};
pub use selection::{select_order, InformationCriterion, ModelSelector};
pub use trainer::{fit, FittedModel};
