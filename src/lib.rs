//! # Clue
//!
//! `clue` forecasts financial time series. It bundles the pipeline crate,
//! the numeric helpers it is built on and a small command line front end.
//!
//! ## Example
//!
//! ```
//! use clue::forecast::models::{ModelFamily, Order};
//!
//! let family: ModelFamily = "ARIMA(1,1,0)".parse().unwrap();
//! assert_eq!(family, ModelFamily::Arima(Order::new(1, 1, 0)));
//! assert_eq!(family.to_string(), "ARIMA(1,1,0)");
//! ```

pub mod cli;

pub use clue_forecast as forecast;
pub use clue_stats as stats;

pub use cli::{run, Cli, Command};
