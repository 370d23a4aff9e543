//! Pipeline configuration
//!
//! Every tunable lives here with an explicit default. A configuration can be
//! built in code, or read from a TOML file in which every section and field
//! is optional:
//!
//! ```toml
//! criterion = "bic"
//!
//! [ingest]
//! value_column = "Adj Close"
//! min_observations = 60
//!
//! [search]
//! max_p = 3
//!
//! [evaluation.holdout]
//! count = 10
//! ```

use crate::data::Frequency;
use crate::error::{ForecastError, Result};
use crate::evaluation::{HoldoutSize, DEFAULT_MIN_OBSERVATIONS};
use crate::models::SearchBounds;
use crate::preprocess::FillMethod;
use crate::selection::InformationCriterion;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Inclusive calendar date window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.map_or(true, |s| date >= s) && self.end.map_or(true, |e| date <= e)
    }
}

/// Ingestion settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Name of the numeric column to forecast, matched case-insensitively
    pub value_column: String,
    /// Name of the timestamp column; detected when absent
    pub time_column: Option<String>,
    /// Fewest observations a cleaned series may have
    pub min_observations: usize,
    pub date_range: Option<DateRange>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            value_column: "Close".to_string(),
            time_column: None,
            min_observations: DEFAULT_MIN_OBSERVATIONS,
            date_range: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessConfig {
    pub fill: FillMethod,
    /// Infer the sampling frequency from the timestamps
    pub infer_frequency: bool,
    /// Explicit frequency; takes precedence over inference
    pub frequency: Option<Frequency>,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            fill: FillMethod::default(),
            infer_frequency: true,
            frequency: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationConfig {
    pub holdout: HoldoutSize,
    pub min_observations: usize,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            holdout: HoldoutSize::default(),
            min_observations: DEFAULT_MIN_OBSERVATIONS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    pub horizon: usize,
    pub confidence_level: f64,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            horizon: 30,
            confidence_level: 0.95,
        }
    }
}

/// Complete pipeline configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub ingest: IngestConfig,
    pub preprocess: PreprocessConfig,
    pub search: SearchBounds,
    pub criterion: InformationCriterion,
    pub evaluation: EvaluationConfig,
    pub forecast: ForecastConfig,
}

impl PipelineConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: PipelineConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<()> {
        self.search.validate()?;

        if self.ingest.value_column.trim().is_empty() {
            return Err(ForecastError::ValidationError(
                "ingest.value_column must not be empty".to_string(),
            ));
        }
        if self.ingest.min_observations == 0 || self.evaluation.min_observations == 0 {
            return Err(ForecastError::ValidationError(
                "min_observations must be positive".to_string(),
            ));
        }
        if let Some(DateRange {
            start: Some(start),
            end: Some(end),
        }) = self.ingest.date_range
        {
            if start > end {
                return Err(ForecastError::ValidationError(format!(
                    "Date range starts ({}) after it ends ({})",
                    start, end
                )));
            }
        }
        if let Some(Frequency::Fixed { seconds }) = self.preprocess.frequency {
            if seconds <= 0 {
                return Err(ForecastError::ValidationError(format!(
                    "Fixed frequency must be positive, got {} seconds",
                    seconds
                )));
            }
        }

        match self.evaluation.holdout {
            HoldoutSize::Count(0) => {
                return Err(ForecastError::ValidationError(
                    "Holdout count must be positive".to_string(),
                ))
            }
            HoldoutSize::Fraction { fraction, .. } if !(fraction > 0.0 && fraction < 1.0) => {
                return Err(ForecastError::ValidationError(format!(
                    "Holdout fraction must be in (0, 1), got {}",
                    fraction
                )))
            }
            _ => {}
        }

        crate::forecast::validate_request(self.forecast.horizon, self.forecast.confidence_level)
    }
}
