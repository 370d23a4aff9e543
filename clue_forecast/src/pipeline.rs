//! TRAIN and FORECAST entry points
//!
//! Both entry points are plain blocking calls that hold no state between
//! invocations. Each one prepares the series, searches for an order and
//! fits it; TRAIN then scores the configuration on a holdout, FORECAST
//! projects it forward.

use crate::config::PipelineConfig;
use crate::data::{DataSource, IngestReport, Ingestor, SymbolProvider, TimeSeries};
use crate::error::{ForecastError, Result};
use crate::evaluation::{EvaluationMetrics, Evaluator};
use crate::forecast::{forecast, validate_request, ForecastResult};
use crate::models::{ModelFamily, Order};
use crate::preprocess::{PrepareReport, Preprocessor};
use crate::selection::{InformationCriterion, ModelSelector, Selection};
use crate::trainer::{fit, FittedModel};
use log::info;
use serde::Serialize;

/// The caller's model choice
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ModelSelection {
    family: ModelFamily,
    horizon: usize,
    confidence_level: f64,
}

impl ModelSelection {
    /// Validate a model choice; the horizon must be positive and the
    /// confidence level inside (0, 1)
    pub fn new(family: ModelFamily, horizon: i64, confidence_level: f64) -> Result<Self> {
        if horizon <= 0 {
            return Err(ForecastError::ValidationError(format!(
                "Forecast horizon must be a positive integer, got {}",
                horizon
            )));
        }
        let horizon = usize::try_from(horizon).map_err(|_| {
            ForecastError::ValidationError(format!("Forecast horizon {} is too large", horizon))
        })?;
        validate_request(horizon, confidence_level)?;

        Ok(Self {
            family,
            horizon,
            confidence_level,
        })
    }

    pub fn family(&self) -> ModelFamily {
        self.family
    }

    pub fn horizon(&self) -> usize {
        self.horizon
    }

    pub fn confidence_level(&self) -> f64 {
        self.confidence_level
    }
}

/// Outcome of a TRAIN invocation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainingResult {
    pub family: ModelFamily,
    pub order: Order,
    pub criterion: InformationCriterion,
    /// Criterion value of the selected order
    pub score: f64,
    /// Order selected on the training prefix of the holdout split. It can
    /// differ from `order`, which is selected on the whole series.
    pub evaluated_order: Order,
    /// Holdout errors of `evaluated_order`
    pub metrics: EvaluationMetrics,
    pub horizon: usize,
}

/// What loading a source did to the raw rows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub ingest: IngestReport,
    pub prepare: PrepareReport,
}

impl LoadReport {
    /// Observations that were missing from the source: dropped rows plus filled gaps
    pub fn missing(&self) -> usize {
        self.ingest.dropped_invalid_values + self.prepare.filled
    }
}

/// The forecasting pipeline
#[derive(Debug)]
pub struct Pipeline {
    config: PipelineConfig,
    ingestor: Ingestor,
    preprocessor: Preprocessor,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            ingestor: Ingestor::new(config.ingest.clone()),
            preprocessor: Preprocessor::new(config.preprocess),
            config,
        })
    }

    /// Resolve symbol sources through `provider`
    pub fn with_provider(mut self, provider: Box<dyn SymbolProvider>) -> Self {
        self.ingestor = self.ingestor.with_provider(provider);
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn ingestor(&self) -> &Ingestor {
        &self.ingestor
    }

    /// Ingest and prepare a source in one step
    pub fn load(&self, source: &DataSource) -> Result<(TimeSeries, LoadReport)> {
        let (raw, ingest) = self.ingestor.ingest_with_report(source)?;
        let (series, prepare) = self.preprocessor.prepare_with_report(&raw)?;
        Ok((series, LoadReport { ingest, prepare }))
    }

    /// Select an order for the prepared series and fit it
    fn select_and_fit(
        &self,
        series: &TimeSeries,
        family: &ModelFamily,
    ) -> Result<(TimeSeries, Selection, FittedModel)> {
        let prepared = self.preprocessor.prepare(series)?;
        let selection = ModelSelector::new(self.config.search, self.config.criterion)
            .select(&prepared, family)?;
        let fitted = fit(&prepared, &selection.spec)?;
        Ok((prepared, selection, fitted))
    }

    /// TRAIN: select and fit on the whole series, then score on a holdout
    pub fn train(&self, series: &TimeSeries, selection: &ModelSelection) -> Result<TrainingResult> {
        let (prepared, chosen, _fitted) = self.select_and_fit(series, &selection.family)?;

        let evaluator = Evaluator::new(
            self.config.criterion,
            self.config.evaluation.min_observations,
        );
        let evaluation = evaluator.evaluate_holdout(
            &prepared,
            &selection.family,
            &self.config.search,
            &self.config.evaluation.holdout,
        )?;

        info!(
            "Training finished: {} order {} with {} = {:.4}, holdout scored on {}",
            selection.family, chosen.spec.order, chosen.criterion, chosen.score, evaluation.order
        );

        Ok(TrainingResult {
            family: selection.family,
            order: chosen.spec.order,
            criterion: chosen.criterion,
            score: chosen.score,
            evaluated_order: evaluation.order,
            metrics: evaluation.metrics,
            horizon: selection.horizon,
        })
    }

    /// FORECAST: select and fit on the whole series, then project forward
    pub fn forecast(&self, series: &TimeSeries, selection: &ModelSelection) -> Result<ForecastResult> {
        let (_, chosen, fitted) = self.select_and_fit(series, &selection.family)?;
        let result = forecast(&fitted, selection.horizon, selection.confidence_level)?;

        info!(
            "Forecast {} steps with ARIMA{} at {:.0}% confidence",
            result.horizon(),
            chosen.spec.order,
            selection.confidence_level * 100.0
        );

        Ok(result)
    }
}
